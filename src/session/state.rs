//! Session state and the wholesale recompute.
//!
//! `recompute_all` is the single place derived data is produced. Every edit
//! to a session is a plain change to the slots or claims followed by one call
//! to it, so no edit can observe another one half-applied.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ledger::{compute_ledger, LedgerEntry, LedgerSnapshot};
use crate::model::{ClaimState, ContractTerms, RecoveryUnit, TechBudget, UnitId, Wreck};
use crate::validate::{validate_assignment, Validity};

/// One of the two recovery-unit slots on a wreck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Left,
    Right,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Left, Slot::Right];

    pub const fn protocol_str(self) -> &'static str {
        match self {
            Slot::Left => "left",
            Slot::Right => "right",
        }
    }

    pub fn from_protocol_str(s: &str) -> Option<Slot> {
        match s {
            "left" | "l" | "1" => Some(Slot::Left),
            "right" | "r" | "2" => Some(Slot::Right),
            _ => None,
        }
    }

    pub const fn other(self) -> Slot {
        match self {
            Slot::Left => Slot::Right,
            Slot::Right => Slot::Left,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.protocol_str())
    }
}

/// The units placed on one wreck and the player's claim on it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Assignment {
    pub left: Option<UnitId>,
    pub right: Option<UnitId>,
    pub claim: ClaimState,
}

impl Assignment {
    pub fn slot(&self, slot: Slot) -> Option<&UnitId> {
        match slot {
            Slot::Left => self.left.as_ref(),
            Slot::Right => self.right.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Option<UnitId> {
        match slot {
            Slot::Left => &mut self.left,
            Slot::Right => &mut self.right,
        }
    }

    /// At least one slot is filled.
    pub fn is_assigned(&self) -> bool {
        self.left.is_some() || self.right.is_some()
    }

    /// Units in slot order.
    pub fn units(&self) -> impl Iterator<Item = &UnitId> {
        self.left.iter().chain(self.right.iter())
    }
}

/// Full state of a salvage session.
///
/// `wrecks`, `assignments` and `validity` are parallel vectors indexed by
/// wreck position. `validity` and `ledger` are derived and only meaningful
/// after `recompute_all`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub wrecks: Vec<Wreck>,
    pub pool: Vec<RecoveryUnit>,
    pub assignments: Vec<Assignment>,
    pub validity: Vec<Validity>,
    pub ledger: LedgerSnapshot,
    pub budget: TechBudget,
    pub contract: Option<ContractTerms>,
    pub in_space_operation: bool,
}

impl SessionState {
    /// Creates a state with every wreck unassigned and unclaimed, already
    /// recomputed.
    pub fn new(
        wrecks: Vec<Wreck>,
        pool: Vec<RecoveryUnit>,
        budget: TechBudget,
        contract: Option<ContractTerms>,
        in_space_operation: bool,
    ) -> Self {
        let n = wrecks.len();
        let state = SessionState {
            wrecks,
            pool,
            assignments: vec![Assignment::default(); n],
            validity: vec![Validity::Unassigned; n],
            ledger: LedgerSnapshot::default(),
            budget,
            contract,
            in_space_operation,
        };
        recompute_all(state)
    }

    pub fn pool_unit(&self, id: &UnitId) -> Option<&RecoveryUnit> {
        self.pool.iter().find(|u| &u.id == id)
    }

    /// Every unit currently sitting in some slot.
    pub fn booked_units(&self) -> HashSet<&UnitId> {
        self.assignments.iter().flat_map(|a| a.units()).collect()
    }
}

/// Revalidates every wreck and rebuilds the ledger.
///
/// In order:
/// 1. slots naming a unit outside the pool, or a unit already booked by an
///    earlier slot (wreck order, left before right), are cleared;
/// 2. each wreck is validated; an invalid wreck loses its claim;
/// 3. the ledger is rebuilt from the resulting assignments.
///
/// Idempotent: applying it to its own output changes nothing.
pub fn recompute_all(mut state: SessionState) -> SessionState {
    let pool_index: HashMap<UnitId, usize> = state
        .pool
        .iter()
        .enumerate()
        .map(|(i, u)| (u.id.clone(), i))
        .collect();

    let mut booked: HashSet<UnitId> = HashSet::new();
    for assignment in state.assignments.iter_mut() {
        for slot in Slot::ALL {
            let entry = assignment.slot_mut(slot);
            let keep = match entry.as_ref() {
                Some(id) => pool_index.contains_key(id) && booked.insert(id.clone()),
                None => true,
            };
            if !keep {
                *entry = None;
            }
        }
    }

    state.validity.clear();
    for (wreck, assignment) in state.wrecks.iter().zip(state.assignments.iter_mut()) {
        let left = assignment.left.as_ref().map(|id| &state.pool[pool_index[id]]);
        let right = assignment.right.as_ref().map(|id| &state.pool[pool_index[id]]);
        let validity = validate_assignment(wreck, left, right, state.in_space_operation);
        if !validity.is_claimable() {
            assignment.claim = ClaimState::Unclaimed;
        }
        state.validity.push(validity);
    }

    let entries = state
        .wrecks
        .iter()
        .zip(state.assignments.iter())
        .zip(state.validity.iter())
        .map(|((wreck, assignment), validity)| LedgerEntry {
            wreck,
            assigned: assignment.is_assigned(),
            validity: *validity,
            claim: assignment.claim,
        });
    state.ledger = compute_ledger(entries, state.budget, state.contract.as_ref());

    state
}
