//! Salvage assignment session.
//!
//! Owns the wrecks, the sanitized recovery pool, and the per-wreck slots and
//! claims. Every mutation is applied to the raw state and followed by a full
//! [`recompute_all`], so validity, claim gating and the ledger are never
//! patched incrementally.

pub mod pool;
pub mod state;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ledger::{Blocker, LedgerSnapshot};
use crate::model::{ClaimState, ContractTerms, RecoveryUnit, TechBudget, UnitId, Wreck, WreckId};
use crate::validate::{InvalidReason, Validity};

pub use pool::{sanitize_pool, ExcludedUnit, PoolExclusion};
pub use state::{recompute_all, Assignment, SessionState, Slot};

/// Errors returned for requests the session cannot honor. Modeled
/// validation failures are not errors; they show up in [`Validity`] and the
/// ledger's blockers.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("duplicate wreck id '{0}'")]
    DuplicateWreck(WreckId),

    #[error("duplicate recovery unit id '{0}'")]
    DuplicateUnit(UnitId),

    #[error("unknown wreck '{0}'")]
    UnknownWreck(WreckId),

    #[error("unit '{unit}' is not available for the {slot} slot of wreck '{wreck}'")]
    UnitUnavailable { wreck: WreckId, slot: Slot, unit: UnitId },

    #[error("wreck '{wreck}' cannot be claimed: {reason}")]
    ClaimNotPermitted { wreck: WreckId, reason: InvalidReason },

    #[error("session is not confirmable ({} blocking issue(s))", .0.len())]
    NotConfirmable(Vec<Blocker>),
}

/// Everything needed to open a session.
#[derive(Debug, Clone, Default)]
pub struct SessionInput {
    pub wrecks: Vec<Wreck>,
    pub units: Vec<RecoveryUnit>,
    pub budget: TechBudget,
    pub contract: Option<ContractTerms>,
    pub in_space_operation: bool,
    /// Units committed to other open salvage sessions for the same day.
    pub excluded_unit_ids: HashSet<UnitId>,
}

/// The frozen outcome of a confirmed session. Every wreck appears in exactly
/// one of the three lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalvagePartition {
    pub kept: Vec<WreckId>,
    pub sold: Vec<WreckId>,
    pub employer_ceded: Vec<WreckId>,
    pub ledger: LedgerSnapshot,
}

/// An interactive salvage assignment session.
#[derive(Debug, Clone)]
pub struct SalvageSession {
    state: SessionState,
    wreck_index: HashMap<WreckId, usize>,
    excluded: Vec<ExcludedUnit>,
}

impl SalvageSession {
    /// Opens a session: sanitizes the pool and computes the initial ledger.
    ///
    /// Wrecks with incomplete data are kept (never dropped) and will report
    /// [`InvalidReason::Unresolvable`].
    pub fn open(input: SessionInput) -> Result<Self, SessionError> {
        let mut wreck_index = HashMap::with_capacity(input.wrecks.len());
        for (i, wreck) in input.wrecks.iter().enumerate() {
            if wreck_index.insert(wreck.id.clone(), i).is_some() {
                return Err(SessionError::DuplicateWreck(wreck.id.clone()));
            }
            if !wreck.is_resolvable() {
                warn!(
                    target: "flotsam::session",
                    wreck = %wreck.id,
                    weight = wreck.weight,
                    recovery_minutes = ?wreck.recovery_minutes,
                    "session.wreck.unresolvable"
                );
            }
        }

        let mut seen = HashSet::with_capacity(input.units.len());
        for unit in &input.units {
            if !seen.insert(&unit.id) {
                return Err(SessionError::DuplicateUnit(unit.id.clone()));
            }
        }

        let (pool, excluded) = sanitize_pool(input.units, &input.excluded_unit_ids);
        let state = SessionState::new(
            input.wrecks,
            pool,
            input.budget,
            input.contract,
            input.in_space_operation,
        );

        info!(
            target: "flotsam::session",
            wrecks = state.wrecks.len(),
            pool = state.pool.len(),
            excluded = excluded.len(),
            budget = state.budget.total_minutes,
            space = state.in_space_operation,
            "session.opened"
        );

        Ok(SalvageSession {
            state,
            wreck_index,
            excluded,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn ledger(&self) -> &LedgerSnapshot {
        &self.state.ledger
    }

    pub fn confirmable(&self) -> bool {
        self.state.ledger.confirmable()
    }

    pub fn wrecks(&self) -> &[Wreck] {
        &self.state.wrecks
    }

    /// The sanitized recovery pool.
    pub fn pool(&self) -> &[RecoveryUnit] {
        &self.state.pool
    }

    /// Units left out of the pool, with reasons.
    pub fn excluded(&self) -> &[ExcludedUnit] {
        &self.excluded
    }

    fn index_of(&self, wreck: &WreckId) -> Result<usize, SessionError> {
        self.wreck_index
            .get(wreck)
            .copied()
            .ok_or_else(|| SessionError::UnknownWreck(wreck.clone()))
    }

    pub fn assignment(&self, wreck: &WreckId) -> Result<&Assignment, SessionError> {
        let idx = self.index_of(wreck)?;
        Ok(&self.state.assignments[idx])
    }

    pub fn validity(&self, wreck: &WreckId) -> Result<Validity, SessionError> {
        let idx = self.index_of(wreck)?;
        Ok(self.state.validity[idx])
    }

    /// A wreck's slots and claim together with its validity.
    pub fn wreck_status(&self, wreck: &WreckId) -> Result<(&Assignment, Validity), SessionError> {
        let idx = self.index_of(wreck)?;
        Ok((&self.state.assignments[idx], self.state.validity[idx]))
    }

    /// Units selectable for one slot: the pool minus everything booked in any
    /// other slot, keeping the unit currently in this slot. Pool order.
    pub fn available_options_for(
        &self,
        wreck: &WreckId,
        slot: Slot,
    ) -> Result<Vec<&RecoveryUnit>, SessionError> {
        let idx = self.index_of(wreck)?;
        let current = self.state.assignments[idx].slot(slot);

        let mut booked = self.state.booked_units();
        if let Some(id) = current {
            booked.remove(id);
        }

        Ok(self
            .state
            .pool
            .iter()
            .filter(|u| !booked.contains(&u.id))
            .collect())
    }

    /// Puts a unit in a slot, or clears the slot with `None`.
    pub fn assign(
        &mut self,
        wreck: &WreckId,
        slot: Slot,
        unit: Option<&UnitId>,
    ) -> Result<(), SessionError> {
        let idx = self.index_of(wreck)?;

        if let Some(unit_id) = unit {
            let selectable = self
                .available_options_for(wreck, slot)?
                .iter()
                .any(|u| &u.id == unit_id);
            if !selectable {
                return Err(SessionError::UnitUnavailable {
                    wreck: wreck.clone(),
                    slot,
                    unit: unit_id.clone(),
                });
            }
        }

        *self.state.assignments[idx].slot_mut(slot) = unit.cloned();
        self.recompute();

        debug!(
            target: "flotsam::session",
            wreck = %wreck,
            slot = %slot,
            unit = ?unit.map(UnitId::as_str),
            validity = %self.state.validity[idx].protocol_string(),
            "session.assign"
        );
        Ok(())
    }

    /// Toggles Keep or Sell. Selecting one clears the other; selecting the
    /// current claim clears it. Passing `Unclaimed` clears the claim.
    pub fn toggle_claim(&mut self, wreck: &WreckId, claim: ClaimState) -> Result<(), SessionError> {
        let idx = self.index_of(wreck)?;
        let next = if self.state.assignments[idx].claim == claim {
            ClaimState::Unclaimed
        } else {
            claim
        };
        self.set_claim_at(idx, next)
    }

    /// Sets the claim outright.
    pub fn set_claim(&mut self, wreck: &WreckId, claim: ClaimState) -> Result<(), SessionError> {
        let idx = self.index_of(wreck)?;
        self.set_claim_at(idx, claim)
    }

    fn set_claim_at(&mut self, idx: usize, claim: ClaimState) -> Result<(), SessionError> {
        if claim.is_claimed() {
            if let Validity::Invalid(reason) = self.state.validity[idx] {
                return Err(SessionError::ClaimNotPermitted {
                    wreck: self.state.wrecks[idx].id.clone(),
                    reason,
                });
            }
        }

        self.state.assignments[idx].claim = claim;
        self.recompute();

        debug!(
            target: "flotsam::session",
            wreck = %self.state.wrecks[idx].id,
            claim = %claim,
            unit_money = self.state.ledger.unit_money,
            employer_money = self.state.ledger.employer_money,
            "session.claim"
        );
        Ok(())
    }

    /// Freezes the claims into the kept/sold/ceded partition. Only allowed
    /// while the ledger has no blockers; the caller discards the session
    /// afterwards.
    pub fn confirm(&self) -> Result<SalvagePartition, SessionError> {
        if !self.confirmable() {
            return Err(SessionError::NotConfirmable(self.state.ledger.blockers.clone()));
        }

        let mut kept = Vec::new();
        let mut sold = Vec::new();
        let mut employer_ceded = Vec::new();
        for (wreck, assignment) in self.state.wrecks.iter().zip(&self.state.assignments) {
            let bucket = match assignment.claim {
                ClaimState::Keep => &mut kept,
                ClaimState::Sell => &mut sold,
                ClaimState::Unclaimed => &mut employer_ceded,
            };
            bucket.push(wreck.id.clone());
        }

        info!(
            target: "flotsam::session",
            kept = kept.len(),
            sold = sold.len(),
            employer_ceded = employer_ceded.len(),
            unit_money = self.state.ledger.unit_money,
            employer_money = self.state.ledger.employer_money,
            used_minutes = self.state.ledger.used_minutes,
            "session.confirmed"
        );

        Ok(SalvagePartition {
            kept,
            sold,
            employer_ceded,
            ledger: self.state.ledger.clone(),
        })
    }

    fn recompute(&mut self) {
        self.state = recompute_all(std::mem::take(&mut self.state));
    }
}
