//! Allocation ledger.
//!
//! Aggregates the whole assignment state into technician time used, money
//! retained by the unit, money ceded to the employer, and the reasons (if any)
//! the state cannot be confirmed. The ledger is always rebuilt from scratch.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{ClaimState, ContractTerms, TechBudget, Wreck, WreckId};
use crate::validate::{InvalidReason, Validity};

/// A reason the session cannot be confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Blocker {
    /// A wreck has units assigned that cannot move it.
    InvalidAssignment { wreck: WreckId, reason: InvalidReason },
    TimeBudgetExceeded { used: u64, available: u64 },
    /// The unit's share went over the contract cap during this session.
    SalvageCapExceeded { percent: f64, cap: u8 },
}

/// One wreck's contribution to the ledger.
#[derive(Debug, Clone, Copy)]
pub struct LedgerEntry<'a> {
    pub wreck: &'a Wreck,
    /// At least one recovery unit is assigned.
    pub assigned: bool,
    pub validity: Validity,
    pub claim: ClaimState,
}

/// Aggregate totals for a session state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub used_minutes: u64,
    pub available_minutes: u64,
    pub employer_money: i64,
    pub unit_money: i64,
    /// Under exchange rights, the unit's share as a fraction of the employer
    /// total. `None` otherwise.
    pub derived_unit_share: Option<i64>,
    pub blockers: Vec<Blocker>,
}

impl LedgerSnapshot {
    pub fn confirmable(&self) -> bool {
        self.blockers.is_empty()
    }

    /// The unit's share of all salvage money, 0-100. Zero when there is no
    /// money at all.
    pub fn unit_percentage(&self) -> f64 {
        unit_percentage(i128::from(self.unit_money), i128::from(self.employer_money))
    }
}

fn unit_percentage(unit_money: i128, employer_money: i128) -> f64 {
    let total = unit_money as f64 + employer_money as f64;
    if total <= 0.0 {
        return 0.0;
    }
    unit_money as f64 * 100.0 / total
}

/// Integer form of `unit / (unit + employer) * 100 > cap`.
fn exceeds_cap(unit_money: i128, employer_money: i128, cap: u8) -> bool {
    let total = unit_money + employer_money;
    if total <= 0 {
        return false;
    }
    unit_money * 100 > i128::from(cap) * total
}

/// Narrows a money total back to `i64`, saturating out-of-range sums.
fn clamp_money(value: i128, field: &'static str) -> i64 {
    i64::try_from(value).unwrap_or_else(|_| {
        warn!(target: "flotsam::ledger", field, value = %value, "ledger.money.saturated");
        if value < 0 {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}

/// Builds the ledger for a full assignment state.
pub fn compute_ledger<'a>(
    entries: impl IntoIterator<Item = LedgerEntry<'a>>,
    budget: TechBudget,
    contract: Option<&ContractTerms>,
) -> LedgerSnapshot {
    // Summed wide: sell values come straight from manifests.
    let (mut employer_money, mut unit_money): (i128, i128) = match contract {
        Some(c) => (c.initial_employer_money.into(), c.initial_unit_money.into()),
        None => (0, 0),
    };
    let mut used_minutes: u64 = 0;
    let mut blockers = Vec::new();

    for entry in entries {
        if entry.assigned {
            used_minutes += u64::from(entry.wreck.recovery_minutes.unwrap_or(0));
            if let Validity::Invalid(reason) = entry.validity {
                blockers.push(Blocker::InvalidAssignment {
                    wreck: entry.wreck.id.clone(),
                    reason,
                });
            }
        }
        if entry.claim.is_claimed() {
            unit_money += i128::from(entry.wreck.sell_value);
        } else {
            employer_money += i128::from(entry.wreck.sell_value);
        }
    }

    if used_minutes > budget.total_minutes {
        blockers.push(Blocker::TimeBudgetExceeded {
            used: used_minutes,
            available: budget.total_minutes,
        });
    }

    let mut derived_unit_share = None;
    if let Some(terms) = contract {
        let cap = terms.percentage();
        if terms.exchange_rights {
            let share = employer_money * i128::from(cap) / 100;
            derived_unit_share = Some(clamp_money(share, "derived_unit_share"));
        } else if unit_money > i128::from(terms.initial_unit_money)
            && exceeds_cap(unit_money, employer_money, cap)
        {
            blockers.push(Blocker::SalvageCapExceeded {
                percent: unit_percentage(unit_money, employer_money),
                cap,
            });
        }
    }

    LedgerSnapshot {
        used_minutes,
        available_minutes: budget.total_minutes,
        employer_money: clamp_money(employer_money, "employer_money"),
        unit_money: clamp_money(unit_money, "unit_money"),
        derived_unit_share,
        blockers,
    }
}
