//! Contract salvage terms and the technician time budget.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Salvage clauses of a mercenary contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTerms {
    /// Share of salvage value the unit may claim, 0-100.
    pub salvage_percentage: u8,
    /// When set, the unit's share is derived from the employer's total and the
    /// percentage cap is not enforced.
    #[serde(default)]
    pub exchange_rights: bool,
    /// Money already credited to the employer by earlier resolutions in the
    /// same mission.
    #[serde(default)]
    pub initial_employer_money: i64,
    /// Money already credited to the unit by earlier resolutions.
    #[serde(default)]
    pub initial_unit_money: i64,
}

impl ContractTerms {
    pub fn new(salvage_percentage: u8) -> Self {
        ContractTerms {
            salvage_percentage: salvage_percentage.min(100),
            exchange_rights: false,
            initial_employer_money: 0,
            initial_unit_money: 0,
        }
    }

    pub fn with_exchange_rights(mut self) -> Self {
        self.exchange_rights = true;
        self
    }

    pub fn with_initial_money(mut self, employer: i64, unit: i64) -> Self {
        self.initial_employer_money = employer;
        self.initial_unit_money = unit;
        self
    }

    /// Percentage clamped into 0-100.
    pub fn percentage(&self) -> u8 {
        self.salvage_percentage.min(100)
    }
}

/// Identifies a technician.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechId(pub String);

impl TechId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for TechId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A technician committed to the salvage operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    pub id: TechId,
    /// Minutes of work remaining today.
    pub minutes: u32,
}

/// Total technician minutes available to a session. Fixed once the session
/// opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TechBudget {
    pub total_minutes: u64,
}

impl TechBudget {
    pub fn new(total_minutes: u64) -> Self {
        TechBudget { total_minutes }
    }

    /// Sums the remaining minutes of every technician not already committed
    /// to another open session.
    pub fn from_technicians(techs: &[Technician], excluded: &HashSet<TechId>) -> Self {
        let total_minutes = techs
            .iter()
            .filter(|t| !excluded.contains(&t.id))
            .map(|t| u64::from(t.minutes))
            .sum();
        TechBudget { total_minutes }
    }
}
