//! Wrecks and claims.
//!
//! A wreck is a destroyed or abandoned unit recovered after battle. The player
//! force may claim it to keep or to sell; anything left unclaimed goes to the
//! employer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a wreck within one salvage session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WreckId(pub String);

impl WreckId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WreckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The player's claim on a wreck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimState {
    #[default]
    Unclaimed,
    Keep,
    Sell,
}

impl ClaimState {
    /// Returns the lowercase keyword used by the command protocol.
    pub const fn protocol_str(self) -> &'static str {
        match self {
            ClaimState::Unclaimed => "unclaimed",
            ClaimState::Keep => "keep",
            ClaimState::Sell => "sell",
        }
    }

    /// Parses a claim from its protocol keyword.
    pub fn from_protocol_str(s: &str) -> Option<ClaimState> {
        match s {
            "unclaimed" | "none" => Some(ClaimState::Unclaimed),
            "keep" => Some(ClaimState::Keep),
            "sell" => Some(ClaimState::Sell),
            _ => None,
        }
    }

    /// True for Keep and Sell: the wreck's value goes to the player force.
    pub const fn is_claimed(self) -> bool {
        !matches!(self, ClaimState::Unclaimed)
    }
}

impl fmt::Display for ClaimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.protocol_str())
    }
}

/// A salvage candidate as tracked by a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wreck {
    pub id: WreckId,
    /// Weight in tons.
    pub weight: f64,
    pub sell_value: i64,
    /// Technician minutes needed to recover the wreck. `None` when the
    /// recovery-time lookup had no entry for it.
    pub recovery_minutes: Option<u32>,
    pub is_large_vessel: bool,
}

impl Wreck {
    /// Creates an ordinary (non-vessel) wreck with a known recovery time.
    pub fn new(id: impl Into<String>, weight: f64, sell_value: i64, recovery_minutes: u32) -> Self {
        Wreck {
            id: WreckId::new(id),
            weight,
            sell_value,
            recovery_minutes: Some(recovery_minutes),
            is_large_vessel: false,
        }
    }

    /// Marks the wreck as a large space vessel.
    pub fn large_vessel(mut self) -> Self {
        self.is_large_vessel = true;
        self
    }

    /// Whether the wreck's data is complete enough to validate an assignment.
    pub fn is_resolvable(&self) -> bool {
        self.recovery_minutes.is_some() && self.weight.is_finite() && self.weight >= 0.0
    }
}
