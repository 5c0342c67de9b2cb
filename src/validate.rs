//! Assignment validation.
//!
//! Decides whether the recovery units placed on a wreck can physically move
//! it. Rules are evaluated in a fixed order and the first failure wins:
//!
//! 1. no units assigned: the wreck is unassigned, which is valid;
//! 2. large vessels in a space operation need a naval tug on every assigned
//!    unit;
//! 3. two units always tow, and their combined tow capacity must cover the
//!    wreck;
//! 4. a single unit hauls as cargo or tows depending on its own weight, and
//!    that capacity must cover the wreck.
//!
//! The naval-tug gate comes before any capacity math.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capacity::{available_for, available_tow, transport_mode, TransportMode};
use crate::model::{RecoveryUnit, Wreck};

/// Why an assignment cannot stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    NoNavalTug,
    InsufficientTowCapacity,
    InsufficientCargoCapacity,
    /// The wreck's own data could not be resolved.
    Unresolvable,
}

impl InvalidReason {
    pub const fn code(self) -> &'static str {
        match self {
            InvalidReason::NoNavalTug => "no_naval_tug",
            InvalidReason::InsufficientTowCapacity => "insufficient_tow_capacity",
            InvalidReason::InsufficientCargoCapacity => "insufficient_cargo_capacity",
            InvalidReason::Unresolvable => "unresolvable",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of validating one wreck's assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    /// No recovery unit assigned. Claimable.
    Unassigned,
    /// Assigned units can move the wreck in the given mode. Claimable.
    Valid(TransportMode),
    Invalid(InvalidReason),
}

impl Validity {
    /// Whether Keep/Sell may be selected for the wreck.
    pub const fn is_claimable(self) -> bool {
        !matches!(self, Validity::Invalid(_))
    }

    pub const fn reason(self) -> Option<InvalidReason> {
        match self {
            Validity::Invalid(r) => Some(r),
            _ => None,
        }
    }

    /// Short protocol token: `unassigned`, `valid:<mode>`, or `invalid:<reason>`.
    pub fn protocol_string(self) -> String {
        match self {
            Validity::Unassigned => "unassigned".to_string(),
            Validity::Valid(mode) => format!("valid:{}", mode.protocol_str()),
            Validity::Invalid(reason) => format!("invalid:{}", reason.code()),
        }
    }
}

/// Validates the units in a wreck's two slots.
pub fn validate_assignment(
    wreck: &Wreck,
    left: Option<&RecoveryUnit>,
    right: Option<&RecoveryUnit>,
    in_space_operation: bool,
) -> Validity {
    if !wreck.is_resolvable() {
        return Validity::Invalid(InvalidReason::Unresolvable);
    }

    let units: Vec<&RecoveryUnit> = left.into_iter().chain(right).collect();
    if units.is_empty() {
        return Validity::Unassigned;
    }

    if in_space_operation && wreck.is_large_vessel && units.iter().any(|u| !u.has_naval_tug) {
        return Validity::Invalid(InvalidReason::NoNavalTug);
    }

    match units.as_slice() {
        [a, b] => {
            if available_tow(a) + available_tow(b) >= wreck.weight {
                Validity::Valid(TransportMode::Tow)
            } else {
                Validity::Invalid(InvalidReason::InsufficientTowCapacity)
            }
        }
        [unit] => {
            let mode = transport_mode(unit);
            if available_for(unit, mode) >= wreck.weight {
                Validity::Valid(mode)
            } else {
                match mode {
                    TransportMode::Tow => Validity::Invalid(InvalidReason::InsufficientTowCapacity),
                    TransportMode::Cargo => {
                        Validity::Invalid(InvalidReason::InsufficientCargoCapacity)
                    }
                }
            }
        }
        _ => Validity::Unassigned,
    }
}
