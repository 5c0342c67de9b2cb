//! Remaining haul capacity and recovery-time lookup.
//!
//! Cargo and tow are independent capacity pools: towing commitments reduce
//! tow capacity only. Every function here is a pure function of the unit
//! snapshot taken when the session opened.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{RecoveryUnit, WreckId};

/// How a single recovery unit moves a wreck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Cargo,
    Tow,
}

impl TransportMode {
    pub const fn protocol_str(self) -> &'static str {
        match self {
            TransportMode::Cargo => "cargo",
            TransportMode::Tow => "tow",
        }
    }
}

/// Non-finite or negative capacity counts as none at all.
fn clamp_capacity(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Weight the unit can still carry internally.
pub fn available_cargo(unit: &RecoveryUnit) -> f64 {
    clamp_capacity(unit.cargo_capacity)
}

/// Weight the unit can still tow. Trailers cannot tow.
pub fn available_tow(unit: &RecoveryUnit) -> f64 {
    if unit.is_trailer || !unit.committed_tow_load.is_finite() {
        return 0.0;
    }
    clamp_capacity(unit.tow_capacity - unit.committed_tow_load.max(0.0))
}

/// Picks the mode a unit hauls in when assigned alone: a unit at least as
/// heavy as its own cargo capacity is a tow provider.
pub fn transport_mode(unit: &RecoveryUnit) -> TransportMode {
    if unit.weight >= unit.cargo_capacity {
        TransportMode::Tow
    } else {
        TransportMode::Cargo
    }
}

/// Capacity available to a single unit in the given mode.
pub fn available_for(unit: &RecoveryUnit, mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Cargo => available_cargo(unit),
        TransportMode::Tow => available_tow(unit),
    }
}

/// Source of per-wreck recovery times, computed by an external calculator.
pub trait RecoveryTimeLookup {
    /// Technician minutes needed to recover the wreck, or `None` if the
    /// calculator has no figure for it.
    fn recovery_minutes(&self, wreck: &WreckId) -> Option<u32>;
}

impl RecoveryTimeLookup for HashMap<WreckId, u32> {
    fn recovery_minutes(&self, wreck: &WreckId) -> Option<u32> {
        self.get(wreck).copied()
    }
}

impl<F> RecoveryTimeLookup for F
where
    F: Fn(&WreckId) -> Option<u32>,
{
    fn recovery_minutes(&self, wreck: &WreckId) -> Option<u32> {
        self(wreck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cargo_ignores_tow_commitments() {
        let u = RecoveryUnit::new("u1", 20.0, 80.0, 30.0).with_committed_tow_load(25.0);
        assert_eq!(available_cargo(&u), 80.0);
        assert_eq!(available_tow(&u), 5.0);
    }

    #[test]
    fn tow_never_goes_negative() {
        let u = RecoveryUnit::new("u1", 20.0, 0.0, 30.0).with_committed_tow_load(45.0);
        assert_eq!(available_tow(&u), 0.0);
    }

    #[test]
    fn trailer_cannot_tow() {
        let u = RecoveryUnit::new("t1", 10.0, 40.0, 100.0).trailer();
        assert_eq!(available_tow(&u), 0.0);
        assert_eq!(available_cargo(&u), 40.0);
    }

    #[test]
    fn malformed_numbers_give_zero_capacity() {
        let mut u = RecoveryUnit::new("u1", 20.0, f64::NAN, f64::INFINITY);
        assert_eq!(available_cargo(&u), 0.0);
        assert_eq!(available_tow(&u), 0.0);

        u.tow_capacity = 50.0;
        u.committed_tow_load = f64::NAN;
        assert_eq!(available_tow(&u), 0.0);

        u.cargo_capacity = -10.0;
        assert_eq!(available_cargo(&u), 0.0);
    }

    #[test]
    fn negative_commitment_does_not_add_capacity() {
        let u = RecoveryUnit::new("u1", 20.0, 0.0, 30.0).with_committed_tow_load(-15.0);
        assert_eq!(available_tow(&u), 30.0);
    }

    #[test]
    fn mode_follows_weight_against_cargo() {
        assert_eq!(
            transport_mode(&RecoveryUnit::new("light", 20.0, 80.0, 10.0)),
            TransportMode::Cargo
        );
        assert_eq!(
            transport_mode(&RecoveryUnit::new("heavy", 60.0, 40.0, 30.0)),
            TransportMode::Tow
        );
        assert_eq!(
            transport_mode(&RecoveryUnit::new("even", 50.0, 50.0, 30.0)),
            TransportMode::Tow
        );
    }

    #[test]
    fn lookup_from_map_and_closure() {
        let mut map = HashMap::new();
        map.insert(WreckId::new("w1"), 60);
        assert_eq!(map.recovery_minutes(&WreckId::new("w1")), Some(60));
        assert_eq!(map.recovery_minutes(&WreckId::new("w2")), None);

        let flat = |_: &WreckId| Some(45u32);
        assert_eq!(flat.recovery_minutes(&WreckId::new("anything")), Some(45));
    }
}
