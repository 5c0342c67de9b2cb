//! Friendly units able to haul wrecks off the field.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a recovery unit within one salvage session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn default_true() -> bool {
    true
}

/// A candidate recovery unit.
///
/// Capacities and weights are in tons. `committed_tow_load` is weight the unit
/// is already towing for unrelated reasons (a trailer hitched elsewhere, for
/// instance) and is snapshotted when the session opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryUnit {
    pub id: UnitId,
    pub weight: f64,
    #[serde(default)]
    pub cargo_capacity: f64,
    #[serde(default)]
    pub tow_capacity: f64,
    #[serde(default)]
    pub committed_tow_load: f64,
    #[serde(default)]
    pub has_naval_tug: bool,
    #[serde(default)]
    pub is_trailer: bool,
    #[serde(default = "default_true")]
    pub is_fully_operational: bool,
}

impl RecoveryUnit {
    /// Creates an operational, non-trailer unit with no prior commitments.
    pub fn new(id: impl Into<String>, weight: f64, cargo_capacity: f64, tow_capacity: f64) -> Self {
        RecoveryUnit {
            id: UnitId::new(id),
            weight,
            cargo_capacity,
            tow_capacity,
            committed_tow_load: 0.0,
            has_naval_tug: false,
            is_trailer: false,
            is_fully_operational: true,
        }
    }

    pub fn with_naval_tug(mut self) -> Self {
        self.has_naval_tug = true;
        self
    }

    pub fn with_committed_tow_load(mut self, load: f64) -> Self {
        self.committed_tow_load = load;
        self
    }

    pub fn trailer(mut self) -> Self {
        self.is_trailer = true;
        self
    }

    pub fn not_operational(mut self) -> Self {
        self.is_fully_operational = false;
        self
    }

    /// Returns the names of numeric fields holding NaN, infinite, or negative
    /// values. Such values come from malformed upstream data.
    pub fn malformed_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("weight", self.weight),
            ("cargo_capacity", self.cargo_capacity),
            ("tow_capacity", self.tow_capacity),
            ("committed_tow_load", self.committed_tow_load),
        ];
        fields
            .iter()
            .filter(|(_, v)| !v.is_finite() || *v < 0.0)
            .map(|(name, _)| *name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_unit_defaults() {
        let u = RecoveryUnit::new("u1", 20.0, 80.0, 10.0);
        assert_eq!(u.id, UnitId::new("u1"));
        assert!(u.is_fully_operational);
        assert!(!u.is_trailer);
        assert!(!u.has_naval_tug);
        assert_eq!(u.committed_tow_load, 0.0);
    }

    #[test]
    fn deserialize_fills_defaults() {
        let u: RecoveryUnit = serde_json::from_str(r#"{"id":"u9","weight":35.0}"#).unwrap();
        assert_eq!(u.cargo_capacity, 0.0);
        assert!(u.is_fully_operational);
        assert!(!u.is_trailer);
    }

    #[test]
    fn malformed_fields_reports_bad_numbers() {
        let mut u = RecoveryUnit::new("u1", 20.0, 80.0, 10.0);
        assert!(u.malformed_fields().is_empty());
        u.tow_capacity = f64::NAN;
        u.committed_tow_load = -5.0;
        assert_eq!(u.malformed_fields(), vec!["tow_capacity", "committed_tow_load"]);
    }
}
