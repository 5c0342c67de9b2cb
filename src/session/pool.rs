//! Recovery pool sanitization.
//!
//! Run once when a session opens. Units that cannot take part in recovery
//! are set aside together with the reason, so a front end can explain why
//! a unit is missing from the choices.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{RecoveryUnit, UnitId};

/// Why a unit was left out of the recovery pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolExclusion {
    /// Not fully crewed or not operational.
    NotOperational,
    /// Trailers are hauled, they do not haul.
    Trailer,
    /// Already committed to another open salvage session today.
    CommittedElsewhere,
}

impl PoolExclusion {
    pub const fn code(self) -> &'static str {
        match self {
            PoolExclusion::NotOperational => "not_operational",
            PoolExclusion::Trailer => "trailer",
            PoolExclusion::CommittedElsewhere => "committed_elsewhere",
        }
    }
}

impl fmt::Display for PoolExclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A unit set aside during sanitization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedUnit {
    pub id: UnitId,
    pub reason: PoolExclusion,
}

/// Splits the candidate units into the recovery pool and the excluded set.
///
/// Exclusions are checked in order: commitment to another session, then
/// trailer, then operational status; the first match is recorded.
/// Units with malformed numbers stay in the pool; capacity resolution treats
/// the bad values as zero.
pub fn sanitize_pool(
    units: Vec<RecoveryUnit>,
    excluded_unit_ids: &HashSet<UnitId>,
) -> (Vec<RecoveryUnit>, Vec<ExcludedUnit>) {
    let mut pool = Vec::with_capacity(units.len());
    let mut excluded = Vec::new();

    for unit in units {
        let reason = if excluded_unit_ids.contains(&unit.id) {
            Some(PoolExclusion::CommittedElsewhere)
        } else if unit.is_trailer {
            Some(PoolExclusion::Trailer)
        } else if !unit.is_fully_operational {
            Some(PoolExclusion::NotOperational)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                debug!(target: "flotsam::pool", unit = %unit.id, reason = %reason, "pool.excluded");
                excluded.push(ExcludedUnit { id: unit.id, reason });
            }
            None => {
                let malformed = unit.malformed_fields();
                if !malformed.is_empty() {
                    warn!(
                        target: "flotsam::pool",
                        unit = %unit.id,
                        fields = ?malformed,
                        "pool.unit.malformed"
                    );
                }
                pool.push(unit);
            }
        }
    }

    (pool, excluded)
}
