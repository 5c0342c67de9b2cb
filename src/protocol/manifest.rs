//! Session manifests.
//!
//! A manifest is the JSON description of one post-battle salvage run: the
//! wrecks, the candidate recovery units, technicians, contract terms, and the
//! units/techs already committed to other open sessions. It travels on a
//! single line after the `open` command.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capacity::RecoveryTimeLookup;
use crate::model::{ContractTerms, RecoveryUnit, TechBudget, TechId, Technician, UnitId, Wreck, WreckId};
use crate::session::SessionInput;

/// Errors that can occur when reading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("salvage percentage {0} is outside 0-100")]
    InvalidPercentage(u8),
}

/// A wreck as described by the battle's salvage output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WreckDescriptor {
    pub id: WreckId,
    pub weight: f64,
    #[serde(default)]
    pub sell_value: i64,
    /// Precomputed recovery time. May be absent when an external lookup
    /// supplies it instead.
    #[serde(default)]
    pub recovery_minutes: Option<u32>,
    #[serde(default)]
    pub is_large_vessel: bool,
}

/// Indexes the recovery times carried by the descriptors themselves.
pub fn descriptor_times(descriptors: &[WreckDescriptor]) -> HashMap<WreckId, u32> {
    descriptors
        .iter()
        .filter_map(|d| d.recovery_minutes.map(|m| (d.id.clone(), m)))
        .collect()
}

/// The full JSON input of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub wrecks: Vec<WreckDescriptor>,
    #[serde(default)]
    pub units: Vec<RecoveryUnit>,
    #[serde(default)]
    pub techs: Vec<Technician>,
    /// Overrides the technician sum when present.
    #[serde(default)]
    pub total_minutes: Option<u64>,
    #[serde(default)]
    pub contract: Option<ContractTerms>,
    #[serde(default)]
    pub in_space_operation: bool,
    #[serde(default)]
    pub excluded_unit_ids: Vec<UnitId>,
    #[serde(default)]
    pub excluded_tech_ids: Vec<TechId>,
}

/// Parses a manifest from JSON text.
pub fn parse_manifest(s: &str) -> Result<Manifest, ManifestError> {
    let manifest: Manifest = serde_json::from_str(s)?;
    if let Some(terms) = &manifest.contract {
        if terms.salvage_percentage > 100 {
            return Err(ManifestError::InvalidPercentage(terms.salvage_percentage));
        }
    }
    Ok(manifest)
}

impl Manifest {
    /// The technician budget after removing techs busy in other sessions.
    pub fn budget(&self) -> TechBudget {
        match self.total_minutes {
            Some(total) => TechBudget::new(total),
            None => {
                let excluded: HashSet<TechId> = self.excluded_tech_ids.iter().cloned().collect();
                TechBudget::from_technicians(&self.techs, &excluded)
            }
        }
    }

    /// Converts into session input using the descriptors' own recovery times.
    pub fn into_session_input(self) -> SessionInput {
        let times = descriptor_times(&self.wrecks);
        self.into_session_input_with(&times)
    }

    /// Converts into session input, resolving recovery times through an
    /// external lookup. Wrecks the lookup cannot resolve are kept with no
    /// recovery time.
    pub fn into_session_input_with<L>(self, lookup: &L) -> SessionInput
    where
        L: RecoveryTimeLookup + ?Sized,
    {
        let budget = self.budget();
        let wrecks = self
            .wrecks
            .into_iter()
            .map(|d| Wreck {
                recovery_minutes: lookup.recovery_minutes(&d.id),
                id: d.id,
                weight: d.weight,
                sell_value: d.sell_value,
                is_large_vessel: d.is_large_vessel,
            })
            .collect();

        SessionInput {
            wrecks,
            units: self.units,
            budget,
            contract: self.contract,
            in_space_operation: self.in_space_operation,
            excluded_unit_ids: self.excluded_unit_ids.into_iter().collect(),
        }
    }
}
