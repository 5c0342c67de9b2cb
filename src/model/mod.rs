//! Salvage data model.
//!
//! Contains the wrecks left on the field, the friendly recovery units that can
//! haul them, and the contract and technician terms a session runs under.

pub mod contract;
pub mod recovery_unit;
pub mod wreck;

pub use contract::{ContractTerms, TechBudget, TechId, Technician};
pub use recovery_unit::{RecoveryUnit, UnitId};
pub use wreck::{ClaimState, Wreck, WreckId};
