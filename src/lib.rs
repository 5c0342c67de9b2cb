//! Flotsam salvage reconciliation library.
//!
//! Exposes the capacity rules, assignment validation, the allocation ledger,
//! the interactive session, and the protocol modules for use by integration
//! tests and the binary entry points.

pub mod capacity;
pub mod engine;
pub mod exercise;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod session;
pub mod validate;
