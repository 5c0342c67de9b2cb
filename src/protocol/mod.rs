//! Command protocol handling.
//!
//! Parsing and formatting for the line-oriented protocol a front end uses to
//! drive a salvage session: JSON session manifests, the command parser for
//! the main loop, and the response lines.

pub mod manifest;
pub mod parser;
pub mod report;

pub use manifest::{descriptor_times, parse_manifest, Manifest, ManifestError, WreckDescriptor};
pub use parser::{parse_command, Command};
pub use report::{format_blocker, format_ledger, format_options, format_partition, format_status};
