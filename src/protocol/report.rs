//! Response formatting.
//!
//! Renders session snapshots as the single-line responses of the command
//! protocol. Identifiers never contain whitespace, so responses split on
//! spaces.

use crate::ledger::{Blocker, LedgerSnapshot};
use crate::model::{RecoveryUnit, UnitId, WreckId};
use crate::session::{Assignment, SalvagePartition};
use crate::validate::Validity;

/// `status <wreck> <left|-> <right|-> <validity> <claim>`
pub fn format_status(wreck: &WreckId, assignment: &Assignment, validity: Validity) -> String {
    let slot = |unit: Option<&UnitId>| unit.map_or("-", |u| u.as_str()).to_string();
    format!(
        "status {} {} {} {} {}",
        wreck,
        slot(assignment.left.as_ref()),
        slot(assignment.right.as_ref()),
        validity.protocol_string(),
        assignment.claim,
    )
}

/// `ledger used <m> budget <b> unit <u> employer <e> [share <s>] confirmable <bool>`
pub fn format_ledger(ledger: &LedgerSnapshot) -> String {
    let mut line = format!(
        "ledger used {} budget {} unit {} employer {}",
        ledger.used_minutes, ledger.available_minutes, ledger.unit_money, ledger.employer_money
    );
    if let Some(share) = ledger.derived_unit_share {
        line.push_str(&format!(" share {}", share));
    }
    line.push_str(&format!(" confirmable {}", ledger.confirmable()));
    line
}

/// One `blocker ...` line.
pub fn format_blocker(blocker: &Blocker) -> String {
    match blocker {
        Blocker::InvalidAssignment { wreck, reason } => {
            format!("blocker invalid_assignment {} {}", wreck, reason)
        }
        Blocker::TimeBudgetExceeded { used, available } => {
            format!("blocker time_budget_exceeded used {} available {}", used, available)
        }
        Blocker::SalvageCapExceeded { percent, cap } => {
            format!("blocker salvage_cap_exceeded percent {:.1} cap {}", percent, cap)
        }
    }
}

/// `options <unit> <unit> ...`
pub fn format_options(units: &[&RecoveryUnit]) -> String {
    let mut line = String::from("options");
    for unit in units {
        line.push(' ');
        line.push_str(unit.id.as_str());
    }
    line
}

/// `partition <json>`
pub fn format_partition(partition: &SalvagePartition) -> Result<String, serde_json::Error> {
    Ok(format!("partition {}", serde_json::to_string(partition)?))
}
