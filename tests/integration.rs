//! Integration tests for the flotsam engine binary.
//!
//! Tests the full protocol session flow by spawning the engine process,
//! sending commands via stdin, and verifying stdout responses.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

use flotsam::session::SalvagePartition;

/// Sends a sequence of commands to the engine and collects stdout lines.
fn run_engine(commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_flotsam");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start flotsam");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

/// Two wrecks, two units, 100 technician minutes, 50% contract.
const MANIFEST: &str = r#"open {"wrecks":[{"id":"w1","weight":50.0,"sell_value":600,"recovery_minutes":60},{"id":"w2","weight":30.0,"sell_value":400,"recovery_minutes":50}],"units":[{"id":"hauler","weight":20.0,"cargo_capacity":80.0,"tow_capacity":10.0},{"id":"tug","weight":60.0,"tow_capacity":35.0},{"id":"wagon","weight":5.0,"cargo_capacity":20.0,"is_trailer":true}],"techs":[{"id":"t1","minutes":100},{"id":"t2","minutes":300}],"excluded_tech_ids":["t2"],"contract":{"salvage_percentage":50}}"#;

#[test]
fn handshake_with_protocol_version() {
    let lines = run_engine(&["salvage", "quit"]);

    assert!(lines.iter().any(|l| l == "id name flotsam"));
    assert!(lines.iter().any(|l| l == "protocol_version 1"));
    assert_eq!(lines.last().map(String::as_str), Some("salvageok"));

    let option_lines: Vec<&String> = lines.iter().filter(|l| l.starts_with("option ")).collect();
    assert!(!option_lines.is_empty(), "handshake should include option declarations");
    for opt in &option_lines {
        assert!(opt.contains("type "), "option line missing type: {}", opt);
    }
}

#[test]
fn unknown_and_empty_lines_are_ignored() {
    let lines = run_engine(&["foobar", "", "  ", "assign w1", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok"]);
}

#[test]
fn open_reports_sanitized_pool_and_budget() {
    let lines = run_engine(&[MANIFEST, "quit"]);
    assert_eq!(
        lines,
        vec![
            "opened wrecks 2 pool 2 excluded 1",
            "ledger used 0 budget 100 unit 0 employer 1000 confirmable true",
        ]
    );
}

#[test]
fn malformed_manifest_does_not_crash() {
    let lines = run_engine(&["open {\"wrecks\":", "isready", "quit"]);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("error invalid manifest JSON"));
    assert_eq!(lines[1], "readyok");
}

#[test]
fn commands_before_open_report_errors() {
    let lines = run_engine(&["ledger", "status w1", "confirm", "quit"]);
    assert_eq!(lines, vec!["error no session open"; 3]);
}

#[test]
fn assign_claim_and_confirm() {
    let lines = run_engine(&[
        MANIFEST,
        "assign w1 left hauler",
        "claim w1 sell",
        "status w1",
        "confirm",
        "ledger",
        "quit",
    ]);

    assert_eq!(lines[2], "status w1 hauler - valid:cargo unclaimed");
    assert_eq!(lines[3], "ledger used 60 budget 100 unit 0 employer 1000 confirmable true");

    // 600 of 1000 is over the 50% cap.
    assert_eq!(lines[4], "status w1 hauler - valid:cargo sell");
    assert_eq!(lines[5], "ledger used 60 budget 100 unit 600 employer 400 confirmable false");
    assert_eq!(lines[6], "blocker salvage_cap_exceeded percent 60.0 cap 50");
    assert_eq!(lines[7], "status w1 hauler - valid:cargo sell");

    assert!(lines[8].starts_with("error session is not confirmable"));
    assert_eq!(lines[9], "blocker salvage_cap_exceeded percent 60.0 cap 50");
    // Session is still open after a refused confirm.
    assert!(lines[10].starts_with("ledger used 60"));
}

#[test]
fn confirm_emits_partition_and_closes_session() {
    let lines = run_engine(&[
        MANIFEST,
        "assign w2 right tug",
        "claim w2 keep",
        "confirm",
        "ledger",
        "quit",
    ]);

    let partition_line = lines
        .iter()
        .find(|l| l.starts_with("partition "))
        .expect("partition line");
    let partition: SalvagePartition =
        serde_json::from_str(partition_line.trim_start_matches("partition ")).unwrap();
    assert_eq!(partition.kept.len(), 1);
    assert_eq!(partition.kept[0].as_str(), "w2");
    assert!(partition.sold.is_empty());
    assert_eq!(partition.employer_ceded[0].as_str(), "w1");
    assert_eq!(partition.ledger.unit_money, 400);

    assert_eq!(lines.last().map(String::as_str), Some("error no session open"));
}

#[test]
fn booked_unit_is_refused_and_hidden_from_options() {
    let lines = run_engine(&[
        MANIFEST,
        "assign w1 left hauler",
        "options w2 left",
        "options w1 left",
        "assign w2 left hauler",
        "assign w2 left wagon",
        "quit",
    ]);

    assert_eq!(lines[4], "options tug");
    assert_eq!(lines[5], "options hauler tug");
    assert_eq!(
        lines[6],
        "error unit 'hauler' is not available for the left slot of wreck 'w2'"
    );
    assert_eq!(
        lines[7],
        "error unit 'wagon' is not available for the left slot of wreck 'w2'"
    );
}

#[test]
fn invalid_assignment_refuses_claims() {
    let lines = run_engine(&[MANIFEST, "assign w1 left tug", "claim w1 keep", "quit"]);

    assert_eq!(lines[2], "status w1 tug - invalid:insufficient_tow_capacity unclaimed");
    assert_eq!(lines[3], "ledger used 60 budget 100 unit 0 employer 1000 confirmable false");
    assert_eq!(lines[4], "blocker invalid_assignment w1 insufficient_tow_capacity");
    assert_eq!(
        lines[5],
        "error wreck 'w1' cannot be claimed: insufficient_tow_capacity"
    );
}

#[test]
fn space_operation_option_applies_to_next_open() {
    let manifest = r#"open {"wrecks":[{"id":"cruiser","weight":40.0,"sell_value":5000,"recovery_minutes":90,"is_large_vessel":true}],"units":[{"id":"lifter","weight":10.0,"cargo_capacity":500.0}],"total_minutes":480}"#;
    let lines = run_engine(&[
        "setoption name SpaceOperation value true",
        manifest,
        "assign cruiser left lifter",
        "quit",
    ]);
    assert_eq!(lines[2], "status cruiser lifter - invalid:no_naval_tug unclaimed");
}

#[test]
fn discard_drops_the_session() {
    let lines = run_engine(&[MANIFEST, "discard", "ledger", "quit"]);
    assert_eq!(lines.last().map(String::as_str), Some("error no session open"));
}

#[test]
fn eof_exits_cleanly() {
    let lines = run_engine(&["salvage", "isready"]);
    assert!(lines.iter().any(|l| l == "salvageok"));
    assert!(lines.iter().any(|l| l == "readyok"));
}
