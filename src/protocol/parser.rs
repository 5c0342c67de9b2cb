//! Command parser.
//!
//! Parses incoming protocol lines from raw text into structured `Command`
//! variants that the engine main loop can dispatch on.

use tracing::warn;

use crate::model::{ClaimState, UnitId, WreckId};
use crate::session::Slot;

/// A parsed front-end-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Initialize the protocol handshake.
    Salvage,

    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Open a session from a single-line JSON manifest.
    Open { manifest: String },

    /// Put a unit in a slot, or clear it with `-`.
    Assign {
        wreck: WreckId,
        slot: Slot,
        unit: Option<UnitId>,
    },

    /// Toggle a Keep/Sell claim.
    Claim { wreck: WreckId, claim: ClaimState },

    /// List the units selectable for a slot.
    Options { wreck: WreckId, slot: Slot },

    /// Report one wreck's slots, validity and claim.
    Status { wreck: WreckId },

    /// Report the ledger.
    Ledger,

    /// Confirm the session and emit the partition.
    Confirm,

    /// Drop the session without confirming.
    Discard,

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    match tokens[0] {
        "salvage" => Some(Command::Salvage),
        "isready" => Some(Command::IsReady),
        "ledger" => Some(Command::Ledger),
        "confirm" => Some(Command::Confirm),
        "discard" => Some(Command::Discard),
        "quit" => Some(Command::Quit),

        "setoption" => parse_setoption(&tokens),
        "open" => parse_open(&tokens, trimmed),
        "assign" => parse_assign(&tokens),
        "claim" => parse_claim(&tokens),
        "options" => parse_options(&tokens),
        "status" => parse_status(&tokens),

        other => {
            warn!(target: "flotsam::protocol", command = other, "unknown command");
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        warn!(target: "flotsam::protocol", "malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let value_idx = tokens.iter().position(|&t| t == "value");

    let (name, value) = match value_idx {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            let value_parts = &tokens[vi + 1..];
            if name_parts.is_empty() {
                warn!(target: "flotsam::protocol", "malformed setoption: empty name");
                return None;
            }
            let name = name_parts.join(" ");
            let value = if value_parts.is_empty() {
                None
            } else {
                Some(value_parts.join(" "))
            };
            (name, value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Some(Command::SetOption { name, value })
}

/// Parses `open <json>`; the manifest is everything after the keyword.
fn parse_open(tokens: &[&str], full_line: &str) -> Option<Command> {
    if tokens.len() < 2 {
        warn!(target: "flotsam::protocol", "malformed open: expected 'open <json-manifest>'");
        return None;
    }
    let manifest = full_line
        .strip_prefix("open")
        .unwrap_or("")
        .trim()
        .to_string();
    Some(Command::Open { manifest })
}

fn parse_slot(token: &str) -> Option<Slot> {
    let slot = Slot::from_protocol_str(token);
    if slot.is_none() {
        warn!(target: "flotsam::protocol", slot = token, "unknown slot");
    }
    slot
}

/// Parses `assign <wreck> <left|right> <unit|->`.
fn parse_assign(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 4 {
        warn!(target: "flotsam::protocol", "malformed assign: expected 'assign <wreck> <left|right> <unit|->'");
        return None;
    }
    let slot = parse_slot(tokens[2])?;
    let unit = match tokens[3] {
        "-" => None,
        id => Some(UnitId::new(id)),
    };
    Some(Command::Assign {
        wreck: WreckId::new(tokens[1]),
        slot,
        unit,
    })
}

/// Parses `claim <wreck> <keep|sell>`.
fn parse_claim(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 3 {
        warn!(target: "flotsam::protocol", "malformed claim: expected 'claim <wreck> <keep|sell>'");
        return None;
    }
    match ClaimState::from_protocol_str(tokens[2]) {
        Some(claim) => Some(Command::Claim {
            wreck: WreckId::new(tokens[1]),
            claim,
        }),
        None => {
            warn!(target: "flotsam::protocol", claim = tokens[2], "unknown claim");
            None
        }
    }
}

/// Parses `options <wreck> <left|right>`.
fn parse_options(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 3 {
        warn!(target: "flotsam::protocol", "malformed options: expected 'options <wreck> <left|right>'");
        return None;
    }
    let slot = parse_slot(tokens[2])?;
    Some(Command::Options {
        wreck: WreckId::new(tokens[1]),
        slot,
    })
}

/// Parses `status <wreck>`.
fn parse_status(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 2 {
        warn!(target: "flotsam::protocol", "malformed status: expected 'status <wreck>'");
        return None;
    }
    Some(Command::Status {
        wreck: WreckId::new(tokens[1]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_commands() {
        assert_eq!(parse_command("salvage"), Some(Command::Salvage));
        assert_eq!(parse_command("isready"), Some(Command::IsReady));
        assert_eq!(parse_command("ledger"), Some(Command::Ledger));
        assert_eq!(parse_command("confirm"), Some(Command::Confirm));
        assert_eq!(parse_command("discard"), Some(Command::Discard));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
    }

    #[test]
    fn parse_empty_line_returns_none() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("\t"), None);
    }

    #[test]
    fn parse_unknown_command_returns_none() {
        assert_eq!(parse_command("foobar"), None);
    }

    #[test]
    fn parse_setoption_with_value() {
        let cmd = parse_command("setoption name SpaceOperation value true").unwrap();
        assert_eq!(
            cmd,
            Command::SetOption {
                name: "SpaceOperation".to_string(),
                value: Some("true".to_string()),
            }
        );
    }

    #[test]
    fn parse_setoption_no_value() {
        let cmd = parse_command("setoption name SpaceOperation").unwrap();
        assert_eq!(
            cmd,
            Command::SetOption {
                name: "SpaceOperation".to_string(),
                value: None,
            }
        );
    }

    #[test]
    fn parse_setoption_malformed_returns_none() {
        assert_eq!(parse_command("setoption"), None);
        assert_eq!(parse_command("setoption foo"), None);
        assert_eq!(parse_command("setoption name value 3"), None);
    }

    #[test]
    fn parse_open_keeps_json_with_spaces() {
        let cmd = parse_command(r#"open {"wrecks": [], "units": []}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Open {
                manifest: r#"{"wrecks": [], "units": []}"#.to_string(),
            }
        );
        assert_eq!(parse_command("open"), None);
    }

    #[test]
    fn parse_assign_and_unassign() {
        assert_eq!(
            parse_command("assign w1 left u7").unwrap(),
            Command::Assign {
                wreck: WreckId::new("w1"),
                slot: Slot::Left,
                unit: Some(UnitId::new("u7")),
            }
        );
        assert_eq!(
            parse_command("assign w1 right -").unwrap(),
            Command::Assign {
                wreck: WreckId::new("w1"),
                slot: Slot::Right,
                unit: None,
            }
        );
    }

    #[test]
    fn parse_assign_malformed_returns_none() {
        assert_eq!(parse_command("assign w1 left"), None);
        assert_eq!(parse_command("assign w1 middle u7"), None);
        assert_eq!(parse_command("assign w1 left u7 extra"), None);
    }

    #[test]
    fn parse_claim_variants() {
        assert_eq!(
            parse_command("claim w2 keep").unwrap(),
            Command::Claim {
                wreck: WreckId::new("w2"),
                claim: ClaimState::Keep,
            }
        );
        assert_eq!(
            parse_command("claim w2 sell").unwrap(),
            Command::Claim {
                wreck: WreckId::new("w2"),
                claim: ClaimState::Sell,
            }
        );
        assert_eq!(parse_command("claim w2 scrap"), None);
        assert_eq!(parse_command("claim w2"), None);
    }

    #[test]
    fn parse_options_and_status() {
        assert_eq!(
            parse_command("options w3 r").unwrap(),
            Command::Options {
                wreck: WreckId::new("w3"),
                slot: Slot::Right,
            }
        );
        assert_eq!(
            parse_command("status w3").unwrap(),
            Command::Status {
                wreck: WreckId::new("w3"),
            }
        );
        assert_eq!(parse_command("status"), None);
    }

    #[test]
    fn parse_with_leading_trailing_whitespace() {
        assert_eq!(parse_command("  salvage  "), Some(Command::Salvage));
        assert_eq!(parse_command("  isready  "), Some(Command::IsReady));
    }
}
