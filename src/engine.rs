//! Engine state management.
//!
//! Holds the open salvage session (at most one), the engine options, and
//! turns parsed commands into response lines.

use std::collections::HashMap;
use std::io::{self, Write};

use tracing::{info, warn};

use crate::model::{ClaimState, UnitId, WreckId};
use crate::protocol::manifest::parse_manifest;
use crate::protocol::report::{
    format_blocker, format_ledger, format_options, format_partition, format_status,
};
use crate::session::{SalvageSession, SessionError, Slot};

/// Option overriding the manifest's `in_space_operation` flag.
pub const OPTION_SPACE_OPERATION: &str = "SpaceOperation";

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub session: Option<SalvageSession>,
    pub options: HashMap<String, String>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with no session open.
    pub fn new() -> Self {
        Engine {
            session: None,
            options: HashMap::new(),
        }
    }

    /// Sets an engine option.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        self.options.insert(name, value.unwrap_or_default());
    }

    /// The configured space-operation override, if any. A bare
    /// `setoption name SpaceOperation` counts as `true`.
    pub fn space_operation_override(&self) -> Option<bool> {
        self.options
            .get(OPTION_SPACE_OPERATION)
            .and_then(|v| match v.to_ascii_lowercase().as_str() {
                "" | "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                other => {
                    warn!(target: "flotsam::engine", value = other, "ignoring SpaceOperation value");
                    None
                }
            })
    }

    /// Handles the handshake: writes id, options, protocol_version, and salvageok.
    pub fn handle_salvage<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name flotsam")?;
        writeln!(out, "id author flotsam")?;
        writeln!(out, "option name {} type check default false", OPTION_SPACE_OPERATION)?;
        writeln!(out, "protocol_version 1")?;
        writeln!(out, "salvageok")?;
        out.flush()
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Opens a session from a JSON manifest. An open session is replaced
    /// only when the new one opens successfully.
    pub fn handle_open<W: Write>(&mut self, manifest: &str, out: &mut W) -> io::Result<()> {
        let manifest = match parse_manifest(manifest) {
            Ok(m) => m,
            Err(e) => return write_error(out, &e),
        };

        let mut input = manifest.into_session_input();
        if let Some(space) = self.space_operation_override() {
            input.in_space_operation = space;
        }

        match SalvageSession::open(input) {
            Ok(session) => {
                if self.session.is_some() {
                    info!(target: "flotsam::engine", "replacing open session");
                }
                writeln!(
                    out,
                    "opened wrecks {} pool {} excluded {}",
                    session.wrecks().len(),
                    session.pool().len(),
                    session.excluded().len()
                )?;
                write_ledger(out, &session)?;
                self.session = Some(session);
                out.flush()
            }
            Err(e) => write_error(out, &e),
        }
    }

    /// Handles `assign`, replying with the wreck's status and the ledger.
    pub fn handle_assign<W: Write>(
        &mut self,
        wreck: &WreckId,
        slot: Slot,
        unit: Option<&UnitId>,
        out: &mut W,
    ) -> io::Result<()> {
        let Some(session) = self.session.as_mut() else {
            return write_no_session(out);
        };
        match session.assign(wreck, slot, unit) {
            Ok(()) => write_status_and_ledger(out, session, wreck),
            Err(e) => write_error(out, &e),
        }
    }

    /// Handles `claim`, replying with the wreck's status and the ledger.
    pub fn handle_claim<W: Write>(
        &mut self,
        wreck: &WreckId,
        claim: ClaimState,
        out: &mut W,
    ) -> io::Result<()> {
        let Some(session) = self.session.as_mut() else {
            return write_no_session(out);
        };
        match session.toggle_claim(wreck, claim) {
            Ok(()) => write_status_and_ledger(out, session, wreck),
            Err(e) => write_error(out, &e),
        }
    }

    /// Handles `options`.
    pub fn handle_options<W: Write>(&self, wreck: &WreckId, slot: Slot, out: &mut W) -> io::Result<()> {
        let Some(session) = self.session.as_ref() else {
            return write_no_session(out);
        };
        match session.available_options_for(wreck, slot) {
            Ok(units) => {
                writeln!(out, "{}", format_options(&units))?;
                out.flush()
            }
            Err(e) => write_error(out, &e),
        }
    }

    /// Handles `status`.
    pub fn handle_status<W: Write>(&self, wreck: &WreckId, out: &mut W) -> io::Result<()> {
        let Some(session) = self.session.as_ref() else {
            return write_no_session(out);
        };
        match status_line(session, wreck) {
            Ok(line) => {
                writeln!(out, "{}", line)?;
                out.flush()
            }
            Err(e) => write_error(out, &e),
        }
    }

    /// Handles `ledger`.
    pub fn handle_ledger<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let Some(session) = self.session.as_ref() else {
            return write_no_session(out);
        };
        write_ledger(out, session)?;
        out.flush()
    }

    /// Handles `confirm`. On success the partition is written and the session
    /// is discarded; otherwise the session stays open.
    pub fn handle_confirm<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(session) = self.session.as_ref() else {
            return write_no_session(out);
        };
        match session.confirm() {
            Ok(partition) => {
                let line = format_partition(&partition).map_err(io::Error::other)?;
                writeln!(out, "{}", line)?;
                self.session = None;
                out.flush()
            }
            Err(e) => {
                writeln!(out, "error {}", e)?;
                for blocker in &session.ledger().blockers {
                    writeln!(out, "{}", format_blocker(blocker))?;
                }
                out.flush()
            }
        }
    }

    /// Handles `discard`.
    pub fn discard(&mut self) {
        if self.session.take().is_some() {
            info!(target: "flotsam::engine", "session discarded");
        }
    }
}

fn status_line(session: &SalvageSession, wreck: &WreckId) -> Result<String, SessionError> {
    let (assignment, validity) = session.wreck_status(wreck)?;
    Ok(format_status(wreck, assignment, validity))
}

fn write_status_and_ledger<W: Write>(
    out: &mut W,
    session: &SalvageSession,
    wreck: &WreckId,
) -> io::Result<()> {
    match status_line(session, wreck) {
        Ok(line) => writeln!(out, "{}", line)?,
        Err(e) => writeln!(out, "error {}", e)?,
    }
    write_ledger(out, session)?;
    out.flush()
}

fn write_ledger<W: Write>(out: &mut W, session: &SalvageSession) -> io::Result<()> {
    let ledger = session.ledger();
    writeln!(out, "{}", format_ledger(ledger))?;
    for blocker in &ledger.blockers {
        writeln!(out, "{}", format_blocker(blocker))?;
    }
    Ok(())
}

fn write_error<W: Write>(out: &mut W, err: &dyn std::error::Error) -> io::Result<()> {
    warn!(target: "flotsam::engine", error = %err, "command failed");
    writeln!(out, "error {}", err)?;
    out.flush()
}

fn write_no_session<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "error no session open")?;
    out.flush()
}
