//! Flotsam -- a salvage reconciliation engine speaking a line protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Diagnostics go to stderr through `tracing`.

use std::io::{self, BufRead, Write};

use flotsam::engine::Engine;
use flotsam::logging;
use flotsam::protocol::parser::{parse_command, Command};

/// Runs the main protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() {
    logging::init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        let result = match cmd {
            Command::Salvage => engine.handle_salvage(&mut out),
            Command::IsReady => engine.handle_isready(&mut out),
            Command::SetOption { name, value } => {
                engine.set_option(name, value);
                Ok(())
            }
            Command::Open { manifest } => engine.handle_open(&manifest, &mut out),
            Command::Assign { wreck, slot, unit } => {
                engine.handle_assign(&wreck, slot, unit.as_ref(), &mut out)
            }
            Command::Claim { wreck, claim } => engine.handle_claim(&wreck, claim, &mut out),
            Command::Options { wreck, slot } => engine.handle_options(&wreck, slot, &mut out),
            Command::Status { wreck } => engine.handle_status(&wreck, &mut out),
            Command::Ledger => engine.handle_ledger(&mut out),
            Command::Confirm => engine.handle_confirm(&mut out),
            Command::Discard => {
                engine.discard();
                Ok(())
            }
            Command::Quit => break,
        };

        if let Err(e) = result {
            tracing::error!(target: "flotsam::engine", error = %e, "failed to write response");
            break;
        }
    }

    let _ = out.flush();
}
