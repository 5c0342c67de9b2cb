//! Randomized session exerciser CLI.
//!
//! Runs random salvage sessions through random edits, checking the session
//! invariants after every edit, and writes one JSONL record per session.
//!
//! Usage:
//!   cargo run --release --bin exercise -- [OPTIONS]
//!
//! Options:
//!   --sessions N    Number of sessions to run (default: 100)
//!   --edits N       Random edits per session (default: 200)
//!   --max-wrecks N  Upper bound on wrecks per session (default: 12)
//!   --max-units N   Upper bound on units per session (default: 8)
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress progress output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use tracing::{error, info};

use flotsam::exercise::{self, ExerciseConfig};
use flotsam::logging;

fn parse_value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|s| s.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn main() {
    logging::init();

    let args: Vec<String> = env::args().collect();
    let mut config = ExerciseConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sessions" => {
                i += 1;
                config.sessions = parse_value(&args, i, "--sessions");
            }
            "--edits" => {
                i += 1;
                config.edits = parse_value(&args, i, "--edits");
            }
            "--max-wrecks" => {
                i += 1;
                config.max_wrecks = parse_value(&args, i, "--max-wrecks");
            }
            "--max-units" => {
                i += 1;
                config.max_units = parse_value(&args, i, "--max-units");
            }
            "--threads" => {
                i += 1;
                config.threads = parse_value(&args, i, "--threads");
            }
            "--seed" => {
                i += 1;
                config.seed = parse_value(&args, i, "--seed");
            }
            "--output" => {
                i += 1;
                output_path = Some(parse_value(&args, i, "--output"));
            }
            "--quiet" => {
                config.quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    info!(
        target: "flotsam::exercise",
        sessions = config.sessions,
        edits = config.edits,
        max_wrecks = config.max_wrecks,
        max_units = config.max_units,
        threads = config.threads,
        seed = config.seed,
        "exercise.start"
    );

    let start = Instant::now();
    let records = exercise::run_exercise(&config);
    let summary = exercise::summarize(&records);

    info!(
        target: "flotsam::exercise",
        sessions = summary.sessions,
        confirmed = summary.confirmed,
        applied = summary.applied,
        rejected = summary.rejected,
        violations = summary.violations,
        elapsed_s = start.elapsed().as_secs_f64(),
        "exercise.done"
    );

    let written = match &output_path {
        Some(path) => File::create(path)
            .and_then(|file| exercise::write_jsonl(&records, &mut BufWriter::new(file))),
        None => {
            let stdout = io::stdout();
            exercise::write_jsonl(&records, &mut BufWriter::new(stdout.lock()))
        }
    };
    if let Err(e) = written {
        error!(target: "flotsam::exercise", error = %e, "failed to write output");
        process::exit(1);
    }
    if let Some(path) = output_path {
        info!(target: "flotsam::exercise", records = records.len(), path = %path, "exercise.written");
    }

    if summary.violations > 0 {
        process::exit(2);
    }
}

fn print_usage() {
    eprintln!("Usage: exercise [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --sessions N     Number of sessions to run (default: 100)");
    eprintln!("  --edits N        Random edits per session (default: 200)");
    eprintln!("  --max-wrecks N   Upper bound on wrecks per session (default: 12)");
    eprintln!("  --max-units N    Upper bound on units per session (default: 8)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress progress output");
    eprintln!("  --help           Show this help");
}
