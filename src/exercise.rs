//! Randomized session exerciser.
//!
//! Opens many randomly generated salvage sessions, applies random assign and
//! claim edits to each, and checks the session invariants after every edit.
//! Sessions that end confirmable are confirmed and their partitions recorded
//! as JSONL.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::model::{ClaimState, ContractTerms, RecoveryUnit, TechBudget, UnitId, Wreck, WreckId};
use crate::session::{recompute_all, SalvagePartition, SalvageSession, SessionInput, Slot};
use crate::validate::validate_assignment;

/// Configuration for an exercise run.
#[derive(Debug, Clone)]
pub struct ExerciseConfig {
    /// Number of sessions to run.
    pub sessions: usize,
    /// Random edits applied to each session.
    pub edits: usize,
    /// Upper bound on wrecks per session.
    pub max_wrecks: usize,
    /// Upper bound on candidate units per session, before sanitization.
    pub max_units: usize,
    /// Number of parallel threads.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-session progress logging.
    pub quiet: bool,
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        ExerciseConfig {
            sessions: 100,
            edits: 200,
            max_wrecks: 12,
            max_units: 8,
            threads: 4,
            seed: 0,
            quiet: false,
        }
    }
}

/// Outcome of one exercised session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub session_id: usize,
    pub wrecks: usize,
    pub pool: usize,
    pub excluded: usize,
    /// Edits the session accepted.
    pub applied: usize,
    /// Edits the session refused with an error.
    pub rejected: usize,
    /// Invariant violations, tagged with the edit number they followed.
    pub violations: Vec<String>,
    /// Present when the session ended confirmable.
    pub partition: Option<SalvagePartition>,
}

fn make_rng(seed: u64, offset: usize) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed.wrapping_add(offset as u64))
    } else {
        SmallRng::from_entropy()
    }
}

/// Builds a random session input. Ids are unique, so the input always opens.
pub fn random_input(config: &ExerciseConfig, rng: &mut SmallRng) -> SessionInput {
    let wreck_count = rng.gen_range(1..=config.max_wrecks.max(1));
    let unit_count = rng.gen_range(1..=config.max_units.max(1));

    let wrecks = (0..wreck_count)
        .map(|i| {
            let mut wreck = Wreck::new(
                format!("w{}", i),
                rng.gen_range(5.0..150.0),
                rng.gen_range(0..2000),
                rng.gen_range(10..120),
            );
            if rng.gen_bool(0.05) {
                wreck.recovery_minutes = None;
            }
            if rng.gen_bool(0.1) {
                wreck = wreck.large_vessel();
            }
            wreck
        })
        .collect();

    let units = (0..unit_count)
        .map(|i| {
            let mut unit = RecoveryUnit::new(
                format!("u{}", i),
                rng.gen_range(10.0..90.0),
                rng.gen_range(0.0..120.0),
                rng.gen_range(0.0..160.0),
            );
            if rng.gen_bool(0.2) {
                unit = unit.with_committed_tow_load(rng.gen_range(0.0..60.0));
            }
            if rng.gen_bool(0.15) {
                unit = unit.with_naval_tug();
            }
            if rng.gen_bool(0.05) {
                unit = unit.trailer();
            }
            if rng.gen_bool(0.05) {
                unit = unit.not_operational();
            }
            unit
        })
        .collect();

    let contract = if rng.gen_bool(0.6) {
        let mut terms = ContractTerms::new(rng.gen_range(0..=100))
            .with_initial_money(rng.gen_range(0..3000), rng.gen_range(0..3000));
        if rng.gen_bool(0.3) {
            terms = terms.with_exchange_rights();
        }
        Some(terms)
    } else {
        None
    };

    let excluded_unit_ids: HashSet<UnitId> = if unit_count > 1 && rng.gen_bool(0.2) {
        std::iter::once(UnitId::new(format!("u{}", rng.gen_range(0..unit_count)))).collect()
    } else {
        HashSet::new()
    };

    SessionInput {
        wrecks,
        units,
        budget: TechBudget::new(rng.gen_range(0..(wreck_count as u64 * 80 + 1))),
        contract,
        in_space_operation: rng.gen_bool(0.2),
        excluded_unit_ids,
    }
}

/// Checks every session invariant, returning one message per violation.
pub fn check_invariants(session: &SalvageSession) -> Vec<String> {
    let state = session.state();
    let mut violations = Vec::new();

    let mut bookings: HashMap<&UnitId, usize> = HashMap::new();
    for assignment in &state.assignments {
        for unit in assignment.units() {
            *bookings.entry(unit).or_default() += 1;
            if state.pool_unit(unit).is_none() {
                violations.push(format!("unit {} booked outside the pool", unit));
            }
        }
    }
    for (unit, count) in bookings {
        if count > 1 {
            violations.push(format!("unit {} booked in {} slots", unit, count));
        }
    }

    let mut total_value = 0i64;
    for ((wreck, assignment), validity) in state
        .wrecks
        .iter()
        .zip(&state.assignments)
        .zip(&state.validity)
    {
        total_value += wreck.sell_value;

        if assignment.claim.is_claimed() && !validity.is_claimable() {
            violations.push(format!("wreck {} claimed while {}", wreck.id, validity.protocol_string()));
        }

        let left = assignment.left.as_ref().and_then(|id| state.pool_unit(id));
        let right = assignment.right.as_ref().and_then(|id| state.pool_unit(id));
        let expected = validate_assignment(wreck, left, right, state.in_space_operation);
        if expected != *validity {
            violations.push(format!(
                "wreck {} validity {} but validator says {}",
                wreck.id,
                validity.protocol_string(),
                expected.protocol_string()
            ));
        }
    }

    let initial = state
        .contract
        .as_ref()
        .map_or(0, |c| c.initial_employer_money + c.initial_unit_money);
    let ledger = &state.ledger;
    if ledger.unit_money + ledger.employer_money != total_value + initial {
        violations.push(format!(
            "money not conserved: unit {} + employer {} != {}",
            ledger.unit_money,
            ledger.employer_money,
            total_value + initial
        ));
    }

    if recompute_all(state.clone()) != *state {
        violations.push("recompute_all is not idempotent".to_string());
    }

    violations
}

/// Applies one random edit. Returns whether the session accepted it.
fn random_edit(session: &mut SalvageSession, rng: &mut SmallRng) -> bool {
    let wreck: WreckId = match session.wrecks().choose(rng) {
        Some(w) => w.id.clone(),
        None => return false,
    };
    let slot = if rng.gen_bool(0.5) { Slot::Left } else { Slot::Right };

    let roll = rng.gen_range(0..100);
    let result = if roll < 45 {
        let unit = session
            .available_options_for(&wreck, slot)
            .ok()
            .and_then(|units| units.choose(rng).map(|u| u.id.clone()));
        session.assign(&wreck, slot, unit.as_ref())
    } else if roll < 55 {
        // Any pool unit, booked or not.
        let unit = session.pool().choose(rng).map(|u| u.id.clone());
        session.assign(&wreck, slot, unit.as_ref())
    } else if roll < 65 {
        session.assign(&wreck, slot, None)
    } else {
        let claim = if rng.gen_bool(0.5) { ClaimState::Keep } else { ClaimState::Sell };
        session.toggle_claim(&wreck, claim)
    };
    result.is_ok()
}

/// Runs one session to completion.
pub fn run_session(config: &ExerciseConfig, session_id: usize, rng: &mut SmallRng) -> SessionRecord {
    let input = random_input(config, rng);
    let wreck_count = input.wrecks.len();

    let mut session = match SalvageSession::open(input) {
        Ok(s) => s,
        Err(e) => {
            return SessionRecord {
                session_id,
                wrecks: wreck_count,
                pool: 0,
                excluded: 0,
                applied: 0,
                rejected: 0,
                violations: vec![format!("open failed: {}", e)],
                partition: None,
            };
        }
    };

    let mut violations: Vec<String> = check_invariants(&session)
        .into_iter()
        .map(|v| format!("open: {}", v))
        .collect();
    let mut applied = 0;
    let mut rejected = 0;

    for edit in 0..config.edits {
        if random_edit(&mut session, rng) {
            applied += 1;
        } else {
            rejected += 1;
        }
        violations.extend(
            check_invariants(&session)
                .into_iter()
                .map(|v| format!("edit {}: {}", edit, v)),
        );
    }

    for v in &violations {
        warn!(target: "flotsam::exercise", session = session_id, violation = %v, "invariant violated");
    }

    SessionRecord {
        session_id,
        wrecks: session.wrecks().len(),
        pool: session.pool().len(),
        excluded: session.excluded().len(),
        applied,
        rejected,
        violations,
        partition: session.confirm().ok(),
    }
}

/// Runs the configured number of sessions.
///
/// When `config.threads > 1`, sessions run concurrently using rayon.
pub fn run_exercise(config: &ExerciseConfig) -> Vec<SessionRecord> {
    let mut records = Vec::with_capacity(config.sessions);
    run_exercise_with_callback(config, |record| records.push(record));
    records
}

/// Runs the exercise, calling `on_record` with each finished session in
/// session order.
pub fn run_exercise_with_callback<F>(config: &ExerciseConfig, on_record: F)
where
    F: FnMut(SessionRecord),
{
    if config.threads > 1 {
        match rayon::ThreadPoolBuilder::new().num_threads(config.threads).build() {
            Ok(pool) => return run_parallel(config, &pool, on_record),
            Err(e) => {
                warn!(target: "flotsam::exercise", error = %e, "thread pool unavailable, running sequentially");
            }
        }
    }
    run_sequential(config, on_record);
}

fn log_progress(config: &ExerciseConfig, done: usize, record: &SessionRecord, started: Instant) {
    if config.quiet {
        return;
    }
    info!(
        target: "flotsam::exercise",
        done,
        total = config.sessions,
        session = record.session_id,
        wrecks = record.wrecks,
        applied = record.applied,
        rejected = record.rejected,
        confirmed = record.partition.is_some(),
        violations = record.violations.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "exercise.session"
    );
}

fn run_sequential<F>(config: &ExerciseConfig, mut on_record: F)
where
    F: FnMut(SessionRecord),
{
    let mut rng = make_rng(config.seed, 0);
    for i in 0..config.sessions {
        let started = Instant::now();
        let record = run_session(config, i, &mut rng);
        log_progress(config, i + 1, &record, started);
        on_record(record);
    }
}

fn run_parallel<F>(config: &ExerciseConfig, pool: &rayon::ThreadPool, on_record: F)
where
    F: FnMut(SessionRecord),
{
    use rayon::prelude::*;

    let completed = AtomicUsize::new(0);
    let records: Vec<SessionRecord> = pool.install(|| {
        (0..config.sessions)
            .into_par_iter()
            .map(|i| {
                let mut rng = make_rng(config.seed, i);
                let started = Instant::now();
                let record = run_session(config, i, &mut rng);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                log_progress(config, done, &record, started);
                record
            })
            .collect()
    });

    records.into_iter().for_each(on_record);
}

/// Writes session records as JSONL (one JSON object per line).
pub fn write_jsonl<W: Write>(records: &[SessionRecord], out: &mut W) -> std::io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Aggregate counts over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseSummary {
    pub sessions: usize,
    pub confirmed: usize,
    pub applied: usize,
    pub rejected: usize,
    pub violations: usize,
}

pub fn summarize(records: &[SessionRecord]) -> ExerciseSummary {
    records.iter().fold(ExerciseSummary::default(), |mut s, r| {
        s.sessions += 1;
        s.confirmed += usize::from(r.partition.is_some());
        s.applied += r.applied;
        s.rejected += r.rejected;
        s.violations += r.violations.len();
        s
    })
}
