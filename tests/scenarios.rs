//! Worked salvage scenarios.
//!
//! Each case drives a full `SalvageSession` through the public API and checks
//! the resulting validity, options, and ledger.

use flotsam::capacity::TransportMode;
use flotsam::ledger::Blocker;
use flotsam::model::{ClaimState, ContractTerms, RecoveryUnit, TechBudget, UnitId, Wreck, WreckId};
use flotsam::session::{SalvageSession, SessionError, SessionInput, Slot};
use flotsam::validate::{InvalidReason, Validity};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn wid(s: &str) -> WreckId {
    WreckId::new(s)
}

fn uid(s: &str) -> UnitId {
    UnitId::new(s)
}

fn open(wrecks: Vec<Wreck>, units: Vec<RecoveryUnit>, minutes: u64) -> SalvageSession {
    SalvageSession::open(SessionInput {
        wrecks,
        units,
        budget: TechBudget::new(minutes),
        ..SessionInput::default()
    })
    .unwrap()
}

fn option_ids(session: &SalvageSession, wreck: &str, slot: Slot) -> Vec<UnitId> {
    session
        .available_options_for(&wid(wreck), slot)
        .unwrap()
        .into_iter()
        .map(|u| u.id.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn light_hauler_carries_wreck_as_cargo() {
    let mut session = open(
        vec![Wreck::new("w1", 50.0, 600, 60)],
        vec![RecoveryUnit::new("u1", 20.0, 80.0, 10.0)],
        480,
    );
    session.assign(&wid("w1"), Slot::Left, Some(&uid("u1"))).unwrap();

    assert_eq!(session.validity(&wid("w1")).unwrap(), Validity::Valid(TransportMode::Cargo));
    session.toggle_claim(&wid("w1"), ClaimState::Keep).unwrap();
    assert_eq!(session.ledger().unit_money, 600);
    assert!(session.confirmable());
}

#[test]
fn heavy_unit_tows_and_falls_short() {
    let mut session = open(
        vec![Wreck::new("w1", 50.0, 600, 60)],
        vec![RecoveryUnit::new("u1", 60.0, 40.0, 30.0)],
        480,
    );
    session.assign(&wid("w1"), Slot::Left, Some(&uid("u1"))).unwrap();

    assert_eq!(
        session.validity(&wid("w1")).unwrap(),
        Validity::Invalid(InvalidReason::InsufficientTowCapacity)
    );
    assert_eq!(
        session.ledger().blockers,
        vec![Blocker::InvalidAssignment {
            wreck: wid("w1"),
            reason: InvalidReason::InsufficientTowCapacity,
        }]
    );
    assert!(matches!(
        session.toggle_claim(&wid("w1"), ClaimState::Keep),
        Err(SessionError::ClaimNotPermitted { .. })
    ));
}

#[test]
fn large_vessel_in_space_needs_naval_tug() {
    let mut session = SalvageSession::open(SessionInput {
        wrecks: vec![Wreck::new("cruiser", 40.0, 5000, 120).large_vessel()],
        units: vec![
            RecoveryUnit::new("lifter", 10.0, 500.0, 500.0),
            RecoveryUnit::new("tug", 80.0, 0.0, 900.0).with_naval_tug(),
        ],
        budget: TechBudget::new(480),
        in_space_operation: true,
        ..SessionInput::default()
    })
    .unwrap();

    session.assign(&wid("cruiser"), Slot::Left, Some(&uid("lifter"))).unwrap();
    assert_eq!(
        session.validity(&wid("cruiser")).unwrap(),
        Validity::Invalid(InvalidReason::NoNavalTug)
    );

    session.assign(&wid("cruiser"), Slot::Left, Some(&uid("tug"))).unwrap();
    assert_eq!(session.validity(&wid("cruiser")).unwrap(), Validity::Valid(TransportMode::Tow));
}

#[test]
fn claiming_past_the_salvage_cap_blocks_confirmation() {
    let mut session = SalvageSession::open(SessionInput {
        wrecks: vec![Wreck::new("a", 10.0, 600, 30), Wreck::new("b", 10.0, 400, 30)],
        units: vec![RecoveryUnit::new("u1", 5.0, 50.0, 0.0)],
        budget: TechBudget::new(480),
        contract: Some(ContractTerms::new(50)),
        ..SessionInput::default()
    })
    .unwrap();

    session.assign(&wid("a"), Slot::Left, Some(&uid("u1"))).unwrap();
    session.toggle_claim(&wid("a"), ClaimState::Keep).unwrap();

    let ledger = session.ledger();
    assert_eq!(ledger.unit_money, 600);
    assert_eq!(ledger.employer_money, 400);
    assert_eq!(ledger.blockers, vec![Blocker::SalvageCapExceeded { percent: 60.0, cap: 50 }]);
    assert!(matches!(session.confirm(), Err(SessionError::NotConfirmable(_))));

    // Selling instead changes nothing for the cap.
    session.toggle_claim(&wid("a"), ClaimState::Sell).unwrap();
    assert!(!session.confirmable());

    session.toggle_claim(&wid("a"), ClaimState::Sell).unwrap();
    assert!(session.confirmable());
}

#[test]
fn two_valid_recoveries_exceed_the_time_budget() {
    let mut session = open(
        vec![Wreck::new("a", 20.0, 100, 60), Wreck::new("b", 20.0, 100, 50)],
        vec![
            RecoveryUnit::new("u1", 10.0, 50.0, 0.0),
            RecoveryUnit::new("u2", 10.0, 50.0, 0.0),
        ],
        100,
    );
    session.assign(&wid("a"), Slot::Left, Some(&uid("u1"))).unwrap();
    assert!(session.confirmable());
    session.assign(&wid("b"), Slot::Left, Some(&uid("u2"))).unwrap();

    assert_eq!(session.validity(&wid("a")).unwrap(), Validity::Valid(TransportMode::Cargo));
    assert_eq!(session.validity(&wid("b")).unwrap(), Validity::Valid(TransportMode::Cargo));
    assert_eq!(session.ledger().used_minutes, 110);
    assert_eq!(
        session.ledger().blockers,
        vec![Blocker::TimeBudgetExceeded { used: 110, available: 100 }]
    );
}

#[test]
fn booked_unit_disappears_from_other_options() {
    let mut session = open(
        vec![Wreck::new("a", 20.0, 100, 10), Wreck::new("b", 20.0, 100, 10)],
        vec![
            RecoveryUnit::new("u1", 10.0, 50.0, 0.0),
            RecoveryUnit::new("u2", 10.0, 50.0, 0.0),
        ],
        100,
    );
    session.assign(&wid("a"), Slot::Left, Some(&uid("u1"))).unwrap();

    assert_eq!(option_ids(&session, "a", Slot::Left), vec![uid("u1"), uid("u2")]);
    assert_eq!(option_ids(&session, "a", Slot::Right), vec![uid("u2")]);
    assert_eq!(option_ids(&session, "b", Slot::Left), vec![uid("u2")]);
    assert_eq!(option_ids(&session, "b", Slot::Right), vec![uid("u2")]);

    // Releasing the unit makes it selectable everywhere again.
    session.assign(&wid("a"), Slot::Left, None).unwrap();
    assert_eq!(option_ids(&session, "b", Slot::Left), vec![uid("u1"), uid("u2")]);
}

#[test]
fn full_session_partitions_every_wreck_once() {
    let mut session = open(
        vec![
            Wreck::new("a", 20.0, 300, 30),
            Wreck::new("b", 20.0, 200, 30),
            Wreck::new("c", 20.0, 100, 30),
        ],
        vec![
            RecoveryUnit::new("u1", 10.0, 50.0, 0.0),
            RecoveryUnit::new("u2", 10.0, 50.0, 0.0),
        ],
        100,
    );
    session.assign(&wid("a"), Slot::Left, Some(&uid("u1"))).unwrap();
    session.assign(&wid("b"), Slot::Right, Some(&uid("u2"))).unwrap();
    session.toggle_claim(&wid("a"), ClaimState::Keep).unwrap();
    session.toggle_claim(&wid("b"), ClaimState::Sell).unwrap();

    let partition = session.confirm().unwrap();
    assert_eq!(partition.kept, vec![wid("a")]);
    assert_eq!(partition.sold, vec![wid("b")]);
    assert_eq!(partition.employer_ceded, vec![wid("c")]);
    assert_eq!(partition.ledger.unit_money, 500);
    assert_eq!(partition.ledger.employer_money, 100);
    assert_eq!(partition.ledger.used_minutes, 60);
}
