use apex_core::{BandTier, TrialKind, TrialOutcome};
use apex_experiment::{ValidationGate, ValidationVerdict};

fn outcome(level: BandTier, in_band: bool) -> TrialOutcome {
    let bounds = level.bounds();
    let reached = if in_band {
        bounds.center()
    } else {
        bounds.lower - 10.0
    };
    TrialOutcome::finalize(
        TrialKind::Validation(level),
        15,
        0,
        5000,
        reached,
        bounds,
        0.0,
        false,
        false,
    )
}

#[test]
fn extra_validation_triggers_at_three_quarters_of_repetitions() {
    // ceil(0.75 * 4) = 3
    let mut gate = ValidationGate::new(4, 3);
    gate.record(BandTier::Medium, &outcome(BandTier::Medium, false));
    gate.record(BandTier::Medium, &outcome(BandTier::Medium, false));
    assert!(!gate.extra_validation_required());
    gate.record(BandTier::Medium, &outcome(BandTier::Medium, false));
    assert!(gate.extra_validation_required());
    assert_eq!(gate.triggered_level(), Some(BandTier::Medium));
}

#[test]
fn single_repetition_triggers_on_first_failure() {
    // ceil(0.75 * 1) = 1
    let mut gate = ValidationGate::new(1, 3);
    gate.record(BandTier::Hard, &outcome(BandTier::Hard, false));
    assert!(gate.extra_validation_required());
}

#[test]
fn successes_never_count_as_failures() {
    let mut gate = ValidationGate::new(4, 3);
    for _ in 0..10 {
        gate.record(BandTier::Easy, &outcome(BandTier::Easy, true));
    }
    assert_eq!(gate.failures_at(BandTier::Easy), 0);
    assert!(!gate.extra_validation_required());
    assert_eq!(gate.verdict(), ValidationVerdict::Passed);
}

#[test]
fn failures_are_tallied_per_level() {
    let mut gate = ValidationGate::new(4, 3);
    gate.record(BandTier::Easy, &outcome(BandTier::Easy, false));
    gate.record(BandTier::Hard, &outcome(BandTier::Hard, false));
    gate.record(BandTier::Hard, &outcome(BandTier::Hard, false));
    assert_eq!(gate.failures_at(BandTier::Easy), 1);
    assert_eq!(gate.failures_at(BandTier::Medium), 0);
    assert_eq!(gate.failures_at(BandTier::Hard), 2);
    // no level crossed ceil(0.75 * 4)
    assert!(!gate.extra_validation_required());
}

#[test]
fn enough_extra_failures_end_the_experiment() {
    let mut gate = ValidationGate::new(4, 3);
    for _ in 0..3 {
        gate.record(BandTier::Easy, &outcome(BandTier::Easy, false));
    }
    assert!(gate.extra_validation_required());

    gate.record_extra(&outcome(BandTier::Easy, false));
    gate.record_extra(&outcome(BandTier::Easy, false));
    assert_eq!(gate.verdict(), ValidationVerdict::Passed);
    gate.record_extra(&outcome(BandTier::Easy, false));
    assert_eq!(gate.verdict(), ValidationVerdict::Failed);
    assert!(!gate.validation_success());
}

#[test]
fn successful_extra_round_passes() {
    let mut gate = ValidationGate::new(4, 3);
    for _ in 0..3 {
        gate.record(BandTier::Easy, &outcome(BandTier::Easy, false));
    }
    for _ in 0..3 {
        gate.record_extra(&outcome(BandTier::Easy, true));
    }
    assert_eq!(gate.verdict(), ValidationVerdict::Passed);
    assert!(gate.validation_success());
}
