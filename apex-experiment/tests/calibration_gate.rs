use apex_core::{BandTier, OutcomeLog, TrialKind, TrialOutcome};
use apex_experiment::{median, CalibrationGate, CalibrationVerdict};

fn outcome(taps: u32, released: bool, tapped: bool) -> TrialOutcome {
    TrialOutcome::finalize(
        TrialKind::Calibration,
        taps,
        0,
        5000,
        40.0,
        BandTier::Easy.bounds(),
        0.0,
        released,
        tapped,
    )
}

fn record_clean(gate: &mut CalibrationGate, log: &mut OutcomeLog, taps: u32) {
    let o = outcome(taps, false, false);
    log.append(o.clone());
    gate.record(&o, log);
}

#[test]
fn continues_until_required_successes_reached() {
    for required in [1_u32, 2, 4] {
        let mut gate = CalibrationGate::new(required, 5.0, 4);
        let mut log = OutcomeLog::new();
        for done in 0..required {
            assert!(
                gate.should_continue(),
                "required={required} done={done}: expected continue"
            );
            record_clean(&mut gate, &mut log, 20);
        }
        assert!(!gate.should_continue(), "required={required}: expected stop");
        // one past the requirement stays stopped
        record_clean(&mut gate, &mut log, 20);
        assert!(!gate.should_continue());
    }
}

#[test]
fn dirty_trials_never_count() {
    let mut gate = CalibrationGate::new(2, 5.0, 4);
    let mut log = OutcomeLog::new();
    for (released, tapped) in [(true, false), (false, true), (true, true)] {
        let o = outcome(20, released, tapped);
        log.append(o.clone());
        gate.record(&o, &log);
    }
    assert_eq!(gate.state().current_successes, 0);
    assert!(gate.should_continue());
}

#[test]
fn practice_repeat_predicate_matrix() {
    let gate = CalibrationGate::new(1, 10.0, 4);
    for released in [false, true] {
        for tapped in [false, true] {
            for taps in [0_u32, 9, 10] {
                let expected = released || tapped || taps < 10;
                let o = outcome(taps, released, tapped);
                assert_eq!(
                    gate.practice_should_repeat(&o),
                    expected,
                    "released={released} tapped={tapped} taps={taps}"
                );
            }
        }
    }
}

#[test]
fn median_tracks_the_last_window_of_clean_trials() {
    let mut gate = CalibrationGate::new(8, 5.0, 4);
    let mut log = OutcomeLog::new();
    for taps in [10, 20, 30, 40, 50] {
        record_clean(&mut gate, &mut log, taps);
    }
    // window of 4: {20, 30, 40, 50}
    assert_eq!(gate.median(), 35.0);
}

#[test]
fn below_minimum_median_buys_one_remediation_then_aborts() {
    let mut gate = CalibrationGate::new(2, 100.0, 4);
    let mut log = OutcomeLog::new();
    record_clean(&mut gate, &mut log, 10);
    record_clean(&mut gate, &mut log, 10);
    assert!(!gate.should_continue());
    assert!(gate.state().failed);

    assert_eq!(gate.verdict(), CalibrationVerdict::Remediate);
    // counters were reset for the second pass
    assert!(gate.should_continue());
    record_clean(&mut gate, &mut log, 10);
    record_clean(&mut gate, &mut log, 10);
    assert_eq!(gate.verdict(), CalibrationVerdict::Abort);
}

#[test]
fn healthy_median_passes() {
    let mut gate = CalibrationGate::new(1, 5.0, 4);
    let mut log = OutcomeLog::new();
    record_clean(&mut gate, &mut log, 12);
    assert!(!gate.state().failed);
    assert_eq!(gate.verdict(), CalibrationVerdict::Passed);
}

#[test]
fn median_helper_handles_odd_and_even_lengths() {
    assert_eq!(median(&[]), None);
    assert_eq!(median(&[3.0]), Some(3.0));
    assert_eq!(median(&[3.0, 1.0]), Some(2.0));
    assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
    assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
}
