use apex_core::{OutcomeLog, TrialOutcome};
use tracing::{debug, info};

/// Calibration slice of experiment state; the gate is its only writer.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationState {
    pub median_tap_count: f64,
    pub required_successes: u32,
    pub current_successes: u32,
    /// True until the rolling median clears the minimum.
    pub failed: bool,
}

/// What happens after a calibration pass collects its required successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationVerdict {
    Passed,
    /// Counters were reset; one more pass runs.
    Remediate,
    Abort,
}

/// Repeat-until-criterion wrapper around calibration trials.
pub struct CalibrationGate {
    state: CalibrationState,
    minimum_median: f64,
    window: usize,
    remediation_used: bool,
}

impl CalibrationGate {
    pub fn new(required_successes: u32, minimum_median: f64, window: usize) -> Self {
        Self {
            state: CalibrationState {
                median_tap_count: 0.0,
                required_successes,
                current_successes: 0,
                failed: true,
            },
            minimum_median,
            window,
            remediation_used: false,
        }
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    pub fn median(&self) -> f64 {
        self.state.median_tap_count
    }

    /// Clean trials advance the counter and refresh the rolling median over
    /// the last `window` clean calibration outcomes.
    pub fn record(&mut self, outcome: &TrialOutcome, log: &OutcomeLog) {
        if !outcome.is_clean() {
            return;
        }
        self.state.current_successes += 1;
        let recent = log.last_matching(self.window, |o| o.kind.is_calibration() && o.is_clean());
        let taps: Vec<f64> = recent.iter().map(|o| f64::from(o.tap_count)).collect();
        if let Some(m) = median(&taps) {
            self.state.median_tap_count = m;
        }
        self.state.failed = self.state.median_tap_count < self.minimum_median;
        debug!(
            successes = self.state.current_successes,
            median = self.state.median_tap_count,
            "calibration updated"
        );
    }

    pub fn remaining(&self) -> u32 {
        self.state
            .required_successes
            .saturating_sub(self.state.current_successes)
    }

    /// Loop-continuation predicate for the repeat-until-criterion block.
    pub fn should_continue(&self) -> bool {
        self.remaining() > 0
    }

    /// Decides the next step once a pass has its successes. Called at most
    /// twice: a below-minimum median buys one remediation pass, a second
    /// failure ends the experiment.
    pub fn verdict(&mut self) -> CalibrationVerdict {
        if !self.state.failed {
            return CalibrationVerdict::Passed;
        }
        if self.remediation_used {
            return CalibrationVerdict::Abort;
        }
        self.remediation_used = true;
        self.state.current_successes = 0;
        info!(
            median = self.state.median_tap_count,
            minimum = self.minimum_median,
            "calibration median below minimum, running remediation block"
        );
        CalibrationVerdict::Remediate
    }

    /// Practice repeat predicate: repeat on any early flag or a tap count
    /// below the minimum median.
    pub fn practice_should_repeat(&self, outcome: &TrialOutcome) -> bool {
        outcome.keys_released_early
            || outcome.key_tapped_early
            || f64::from(outcome.tap_count) < self.minimum_median
    }
}

/// Median of an unordered slice; mean of the middle pair on even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
