use std::collections::BTreeMap;

use apex_core::{BandTier, TrialOutcome};
use tracing::warn;

/// Terminal verdict of the validation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationVerdict {
    Passed,
    /// Abort the experiment, persisting everything collected so far.
    Failed,
}

/// Tracks per-level failures across acceptance-band trials.
pub struct ValidationGate {
    repetitions: u32,
    extra_failure_threshold: u32,
    failures: BTreeMap<BandTier, u32>,
    extra_failures: u32,
    extra_required: bool,
    triggered_by: Option<BandTier>,
}

impl ValidationGate {
    pub fn new(repetitions: u32, extra_failure_threshold: u32) -> Self {
        Self {
            repetitions,
            extra_failure_threshold,
            failures: BTreeMap::new(),
            extra_failures: 0,
            extra_required: false,
            triggered_by: None,
        }
    }

    /// Failures at a level that flip on extra validation.
    fn trigger_threshold(&self) -> u32 {
        (0.75 * f64::from(self.repetitions)).ceil() as u32
    }

    pub fn record(&mut self, level: BandTier, outcome: &TrialOutcome) {
        if outcome.success {
            return;
        }
        let count = self.failures.entry(level).or_insert(0);
        *count += 1;
        let count = *count;
        if count >= self.trigger_threshold() && !self.extra_required {
            self.extra_required = true;
            self.triggered_by = Some(level);
            warn!(
                level = level.name(),
                failures = count,
                "extra validation required"
            );
        }
    }

    pub fn record_extra(&mut self, outcome: &TrialOutcome) {
        if !outcome.success {
            self.extra_failures += 1;
        }
    }

    pub fn extra_validation_required(&self) -> bool {
        self.extra_required
    }

    /// Level whose failures crossed the threshold first.
    pub fn triggered_level(&self) -> Option<BandTier> {
        self.triggered_by
    }

    pub fn failures_at(&self, level: BandTier) -> u32 {
        self.failures.get(&level).copied().unwrap_or(0)
    }

    pub fn extra_failures(&self) -> u32 {
        self.extra_failures
    }

    /// Terminal verdict once every scheduled trial has run.
    pub fn verdict(&self) -> ValidationVerdict {
        if self.extra_required && self.extra_failures >= self.extra_failure_threshold {
            ValidationVerdict::Failed
        } else {
            ValidationVerdict::Passed
        }
    }

    pub fn validation_success(&self) -> bool {
        self.verdict() == ValidationVerdict::Passed
    }
}
