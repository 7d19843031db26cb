use apex_core::{Bounds, TrialKind, TrialOutcome};
use apex_timing::{Deadline, Ticker};
use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::variate;

/// Controller lifecycle; `Penalty` is the post-release error-message wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running,
    Penalty,
    Ended,
}

/// Fully resolved parameters for one controller run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialParams {
    pub kind: TrialKind,
    pub bounds: Bounds,
    pub original_bounds: Bounds,
    pub reward: f64,
    pub duration_ms: u64,
    pub auto_increase_amount: f64,
    pub auto_decrease_amount: f64,
    pub auto_decrease_rate_ms: u64,
    /// `(0, 0)` applies tap increases immediately.
    pub random_delay_ms: (u64, u64),
    pub penalty_delay_ms: u64,
}

/// Adaptive mercury state machine driving a single trial.
///
/// The host feeds it timestamped key events and calls `tick` to advance the
/// decay and deadline timers; the outcome is emitted exactly once.
pub struct TapCounterController {
    params: TrialParams,
    state: ControllerState,
    level: f64,
    tap_count: u32,
    start_ms: u64,
    keys_released_early: bool,
    key_tapped_early: bool,
    pending_increases: Vec<u64>,
    decay: Ticker,
    trial_deadline: Deadline,
    penalty_deadline: Deadline,
    // one-shot latch: no timer logic runs once set
    ended: bool,
}

impl TapCounterController {
    pub fn new(params: TrialParams) -> Self {
        let decay = Ticker::new(params.auto_decrease_rate_ms);
        Self {
            params,
            state: ControllerState::Idle,
            level: 0.0,
            tap_count: 0,
            start_ms: 0,
            keys_released_early: false,
            key_tapped_early: false,
            pending_increases: Vec::new(),
            decay,
            trial_deadline: Deadline::unarmed(),
            penalty_deadline: Deadline::unarmed(),
            ended: false,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn tap_count(&self) -> u32 {
        self.tap_count
    }

    /// True while the post-release error message should be shown.
    pub fn error_message_active(&self) -> bool {
        self.state == ControllerState::Penalty
    }

    /// Host calls this once all hold keys are down.
    pub fn start(&mut self, now_ms: u64) {
        if self.state != ControllerState::Idle {
            return;
        }
        self.state = ControllerState::Running;
        self.start_ms = now_ms;
        self.decay.start(now_ms);
        self.trial_deadline.arm(now_ms + self.params.duration_ms);
    }

    /// Qualifying tap. Taps before `start` only set the early-tap flag.
    pub fn on_tap<R: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut R) -> Result<()> {
        match self.state {
            ControllerState::Idle => {
                self.key_tapped_early = true;
                Ok(())
            }
            ControllerState::Running => {
                self.tap_count += 1;
                let (lo, hi) = self.params.random_delay_ms;
                if hi == 0 {
                    self.raise();
                } else {
                    let delay = variate::sample(rng, lo as f64, hi as f64, 1.0)?;
                    self.pending_increases.push(now_ms + delay.round() as u64);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Hold keys released. Before the deadline this fails the trial; the
    /// outcome is finalized only after the penalty delay runs out.
    pub fn on_keys_released(&mut self, now_ms: u64) {
        if self.state != ControllerState::Running {
            return;
        }
        self.keys_released_early = true;
        self.state = ControllerState::Penalty;
        self.decay.cancel();
        self.trial_deadline.cancel();
        self.pending_increases.clear();
        self.penalty_deadline
            .arm(now_ms + self.params.penalty_delay_ms);
    }

    /// Advances the timers. Emits the `TrialOutcome` exactly once.
    pub fn tick(&mut self, now_ms: u64) -> Option<TrialOutcome> {
        if self.ended {
            return None;
        }
        match self.state {
            ControllerState::Running => {
                // due delayed increases land before decay at the same instant
                let mut landed = 0;
                self.pending_increases.retain(|&at| {
                    if at <= now_ms {
                        landed += 1;
                        false
                    } else {
                        true
                    }
                });
                for _ in 0..landed {
                    self.raise();
                }
                let ticks = self.decay.poll(now_ms);
                if ticks > 0 {
                    self.level =
                        (self.level - f64::from(ticks) * self.params.auto_decrease_amount).max(0.0);
                }
                if self.trial_deadline.fire(now_ms) {
                    return Some(self.finalize(now_ms));
                }
                None
            }
            ControllerState::Penalty => {
                if self.penalty_deadline.fire(now_ms) {
                    return Some(self.finalize(now_ms));
                }
                None
            }
            _ => None,
        }
    }

    /// Increase side is clamped at 100; decay clamps at 0 in `tick`.
    fn raise(&mut self) {
        self.level = (self.level + self.params.auto_increase_amount).min(100.0);
    }

    fn finalize(&mut self, now_ms: u64) -> TrialOutcome {
        self.state = ControllerState::Ended;
        self.ended = true;
        self.decay.cancel();
        self.trial_deadline.cancel();
        self.penalty_deadline.cancel();
        self.pending_increases.clear();
        debug!(
            kind = %self.params.kind.label(),
            taps = self.tap_count,
            level = self.level,
            "trial ended"
        );
        TrialOutcome::finalize(
            self.params.kind,
            self.tap_count,
            self.start_ms,
            now_ms,
            self.level,
            self.params.bounds,
            self.params.reward,
            self.keys_released_early,
            self.key_tapped_early,
        )
    }
}

/// Adaptive per-tap increase so a median-rate tapper lands near
/// `expected_max` after decay.
pub fn auto_increase_amount(
    expected_max: f64,
    duration_ms: u64,
    decrease_rate_ms: u64,
    decrease_amount: f64,
    median: f64,
) -> Result<f64> {
    if decrease_rate_ms == 0 {
        return Err(Error::Configuration(
            "auto_decrease_rate_ms must be nonzero".into(),
        ));
    }
    if median <= 0.0 {
        return Err(Error::Configuration(
            "median tap count is zero; cannot derive auto-increase".into(),
        ));
    }
    Ok((expected_max + (duration_ms as f64 / decrease_rate_ms as f64) * decrease_amount) / median)
}
