use std::time::Duration;

use apex_core::TrialOutcome;
use apex_experiment::{variate, ControllerState, TapCounterController, TrialParams};
use apex_timing::Clock;
use rand::Rng;

/// Poll granularity for the trial loop.
const TICK_MS: u64 = 10;

/// Scripted tapper standing in for a human participant.
///
/// Calibration trials are tapped flat out; banded trials tap only while the
/// visible level sits below the band center, the way a participant regulates
/// effort. Delayed increases are invisible to it, so async blocks overshoot.
pub struct SimulatedParticipant<C: Clock, R: Rng> {
    clock: C,
    rng: R,
    taps_per_second: f64,
    release_probability: f64,
}

impl<C: Clock, R: Rng> SimulatedParticipant<C, R> {
    pub fn new(clock: C, rng: R, taps_per_second: f64, release_probability: f64) -> Self {
        Self {
            clock,
            rng,
            taps_per_second,
            release_probability,
        }
    }

    /// Runs one trial to completion against a fresh controller. Early
    /// releases can only happen in phases that hold keys down.
    pub fn run_trial(
        &mut self,
        params: &TrialParams,
        holds_keys: bool,
    ) -> apex_experiment::Result<TrialOutcome> {
        let mut controller = TapCounterController::new(params.clone());
        let start = self.clock.now_ms();
        controller.start(start);

        let release_at = if holds_keys && self.rng.random::<f64>() < self.release_probability {
            Some(start + self.rng.random_range(500..=params.duration_ms.max(501)))
        } else {
            None
        };
        let mut next_tap = start + self.tap_gap()?;

        loop {
            let now = self.clock.now_ms();
            if controller.state() == ControllerState::Running {
                if let Some(at) = release_at {
                    if now >= at {
                        controller.on_keys_released(now);
                    }
                }
            }
            if controller.state() == ControllerState::Running
                && now >= next_tap
                && self.wants_to_tap(&controller, params)
            {
                controller.on_tap(now, &mut self.rng)?;
                next_tap = now + self.tap_gap()?;
            }
            if let Some(outcome) = controller.tick(now) {
                return Ok(outcome);
            }
            self.clock.sleep(Duration::from_millis(TICK_MS));
        }
    }

    fn wants_to_tap(&self, controller: &TapCounterController, params: &TrialParams) -> bool {
        if params.kind.is_calibration() {
            return true;
        }
        controller.level() < params.bounds.center()
    }

    /// Gap to the next tap, jittered around the configured rate.
    fn tap_gap(&mut self) -> apex_experiment::Result<u64> {
        let gap_ms = 1000.0 / self.taps_per_second;
        let jittered = variate::sample(&mut self.rng, gap_ms * 0.5, gap_ms * 1.5, 1.0)?;
        Ok((jittered.round() as u64).max(1))
    }
}
