use apex_core::{
    BandTier, BlockOrder, BlockType, Bounds, OutcomeLog, Phase, StandardPhase, TrialKind,
    TrialOutcome, TrialParameterSet,
};
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::calibration::{CalibrationGate, CalibrationVerdict};
use crate::config::ExperimentConfig;
use crate::controller::{self, TrialParams};
use crate::error::{Error, Result};
use crate::factory;
use crate::order;
use crate::validation::{ValidationGate, ValidationVerdict};

/// Why a session ended before the debrief phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AbortReason {
    CalibrationFailed,
    ValidationFailed,
}

/// Outcome of recording a trial: whether the host should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDecision {
    Continue,
    PhaseComplete,
    Aborted(AbortReason),
    Finished,
}

/// Aggregate handed to the export layer at session end.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub participant_id: String,
    pub total_trials: usize,
    pub total_reward: f64,
    pub median_tap_count: f64,
    pub validation_success: bool,
    pub aborted: Option<AbortReason>,
}

/// Which scheduled trial the next recorded outcome answers.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Practice,
    Calibration,
    Validation(BandTier),
    ExtraValidation,
    Demo,
    Block,
}

/// Drives the whole experiment: phase advancement, gate bookkeeping, trial
/// planning. The host runs each emitted `TrialParams` through a
/// `TapCounterController` and feeds the outcome back.
pub struct Session<R: Rng> {
    config: ExperimentConfig,
    participant_id: String,
    rng: R,
    phase: StandardPhase,
    order: BlockOrder,
    calibration: CalibrationGate,
    validation: ValidationGate,
    validation_queue: Vec<BandTier>,
    extra_remaining: u32,
    block_index: usize,
    block_trials: Vec<TrialParameterSet>,
    demo_pending: bool,
    pending: Option<Pending>,
    outcomes: OutcomeLog,
    aborted: Option<AbortReason>,
    finished: bool,
}

impl<R: Rng> Session<R> {
    pub fn new(config: ExperimentConfig, participant_id: &str, mut rng: R) -> Result<Self> {
        config.validate()?;
        let order = order::resolve_order(participant_id, &mut rng);
        let calibration = CalibrationGate::new(
            config.required_calibration_successes,
            config.minimum_calibration_median,
            config.median_window,
        );
        let validation = ValidationGate::new(
            config.num_validation_trials,
            config.extra_validation_failure_threshold,
        );
        info!(participant_id, blocks = ?order.blocks(), "session created");
        Ok(Self {
            config,
            participant_id: participant_id.to_string(),
            rng,
            phase: StandardPhase::default(),
            order,
            calibration,
            validation,
            validation_queue: Vec::new(),
            extra_remaining: 0,
            block_index: 0,
            block_trials: Vec::new(),
            demo_pending: false,
            pending: None,
            outcomes: OutcomeLog::new(),
            aborted: None,
            finished: false,
        })
    }

    /// Next trial descriptor, or `None` once the session is over.
    pub fn next_trial(&mut self) -> Result<Option<TrialParams>> {
        if self.finished || self.aborted.is_some() {
            return Ok(None);
        }
        if self.pending.is_some() {
            return Err(Error::Configuration(
                "next_trial called with a trial outcome still unrecorded".into(),
            ));
        }
        if self.phase.is_welcome() {
            self.advance_phase()?;
        }
        match self.phase {
            StandardPhase::Practice => {
                self.pending = Some(Pending::Practice);
                Ok(Some(self.calibration_params()))
            }
            StandardPhase::Calibration => {
                self.pending = Some(Pending::Calibration);
                Ok(Some(self.calibration_params()))
            }
            StandardPhase::Validation => {
                if let Some(level) = self.validation_queue.pop() {
                    self.pending = Some(Pending::Validation(level));
                    Ok(Some(self.validation_params(level)?))
                } else if self.extra_remaining > 0 {
                    self.extra_remaining -= 1;
                    // extra trials rerun the level that tripped the threshold
                    let level = self.validation.triggered_level().unwrap_or(BandTier::Easy);
                    self.pending = Some(Pending::ExtraValidation);
                    Ok(Some(self.validation_params(level)?))
                } else {
                    self.advance_phase()?;
                    self.next_trial()
                }
            }
            StandardPhase::Block => {
                if self.demo_pending {
                    self.pending = Some(Pending::Demo);
                    return Ok(Some(self.demo_params()?));
                }
                match self.block_trials.pop() {
                    Some(set) => {
                        let block = self.current_block()?;
                        self.pending = Some(Pending::Block);
                        Ok(Some(self.block_params(block, set)?))
                    }
                    None => {
                        self.enter_block(self.block_index + 1)?;
                        self.next_trial()
                    }
                }
            }
            StandardPhase::Welcome | StandardPhase::Debrief => Ok(None),
        }
    }

    /// Appends the outcome, updates the owning gate, and decides what
    /// happens next.
    pub fn record_outcome(&mut self, outcome: TrialOutcome) -> Result<SessionDecision> {
        let Some(pending) = self.pending.take() else {
            return Err(Error::Configuration(
                "outcome recorded with no trial pending".into(),
            ));
        };
        self.outcomes.append(outcome.clone());
        match pending {
            Pending::Practice => {
                if self.calibration.practice_should_repeat(&outcome) {
                    Ok(SessionDecision::Continue)
                } else {
                    self.advance_phase()?;
                    Ok(SessionDecision::PhaseComplete)
                }
            }
            Pending::Calibration => {
                self.calibration.record(&outcome, &self.outcomes);
                if self.calibration.should_continue() {
                    return Ok(SessionDecision::Continue);
                }
                match self.calibration.verdict() {
                    CalibrationVerdict::Passed => {
                        self.advance_phase()?;
                        Ok(SessionDecision::PhaseComplete)
                    }
                    CalibrationVerdict::Remediate => Ok(SessionDecision::Continue),
                    CalibrationVerdict::Abort => self.abort(AbortReason::CalibrationFailed),
                }
            }
            Pending::Validation(level) => {
                self.validation.record(level, &outcome);
                if !self.validation_queue.is_empty() {
                    return Ok(SessionDecision::Continue);
                }
                if self.validation.extra_validation_required() {
                    self.extra_remaining = self.config.num_extra_validation_trials;
                    if self.extra_remaining > 0 {
                        warn!(
                            trials = self.extra_remaining,
                            "scheduling extra validation trials"
                        );
                        return Ok(SessionDecision::Continue);
                    }
                }
                self.finish_validation()
            }
            Pending::ExtraValidation => {
                self.validation.record_extra(&outcome);
                if self.extra_remaining > 0 {
                    Ok(SessionDecision::Continue)
                } else {
                    self.finish_validation()
                }
            }
            Pending::Demo => {
                self.demo_pending = false;
                Ok(SessionDecision::Continue)
            }
            Pending::Block => {
                if self.block_trials.is_empty() {
                    self.enter_block(self.block_index + 1)?;
                    if self.finished {
                        Ok(SessionDecision::Finished)
                    } else {
                        Ok(SessionDecision::PhaseComplete)
                    }
                } else {
                    Ok(SessionDecision::Continue)
                }
            }
        }
    }

    pub fn phase(&self) -> StandardPhase {
        self.phase
    }

    pub fn block_order(&self) -> &BlockOrder {
        &self.order
    }

    pub fn outcomes(&self) -> &OutcomeLog {
        &self.outcomes
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn aborted(&self) -> Option<AbortReason> {
        self.aborted
    }

    pub fn median_tap_count(&self) -> f64 {
        self.calibration.median()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            participant_id: self.participant_id.clone(),
            total_trials: self.outcomes.len(),
            total_reward: self.outcomes.total_reward(),
            median_tap_count: self.calibration.median(),
            validation_success: self.validation.validation_success(),
            aborted: self.aborted,
        }
    }

    fn finish_validation(&mut self) -> Result<SessionDecision> {
        match self.validation.verdict() {
            ValidationVerdict::Passed => {
                self.advance_phase()?;
                Ok(SessionDecision::PhaseComplete)
            }
            ValidationVerdict::Failed => self.abort(AbortReason::ValidationFailed),
        }
    }

    fn abort(&mut self, reason: AbortReason) -> Result<SessionDecision> {
        warn!(?reason, "experiment ended early");
        self.aborted = Some(reason);
        Ok(SessionDecision::Aborted(reason))
    }

    fn advance_phase(&mut self) -> Result<()> {
        let Some(next) = self.phase.next() else {
            return Ok(());
        };
        self.phase = next;
        info!(phase = ?self.phase, "phase advanced");
        match self.phase {
            StandardPhase::Validation => {
                let mut queue = Vec::new();
                for tier in BandTier::ALL {
                    for _ in 0..self.config.num_validation_trials {
                        queue.push(tier);
                    }
                }
                // popped from the back: easy runs first
                queue.reverse();
                self.validation_queue = queue;
                self.extra_remaining = 0;
            }
            StandardPhase::Block => self.enter_block(0)?,
            StandardPhase::Debrief => {
                self.finished = true;
                info!(
                    trials = self.outcomes.len(),
                    reward = self.outcomes.total_reward(),
                    "session finished"
                );
            }
            _ => {}
        }
        Ok(())
    }

    fn enter_block(&mut self, index: usize) -> Result<()> {
        self.block_index = index;
        let Some(&block) = self.order.blocks().get(index) else {
            return self.advance_phase();
        };
        let mut trials = factory::build_trials(
            &mut self.rng,
            &self.config.reward_tiers,
            self.config.block_trial_count,
            self.config.delay_for(block),
            self.config.jitter_width(),
        )?;
        // consumed via pop()
        trials.reverse();
        self.block_trials = trials;
        self.demo_pending = true;
        info!(
            block = block.name(),
            trials = self.block_trials.len(),
            "block started"
        );
        Ok(())
    }

    fn current_block(&self) -> Result<BlockType> {
        self.order
            .blocks()
            .get(self.block_index)
            .copied()
            .ok_or_else(|| Error::Configuration("no active block".into()))
    }

    /// Per-tap increase derived from the calibration median.
    fn adaptive_increase(&self) -> Result<f64> {
        controller::auto_increase_amount(
            self.config.expected_max_level,
            self.config.trial_duration_ms,
            self.config.auto_decrease_rate_ms,
            self.config.auto_decrease_amount,
            self.calibration.median(),
        )
    }

    fn calibration_params(&self) -> TrialParams {
        let bounds = BandTier::Easy.bounds();
        self.base_params(
            TrialKind::Calibration,
            bounds,
            bounds,
            0.0,
            (0, 0),
            self.config.default_auto_increase,
        )
    }

    fn validation_params(&self, level: BandTier) -> Result<TrialParams> {
        let bounds = level.bounds();
        Ok(self.base_params(
            TrialKind::Validation(level),
            bounds,
            bounds,
            0.0,
            (0, 0),
            self.adaptive_increase()?,
        ))
    }

    fn demo_params(&mut self) -> Result<TrialParams> {
        let block = self.current_block()?;
        let bounds = BandTier::Easy.bounds();
        Ok(self.base_params(
            TrialKind::Demo,
            bounds,
            bounds,
            0.0,
            self.config.delay_for(block),
            self.adaptive_increase()?,
        ))
    }

    fn block_params(&self, block: BlockType, set: TrialParameterSet) -> Result<TrialParams> {
        Ok(TrialParams {
            kind: TrialKind::Block(block),
            bounds: set.bounds,
            original_bounds: set.original_bounds,
            reward: set.reward,
            duration_ms: self.config.trial_duration_ms,
            auto_increase_amount: self.adaptive_increase()?,
            auto_decrease_amount: self.config.auto_decrease_amount,
            auto_decrease_rate_ms: self.config.auto_decrease_rate_ms,
            random_delay_ms: set.random_delay_ms,
            penalty_delay_ms: self.config.penalty_delay_ms,
        })
    }

    fn base_params(
        &self,
        kind: TrialKind,
        bounds: Bounds,
        original_bounds: Bounds,
        reward: f64,
        random_delay_ms: (u64, u64),
        auto_increase_amount: f64,
    ) -> TrialParams {
        TrialParams {
            kind,
            bounds,
            original_bounds,
            reward,
            duration_ms: self.config.trial_duration_ms,
            auto_increase_amount,
            auto_decrease_amount: self.config.auto_decrease_amount,
            auto_decrease_rate_ms: self.config.auto_decrease_rate_ms,
            random_delay_ms,
            penalty_delay_ms: self.config.penalty_delay_ms,
        }
    }
}
