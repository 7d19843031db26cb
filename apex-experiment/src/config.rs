use std::fs;
use std::path::Path;

use apex_core::{BandTier, BlockType};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Experiment configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Clean successes needed to finish the calibration part.
    pub required_calibration_successes: u32,
    /// Median tap count the calibration part must reach.
    pub minimum_calibration_median: f64,
    /// Clean calibration outcomes the rolling median looks back over.
    pub median_window: usize,

    /// Acceptance-band repetitions per difficulty level.
    pub num_validation_trials: u32,
    pub num_extra_validation_trials: u32,
    /// Extra-validation failures at which the experiment ends early.
    pub extra_validation_failure_threshold: u32,

    pub trial_duration_ms: u64,
    pub auto_decrease_amount: f64,
    pub auto_decrease_rate_ms: u64,
    /// Level a median-rate tapper is expected to reach by trial end.
    pub expected_max_level: f64,
    /// Auto-increase used for calibration trials, before a median exists.
    pub default_auto_increase: f64,
    /// Error-message wait after an early key release.
    pub penalty_delay_ms: u64,

    /// Requested trials per block, before factory truncation.
    pub block_trial_count: usize,
    /// Three reward amounts per tier, three tiers.
    pub reward_tiers: [[f64; 3]; 3],
    pub narrow_delay_ms: (u64, u64),
    pub wide_delay_ms: (u64, u64),
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            required_calibration_successes: 4,
            minimum_calibration_median: 10.0,
            median_window: 4,
            num_validation_trials: 4,
            num_extra_validation_trials: 3,
            extra_validation_failure_threshold: 3,
            trial_duration_ms: 5000,
            auto_decrease_amount: 1.0,
            auto_decrease_rate_ms: 100,
            expected_max_level: 80.0,
            default_auto_increase: 10.0,
            penalty_delay_ms: 2000,
            block_trial_count: 27,
            reward_tiers: [[1.0, 1.5, 2.0], [4.0, 4.5, 5.0], [7.0, 7.5, 8.0]],
            narrow_delay_ms: (400, 600),
            wide_delay_ms: (0, 1000),
        }
    }
}

impl ExperimentConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Configuration(format!("read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| Error::Configuration(format!("parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.auto_decrease_rate_ms == 0 {
            return Err(Error::Configuration(
                "auto_decrease_rate_ms must be nonzero".into(),
            ));
        }
        if self.trial_duration_ms == 0 {
            return Err(Error::Configuration(
                "trial_duration_ms must be nonzero".into(),
            ));
        }
        if self.required_calibration_successes == 0 {
            return Err(Error::Configuration(
                "required_calibration_successes must be nonzero".into(),
            ));
        }
        if self.median_window == 0 {
            return Err(Error::Configuration("median_window must be nonzero".into()));
        }
        if self.default_auto_increase <= 0.0 {
            return Err(Error::Configuration(
                "default_auto_increase must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Tap-delay range for a block regime.
    pub fn delay_for(&self, block: BlockType) -> (u64, u64) {
        match block {
            BlockType::Sync => (0, 0),
            BlockType::NarrowAsync => self.narrow_delay_ms,
            BlockType::WideAsync => self.wide_delay_ms,
        }
    }

    /// Width every jittered band keeps: the easy-band width.
    pub fn jitter_width(&self) -> f64 {
        BandTier::Easy.bounds().width()
    }
}
