use serde::{Deserialize, Serialize};

use crate::block::BlockType;
use crate::bounds::{BandTier, Bounds};

/// Trial variants; each carries only the fields its kind needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrialKind {
    Demo,
    Calibration,
    Validation(BandTier),
    Block(BlockType),
}

impl TrialKind {
    pub fn is_calibration(&self) -> bool {
        matches!(self, TrialKind::Calibration)
    }

    pub fn is_block(&self) -> bool {
        matches!(self, TrialKind::Block(_))
    }

    /// Flat tag used in exported records.
    pub fn label(&self) -> String {
        match self {
            TrialKind::Demo => "demo".to_string(),
            TrialKind::Calibration => "calibration".to_string(),
            TrialKind::Validation(tier) => format!("validation:{}", tier.name()),
            TrialKind::Block(block) => format!("block:{}", block.name()),
        }
    }
}

/// One planned trial out of the factory, consumed exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialParameterSet {
    pub reward: f64,
    pub bounds: Bounds,
    pub original_bounds: Bounds,
    pub random_delay_ms: (u64, u64),
}

/// Recorded result per trial, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub kind: TrialKind,
    pub tap_count: u32,
    pub start_ms: u64,
    pub end_ms: u64,
    pub level_reached: f64,
    pub bounds: Bounds,
    pub reward: f64,
    pub keys_released_early: bool,
    pub key_tapped_early: bool,
    pub success: bool,
}

impl TrialOutcome {
    /// Builds the record at trial end; `success` is derived here and never
    /// recomputed.
    #[allow(clippy::too_many_arguments)]
    pub fn finalize(
        kind: TrialKind,
        tap_count: u32,
        start_ms: u64,
        end_ms: u64,
        level_reached: f64,
        bounds: Bounds,
        reward: f64,
        keys_released_early: bool,
        key_tapped_early: bool,
    ) -> Self {
        let success = bounds.contains(level_reached) && !keys_released_early && !key_tapped_early;
        Self {
            kind,
            tap_count,
            start_ms,
            end_ms,
            level_reached,
            bounds,
            reward,
            keys_released_early,
            key_tapped_early,
            success,
        }
    }

    /// Neither early key release nor early tap.
    pub fn is_clean(&self) -> bool {
        !self.keys_released_early && !self.key_tapped_early
    }
}
