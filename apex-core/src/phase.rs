/// Defines experiment phases and behavior
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    fn allows_tapping(&self) -> bool;
    fn requires_hold_keys(&self) -> bool;
    fn next(&self) -> Option<Self>;

    fn is_practice(&self) -> bool {
        false
    }
    fn is_calibration(&self) -> bool {
        false
    }
    fn is_validation(&self) -> bool {
        false
    }
    fn is_block(&self) -> bool {
        false
    }
    fn is_welcome(&self) -> bool {
        false
    }
}

#[derive(Copy, Debug, Clone, PartialEq)]
pub enum StandardPhase {
    Welcome,
    Practice,
    Calibration,
    Validation,
    Block,
    Debrief,
}

impl Default for StandardPhase {
    fn default() -> Self {
        StandardPhase::Welcome
    }
}

impl Phase for StandardPhase {
    fn allows_tapping(&self) -> bool {
        !matches!(self, Self::Welcome | Self::Debrief)
    }

    fn requires_hold_keys(&self) -> bool {
        matches!(
            self,
            Self::Practice | Self::Calibration | Self::Validation | Self::Block
        )
    }

    fn next(&self) -> Option<Self> {
        use StandardPhase::*;
        Some(match self {
            Welcome => Practice,
            Practice => Calibration,
            Calibration => Validation,
            Validation => Block,
            Block => Debrief,
            Debrief => return None,
        })
    }

    fn is_practice(&self) -> bool {
        matches!(self, StandardPhase::Practice)
    }

    fn is_calibration(&self) -> bool {
        matches!(self, StandardPhase::Calibration)
    }

    fn is_validation(&self) -> bool {
        matches!(self, StandardPhase::Validation)
    }

    fn is_block(&self) -> bool {
        matches!(self, StandardPhase::Block)
    }

    fn is_welcome(&self) -> bool {
        matches!(self, StandardPhase::Welcome)
    }
}
