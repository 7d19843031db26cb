pub mod calibration;
pub mod config;
pub mod controller;
pub mod error;
pub mod factory;
pub mod jitter;
pub mod order;
pub mod session;
pub mod validation;
pub mod variate;

pub use calibration::{median, CalibrationGate, CalibrationState, CalibrationVerdict};
pub use config::ExperimentConfig;
pub use controller::{auto_increase_amount, ControllerState, TapCounterController, TrialParams};
pub use error::{Error, Result};
pub use factory::build_trials;
pub use jitter::jitter;
pub use order::resolve_order;
pub use session::{AbortReason, Session, SessionDecision, SessionSummary};
pub use validation::{ValidationGate, ValidationVerdict};
