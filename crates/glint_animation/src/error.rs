//! Motion engine error types

use thiserror::Error;

/// Errors raised by the motion engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// A spring or animation was configured with an invalid parameter
    #[error("Invalid configuration: {parameter} must be positive and finite (got {value})")]
    Configuration {
        parameter: &'static str,
        value: f32,
    },

    /// A tickable failed during a frame
    #[error("Tick failed in {label}: {reason}")]
    TickFailure { label: String, reason: String },
}

impl MotionError {
    /// Shorthand for a tick failure
    pub fn tick_failure(label: impl Into<String>, reason: impl Into<String>) -> Self {
        MotionError::TickFailure {
            label: label.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for motion engine operations
pub type Result<T> = std::result::Result<T, MotionError>;

/// Check that a parameter is positive and finite
pub(crate) fn require_positive(parameter: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MotionError::Configuration { parameter, value })
    }
}
