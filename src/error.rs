//! Error types for Synheart Streak

use thiserror::Error;

/// Errors that can occur while ingesting or validating engine inputs.
///
/// The streak computations themselves are total; these errors are only raised
/// by the strict entry points (validation, the analysis pipeline, CLI and FFI).
#[derive(Debug, Error)]
pub enum StreakError {
    #[error("Threshold shape does not match goal kind '{kind}': expected {expected}")]
    ThresholdShapeMismatch { kind: String, expected: String },

    #[error("Goal threshold must be finite")]
    NonFiniteThreshold,

    #[error("Invalid range threshold: low {low} is greater than high {high}")]
    InvalidRange { low: f64, high: f64 },

    #[error("Observation on {date} has a non-finite value: {value}")]
    NonFiniteValue { date: String, value: f64 },

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid engine configuration: {0}")]
    ConfigError(String),
}

impl StreakError {
    /// Whether this error signals a caller-supplied argument that cannot be compared
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            StreakError::ThresholdShapeMismatch { .. }
                | StreakError::NonFiniteThreshold
                | StreakError::InvalidRange { .. }
                | StreakError::NonFiniteValue { .. }
        )
    }
}
