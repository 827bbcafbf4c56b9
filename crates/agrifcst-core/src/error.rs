//! Error types for crop price forecasting.

use thiserror::Error;

/// Result type for forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Error types for feature building, training and prediction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Data not found for {0}")]
    DataUnavailable(String),

    #[error("Insufficient history for {crop}: need at least {needed} observations, got {got}")]
    InsufficientHistory {
        crop: String,
        needed: usize,
        got: usize,
    },

    #[error("Model not trained for {0}")]
    ModelNotTrained(String),

    #[error("Training failed for {crop}: {reason}")]
    TrainingFailure { crop: String, reason: String },

    #[error("Prediction failed: {0}")]
    InferenceFailure(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid parameter '{param}' = '{value}': {reason}")]
    InvalidParameter {
        param: String,
        value: String,
        reason: String,
    },

    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("Computation error: {0}")]
    ComputationError(String),
}

impl ForecastError {
    /// Stable numeric code, used as the process exit detail by callers.
    pub fn to_code(&self) -> i32 {
        match self {
            ForecastError::DataUnavailable(_) => 1,
            ForecastError::InsufficientHistory { .. } => 2,
            ForecastError::ModelNotTrained(_) => 3,
            ForecastError::TrainingFailure { .. } => 4,
            ForecastError::InferenceFailure(_) => 5,
            ForecastError::InvalidInput(_) => 6,
            ForecastError::InvalidParameter { .. } => 7,
            ForecastError::InvalidDateFormat(_) => 8,
            ForecastError::ComputationError(_) => 9,
        }
    }

    pub(crate) fn invalid_parameter(
        param: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ForecastError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
