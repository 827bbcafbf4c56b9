//! Error type and panic containment for command execution.
//!
//! Every failure, including a panic inside a command, ends up as a
//! [`CliError`] whose `Display` text becomes the `error` field of the JSON
//! payload.

use crate::types::ErrorResponse;
use agrifcst_core::ForecastError;
use chrono::NaiveDate;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;

/// Process exit status for any failed command.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column '{0}' in CSV header")]
    MissingColumn(&'static str),

    #[error("Invalid month '{value}' on line {line}")]
    InvalidMonth { value: String, line: u64 },

    #[error("Duplicate month {date} for {crop}")]
    DuplicateDate { crop: String, date: NaiveDate },

    #[error("Failed to encode response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Panic in command execution")]
    Panic,
}

pub type CliResult<T> = std::result::Result<T, CliError>;

/// Run a command, turning a panic into [`CliError::Panic`].
pub fn cli_try<F, T>(f: F) -> CliResult<T>
where
    F: FnOnce() -> CliResult<T>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => Err(CliError::Panic),
    }
}

/// The JSON error payload for `err`.
pub fn error_json(err: &CliError) -> String {
    let payload = ErrorResponse {
        error: err.to_string(),
    };
    serde_json::to_string(&payload).unwrap_or_else(|_| r#"{"error":"unknown error"}"#.to_string())
}
