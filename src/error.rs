//! Error types.
//!
//! - `SeriesError`: precondition violations raised by the pure series core.
//! - `AppError`: everything the binary reports, carrying a process exit code.

use chrono::NaiveDate;
use thiserror::Error;

/// Failures of the daily-series core. Both indicate a caller bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("invalid interval: end {end} is before start {start}")]
    InvalidInterval { start: NaiveDate, end: NaiveDate },
    #[error("duplicate observation for {date}; pre-aggregate rows to one value per date")]
    DuplicateObservation { date: NaiveDate },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<SeriesError> for AppError {
    fn from(err: SeriesError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
