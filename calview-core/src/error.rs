//! Error types for calview.

use thiserror::Error;

/// Errors that can occur while importing, grouping or exporting events.
///
/// Parsing ICS text never produces one of these: missing or malformed fields
/// fall back to defaults instead.
#[derive(Error, Debug)]
pub enum CalViewError {
    #[error("Failed to fetch calendar: {0}")]
    Transport(String),

    #[error("Not signed in: {0}")]
    Unauthenticated(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid month '{0}'. Expected YYYY-MM")]
    InvalidMonth(String),

    #[error("Invalid range: {start} is after {end}")]
    InvalidRange { start: String, end: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Preference store error: {0}")]
    Preferences(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CalViewError {
    fn from(err: serde_json::Error) -> Self {
        CalViewError::Serialization(err.to_string())
    }
}

/// Result type alias for calview operations.
pub type CalViewResult<T> = Result<T, CalViewError>;
