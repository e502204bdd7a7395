//! AlarmPi Error Types
//!
//! Centralized error handling for the alarm pipeline.

use thiserror::Error;

/// Central error type for AlarmPi
#[derive(Error, Debug)]
pub enum AlarmError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A remote service (TTS, weather, feed) could not be reached or refused the request.
    #[error("Service error: {0}")]
    Service(String),

    #[error("Wakeup media error: {0}")]
    Media(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for AlarmPi operations
pub type AlarmResult<T> = Result<T, AlarmError>;

impl From<reqwest::Error> for AlarmError {
    fn from(err: reqwest::Error) -> Self {
        AlarmError::Service(err.to_string())
    }
}

impl AlarmError {
    /// True for failures of a remote service rather than local setup.
    pub fn is_service(&self) -> bool {
        matches!(self, AlarmError::Service(_))
    }
}
