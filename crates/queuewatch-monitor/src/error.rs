//! Monitor errors.

use queuewatch_backend::BackendError;
use thiserror::Error;

/// Monitor error types.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Backend unreachable or timed out.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Cron pattern rejected by the backend.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// Unknown queue or job.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller input rejected before reaching the backend.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Alert delivery failed.
    #[error("Alert delivery failed: {0}")]
    AlertDelivery(String),
}

impl From<BackendError> for MonitorError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::InvalidPattern { .. } => MonitorError::InvalidSchedule(e.to_string()),
            BackendError::NotFound(what) => MonitorError::NotFound(what),
            BackendError::Unavailable(_) | BackendError::Timeout(_) | BackendError::Protocol(_) => {
                MonitorError::BackendUnavailable(e.to_string())
            }
        }
    }
}
