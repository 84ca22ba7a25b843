//! Backend errors.

use thiserror::Error;

/// Backend error types.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Backend could not be reached or refused the query.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Backend did not answer in time.
    #[error("Backend request timed out after {0}ms")]
    Timeout(u64),

    /// Cron pattern rejected.
    #[error("Invalid cron pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Queue or job not known to the backend.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend answered with something we cannot interpret.
    #[error("Unexpected backend response: {0}")]
    Protocol(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Protocol(e.to_string())
        } else {
            BackendError::Unavailable(e.to_string())
        }
    }
}
