//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use queuewatch_monitor::MonitorError;
use thiserror::Error;
use tracing::warn;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Backend unavailable: {0}")]
    BadGateway(String),

    #[error("Event ingestion is saturated")]
    Saturated,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidSchedule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Saturated => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MonitorError> for ApiError {
    fn from(err: MonitorError) -> Self {
        match err {
            MonitorError::NotFound(what) => ApiError::NotFound(what),
            MonitorError::Validation(msg) => ApiError::BadRequest(msg),
            MonitorError::InvalidSchedule(msg) => ApiError::InvalidSchedule(msg),
            MonitorError::BackendUnavailable(msg) => ApiError::BadGateway(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_error_statuses() {
        let cases = [
            (MonitorError::NotFound("job".into()), StatusCode::NOT_FOUND),
            (MonitorError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                MonitorError::InvalidSchedule("bad cron".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                MonitorError::BackendUnavailable("down".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                MonitorError::AlertDelivery("smtp down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::Saturated.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
