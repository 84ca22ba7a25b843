//! HTTP adapter for REST-fronted queue backends.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | Method | Path                              | Purpose                 |
//! |--------|-----------------------------------|-------------------------|
//! | GET    | `/queues/{q}/state`               | queue counts            |
//! | POST   | `/queues/{q}/pause`               | pause                   |
//! | POST   | `/queues/{q}/resume`              | resume                  |
//! | GET    | `/queues/{q}/repeatable`          | list repeatable jobs    |
//! | POST   | `/queues/{q}/repeatable`          | add repeatable job      |
//! | DELETE | `/queues/{q}/repeatable/{key}`    | remove repeatable job   |
//!
//! Lifecycle events are not pulled: REST backends push them to the monitor's
//! `POST /events` endpoint instead.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use tracing::{debug, info};

use crate::backend::{EventSink, QueueBackend};
use crate::error::BackendError;
use crate::repeat::{RepeatOptions, RepeatableJob};
use crate::types::QueueState;

/// REST backend client.
pub struct HttpBackend {
    base_url: Url,
    timeout_ms: u64,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BackendError::Protocol(format!("Invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Protocol(format!(
                "Base URL {} cannot carry paths",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| BackendError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            timeout_ms,
            client,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn map_send_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.timeout_ms)
        } else {
            BackendError::from(e)
        }
    }

    async fn check_status(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            Err(BackendError::Unavailable(format!("{}: {}", status, body)))
        } else if status == StatusCode::NOT_FOUND {
            Err(BackendError::NotFound(body))
        } else {
            Err(BackendError::Protocol(format!("{}: {}", status, body)))
        }
    }
}

#[async_trait]
impl QueueBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn queue_state(&self, queue: &str) -> Result<QueueState, BackendError> {
        let response = self
            .client
            .get(self.url(&["queues", queue, "state"]))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response).await?;
        response.json().await.map_err(|e| self.map_send_error(e))
    }

    async fn subscribe(&self, queue: &str, _sink: EventSink) -> Result<(), BackendError> {
        info!(
            "HTTP backend does not stream events for queue {}; expecting pushes to /events",
            queue
        );
        Ok(())
    }

    async fn add_repeatable(
        &self,
        queue: &str,
        name: &str,
        data: serde_json::Value,
        pattern: &str,
        options: RepeatOptions,
    ) -> Result<RepeatableJob, BackendError> {
        let payload = serde_json::json!({
            "name": name,
            "data": data,
            "pattern": pattern,
            "options": options,
        });

        let response = self
            .client
            .post(self.url(&["queues", queue, "repeatable"]))
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            let reason = response.text().await.unwrap_or_default();
            return Err(BackendError::InvalidPattern {
                pattern: pattern.to_string(),
                reason,
            });
        }

        let response = Self::check_status(response).await?;
        let job: RepeatableJob = response.json().await.map_err(|e| self.map_send_error(e))?;
        debug!("Backend registered repeatable job {} with key {}", job.name, job.key);
        Ok(job)
    }

    async fn list_repeatable(&self, queue: &str) -> Result<Vec<RepeatableJob>, BackendError> {
        let response = self
            .client
            .get(self.url(&["queues", queue, "repeatable"]))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response).await?;
        response.json().await.map_err(|e| self.map_send_error(e))
    }

    async fn remove_repeatable(&self, queue: &str, key: &str) -> Result<bool, BackendError> {
        let response = self
            .client
            .delete(self.url(&["queues", queue, "repeatable", key]))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check_status(response).await?;
        Ok(true)
    }

    async fn pause(&self, queue: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url(&["queues", queue, "pause"]))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn resume(&self, queue: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url(&["queues", queue, "resume"]))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
