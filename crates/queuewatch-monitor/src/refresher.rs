//! Periodic snapshot refresh from the backend's authoritative counts.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use queuewatch_backend::{BackendError, QueueBackend};
use serde::Serialize;
use tracing::{debug, error};

use crate::alert_engine::AlertEngine;
use crate::alerts::{Alert, AlertReason};
use crate::error::MonitorError;
use crate::state::MonitorState;

/// Outcome of a full refresh pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub refreshed: Vec<String>,
    pub failed: Vec<String>,
}

/// Overwrites snapshot counts with backend state.
pub struct SnapshotRefresher {
    state: Arc<MonitorState>,
    backend: Arc<dyn QueueBackend>,
    engine: Arc<AlertEngine>,
    timeout: Duration,
}

impl SnapshotRefresher {
    pub fn new(
        state: Arc<MonitorState>,
        backend: Arc<dyn QueueBackend>,
        engine: Arc<AlertEngine>,
    ) -> Self {
        Self {
            state,
            backend,
            engine,
            timeout: Duration::from_secs(5),
        }
    }

    /// Set the per-query timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Refresh one queue.
    ///
    /// On failure the last known snapshot is kept and a critical alert is raised.
    pub async fn refresh(&self, queue: &str) -> Result<(), MonitorError> {
        let result = match tokio::time::timeout(self.timeout, self.backend.queue_state(queue)).await
        {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(self.timeout.as_millis() as u64)),
        };

        match result {
            Ok(state) => {
                debug!("Refreshed queue {}: {:?}", queue, state.counts);
                self.state.snapshots.apply_state(queue, state);
                Ok(())
            }
            Err(e) => {
                error!("Failed to refresh queue {} from {}: {}", queue, self.backend.name(), e);
                self.state.counters.inc_refresh_failures();
                self.state.snapshots.ensure(queue);
                self.engine.raise(
                    Alert::new(queue, AlertReason::Error, true)
                        .with_message(format!("snapshot refresh failed: {}", e)),
                );
                Err(MonitorError::BackendUnavailable(e.to_string()))
            }
        }
    }

    /// Refresh every known queue concurrently.
    pub async fn refresh_all(&self) -> RefreshReport {
        let queues = self.state.known_queues();
        let results = join_all(queues.iter().map(|q| self.refresh(q))).await;

        let mut report = RefreshReport::default();
        for (queue, result) in queues.into_iter().zip(results) {
            match result {
                Ok(()) => report.refreshed.push(queue),
                Err(_) => report.failed.push(queue),
            }
        }
        report
    }
}

#[cfg(test)]
#[path = "refresher_tests.rs"]
mod tests;
