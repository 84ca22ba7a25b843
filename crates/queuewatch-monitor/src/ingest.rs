//! Lifecycle event ingestion.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use queuewatch_backend::{EventKind, JobRecord, LifecycleEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::alert_engine::AlertEngine;
use crate::event::QueueEvent;
use crate::state::MonitorState;

/// Applies lifecycle events to snapshots, performance metrics and alerts.
pub struct EventIngestor {
    state: Arc<MonitorState>,
    engine: Arc<AlertEngine>,
}

impl EventIngestor {
    pub fn new(state: Arc<MonitorState>, engine: Arc<AlertEngine>) -> Self {
        Self { state, engine }
    }

    /// Record one event stamped now. Never fails; missing job data yields a partial event.
    pub fn ingest(
        &self,
        queue: &str,
        kind: EventKind,
        job: Option<&JobRecord>,
        error: Option<&str>,
    ) {
        self.record(queue, kind, job, error, Utc::now());
    }

    /// Record a backend lifecycle event at the time the backend emitted it.
    pub fn handle(&self, event: &LifecycleEvent) {
        self.record(
            &event.queue,
            event.kind,
            event.job.as_ref(),
            event.error.as_deref(),
            event.timestamp,
        );
    }

    fn record(
        &self,
        queue: &str,
        kind: EventKind,
        job: Option<&JobRecord>,
        error: Option<&str>,
        timestamp: DateTime<Utc>,
    ) {
        let error = error
            .map(str::to_string)
            .or_else(|| job.and_then(|j| j.failure_reason.clone()));

        if self.state.queues.register(queue) {
            debug!("Discovered queue {} from event stream", queue);
        }

        debug!("Ingesting {} event for queue {}", kind, queue);
        self.state
            .snapshots
            .record_event(QueueEvent::new(queue, kind, job, error.clone()).at(timestamp));
        self.state.counters.inc_events_ingested();

        match kind {
            EventKind::Completed => self.state.performance.record_completion(
                queue,
                job.and_then(|j| j.enqueued_at),
                job.and_then(|j| j.processed_at),
            ),
            EventKind::Failed => self.state.performance.record_failure(queue),
            _ => {}
        }

        if matches!(kind, EventKind::Failed | EventKind::Stalled | EventKind::Error) {
            self.engine.on_event(queue, kind, error.as_deref());
        }
    }

    /// Consume events from `rx` until cancelled or every sender is dropped.
    pub async fn run(&self, mut rx: mpsc::Receiver<LifecycleEvent>, cancel: CancellationToken) {
        info!("Event ingestion started");

        loop {
            tokio::select! {
                event = rx.recv() => {
                    match event {
                        Some(event) => self.handle(&event),
                        None => {
                            info!("Event channel closed");
                            break;
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("Event ingestion shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
