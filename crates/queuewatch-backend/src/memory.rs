//! In-memory queue backend.
//!
//! Keeps per-queue counts and repeatable jobs in process and pushes lifecycle
//! events to subscribers. Used by tests and for local runs without a real
//! queue server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::backend::{EventSink, QueueBackend};
use crate::error::BackendError;
use crate::repeat::{RepeatOptions, RepeatableJob};
use crate::types::{EventKind, JobRecord, LifecycleEvent, QueueState};

#[derive(Default)]
struct QueueEntry {
    state: QueueState,
    repeatables: Vec<RepeatableJob>,
    subscribers: Vec<EventSink>,
}

/// In-memory backend.
pub struct MemoryBackend {
    queues: Mutex<HashMap<String, QueueEntry>>,
    unavailable: AtomicBool,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulate an outage: every call fails with `Unavailable` while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Overwrite the state of a queue.
    pub fn set_state(&self, queue: &str, state: QueueState) {
        self.queues.lock().entry(queue.to_string()).or_default().state = state;
    }

    /// Add a job to the waiting list.
    pub fn enqueue(&self, queue: &str, job: JobRecord) {
        self.transition(queue, EventKind::Waiting, job, None);
    }

    /// Move a job from waiting to active.
    pub fn start(&self, queue: &str, job: JobRecord) {
        self.transition(queue, EventKind::Active, job, None);
    }

    /// Complete an active job.
    pub fn complete(&self, queue: &str, job: JobRecord) {
        self.transition(queue, EventKind::Completed, job, None);
    }

    /// Fail an active job.
    pub fn fail(&self, queue: &str, job: JobRecord, error: impl Into<String>) {
        self.transition(queue, EventKind::Failed, job, Some(error.into()));
    }

    /// Report a stalled job.
    pub fn stall(&self, queue: &str, job: JobRecord) {
        self.transition(queue, EventKind::Stalled, job, None);
    }

    /// Report a queue-level error.
    pub fn raise_error(&self, queue: &str, error: impl Into<String>) {
        let event = LifecycleEvent::new(queue, EventKind::Error).with_error(error);
        let mut queues = self.queues.lock();
        let entry = queues.entry(queue.to_string()).or_default();
        Self::publish(entry, event);
    }

    fn transition(&self, queue: &str, kind: EventKind, job: JobRecord, error: Option<String>) {
        let mut queues = self.queues.lock();
        let entry = queues.entry(queue.to_string()).or_default();
        let counts = &mut entry.state.counts;

        match kind {
            EventKind::Waiting => counts.waiting += 1,
            EventKind::Active => {
                counts.waiting = counts.waiting.saturating_sub(1);
                counts.active += 1;
            }
            EventKind::Completed => {
                counts.active = counts.active.saturating_sub(1);
                counts.completed += 1;
            }
            EventKind::Failed => {
                counts.active = counts.active.saturating_sub(1);
                counts.failed += 1;
            }
            EventKind::Stalled | EventKind::Error => {}
        }

        let mut event = LifecycleEvent::new(queue, kind).with_job(job);
        event.error = error;
        Self::publish(entry, event);
    }

    fn publish(entry: &mut QueueEntry, event: LifecycleEvent) {
        entry.subscribers.retain(|sink| !sink.is_closed());
        for sink in &entry.subscribers {
            if let Err(e) = sink.try_send(event.clone()) {
                warn!("Dropping {} event for queue {}: {}", event.kind, event.queue, e);
            }
        }
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable(
                "memory backend marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueueBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn queue_state(&self, queue: &str) -> Result<QueueState, BackendError> {
        self.check_available()?;
        let queues = self.queues.lock();
        Ok(queues.get(queue).map(|e| e.state).unwrap_or_default())
    }

    async fn subscribe(&self, queue: &str, sink: EventSink) -> Result<(), BackendError> {
        self.check_available()?;
        let mut queues = self.queues.lock();
        queues.entry(queue.to_string()).or_default().subscribers.push(sink);
        debug!("Subscribed to lifecycle events of queue {}", queue);
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
        self.check_available()?;
        let job = RepeatableJob::new(name, pattern, data, &options)?;

        let mut queues = self.queues.lock();
        let entry = queues.entry(queue.to_string()).or_default();
        // Same name replaces the previous definition.
        entry.repeatables.retain(|existing| existing.name != name);
        entry.repeatables.push(job.clone());

        info!("Registered repeatable job {} on queue {} ({})", name, queue, pattern);
        Ok(job)
    }

    async fn list_repeatable(&self, queue: &str) -> Result<Vec<RepeatableJob>, BackendError> {
        self.check_available()?;
        let queues = self.queues.lock();
        Ok(queues
            .get(queue)
            .map(|e| e.repeatables.clone())
            .unwrap_or_default())
    }

    async fn remove_repeatable(&self, queue: &str, key: &str) -> Result<bool, BackendError> {
        self.check_available()?;
        let mut queues = self.queues.lock();
        let Some(entry) = queues.get_mut(queue) else {
            return Ok(false);
        };
        let before = entry.repeatables.len();
        entry.repeatables.retain(|job| job.key != key);
        Ok(entry.repeatables.len() < before)
    }

    async fn pause(&self, queue: &str) -> Result<(), BackendError> {
        self.check_available()?;
        self.queues.lock().entry(queue.to_string()).or_default().state.paused = true;
        info!("Queue {} paused", queue);
        Ok(())
    }

    async fn resume(&self, queue: &str) -> Result<(), BackendError> {
        self.check_available()?;
        self.queues.lock().entry(queue.to_string()).or_default().state.paused = false;
        info!("Queue {} resumed", queue);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
