//! Recorded queue events.

use chrono::{DateTime, Utc};
use queuewatch_backend::{EventKind, JobRecord};
use serde::{Deserialize, Serialize};

/// A lifecycle event as kept in a queue's event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEvent {
    pub queue: String,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueueEvent {
    /// Build an event stamped now. Missing job data yields a partial event.
    pub fn new(
        queue: impl Into<String>,
        kind: EventKind,
        job: Option<&JobRecord>,
        error: Option<String>,
    ) -> Self {
        Self {
            queue: queue.into(),
            kind,
            timestamp: Utc::now(),
            job_id: job.and_then(|j| j.id.clone()),
            job_name: job.and_then(|j| j.name.clone()),
            error,
        }
    }

    /// Replace the recording time, e.g. with the time the backend emitted the event.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
