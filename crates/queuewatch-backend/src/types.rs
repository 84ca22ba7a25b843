//! Queue state and lifecycle event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job lifecycle event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Job entered the waiting list.
    Waiting,
    /// Job picked up by a worker.
    Active,
    /// Job finished successfully.
    Completed,
    /// Job failed.
    Failed,
    /// Job lost its worker lock.
    Stalled,
    /// Backend-level error on the queue.
    Error,
}

impl EventKind {
    /// All kinds, in lifecycle order.
    pub const ALL: [EventKind; 6] = [
        EventKind::Waiting,
        EventKind::Active,
        EventKind::Completed,
        EventKind::Failed,
        EventKind::Stalled,
        EventKind::Error,
    ];

    /// Lowercase name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Waiting => "waiting",
            EventKind::Active => "active",
            EventKind::Completed => "completed",
            EventKind::Failed => "failed",
            EventKind::Stalled => "stalled",
            EventKind::Error => "error",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job record as exposed by the backend.
///
/// Every field is optional: events with partial job data are still accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRecord {
    /// Backend job ID.
    pub id: Option<String>,
    /// Job name.
    pub name: Option<String>,
    /// Time the job was added to the queue.
    pub enqueued_at: Option<DateTime<Utc>>,
    /// Time a worker started processing.
    pub processed_at: Option<DateTime<Utc>>,
    /// Time the job reached a terminal state.
    pub finished_at: Option<DateTime<Utc>>,
    /// Failure reason for failed jobs.
    pub failure_reason: Option<String>,
}

impl JobRecord {
    /// Create a job record with an ID and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set enqueue time.
    pub fn with_enqueued_at(mut self, at: DateTime<Utc>) -> Self {
        self.enqueued_at = Some(at);
        self
    }

    /// Set processing start time.
    pub fn with_processed_at(mut self, at: DateTime<Utc>) -> Self {
        self.processed_at = Some(at);
        self
    }

    /// Set finish time.
    pub fn with_finished_at(mut self, at: DateTime<Utc>) -> Self {
        self.finished_at = Some(at);
        self
    }

    /// Set failure reason.
    pub fn with_failure_reason(mut self, reason: impl Into<String>) -> Self {
        self.failure_reason = Some(reason.into());
        self
    }
}

/// A lifecycle event pushed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Queue the event belongs to.
    pub queue: String,
    /// Event kind.
    pub kind: EventKind,
    /// Job the event refers to, if any.
    #[serde(default)]
    pub job: Option<JobRecord>,
    /// Error message attached to the event.
    #[serde(default)]
    pub error: Option<String>,
    /// Time the backend emitted the event.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl LifecycleEvent {
    /// Create a new event stamped now.
    pub fn new(queue: impl Into<String>, kind: EventKind) -> Self {
        Self {
            queue: queue.into(),
            kind,
            job: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach a job record.
    pub fn with_job(mut self, job: JobRecord) -> Self {
        self.job = Some(job);
        self
    }

    /// Attach an error message.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Job counts of a queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueCounts {
    pub waiting: u64,
    pub active: u64,
    pub completed: u64,
    pub failed: u64,
    pub delayed: u64,
}

/// Authoritative queue state reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueState {
    #[serde(flatten)]
    pub counts: QueueCounts,
    #[serde(default)]
    pub paused: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_serde() {
        assert_eq!(serde_json::to_string(&EventKind::Stalled).unwrap(), "\"stalled\"");
        let kind: EventKind = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(kind, EventKind::Completed);
    }

    #[test]
    fn test_event_kind_display() {
        for kind in EventKind::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_lifecycle_event_partial_payload() {
        let event: LifecycleEvent =
            serde_json::from_str(r#"{"queue": "email", "kind": "failed", "job": {"name": "send"}}"#)
                .unwrap();
        assert_eq!(event.queue, "email");
        assert_eq!(event.kind, EventKind::Failed);
        let job = event.job.unwrap();
        assert!(job.id.is_none());
        assert_eq!(job.name.as_deref(), Some("send"));
        assert!(event.error.is_none());
    }

    #[test]
    fn test_queue_state_flattened() {
        let state: QueueState =
            serde_json::from_str(r#"{"waiting": 3, "failed": 11, "paused": true}"#).unwrap();
        assert_eq!(state.counts.waiting, 3);
        assert_eq!(state.counts.failed, 11);
        assert_eq!(state.counts.active, 0);
        assert!(state.paused);
    }
}
