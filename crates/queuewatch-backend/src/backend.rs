//! Queue backend trait.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::repeat::{RepeatOptions, RepeatableJob};
use crate::types::{LifecycleEvent, QueueState};

/// Channel into which a backend pushes lifecycle events.
pub type EventSink = tokio::sync::mpsc::Sender<LifecycleEvent>;

/// Job queue backend observed by the monitor.
#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Adapter name, used in logs.
    fn name(&self) -> &str;

    /// Query the authoritative counts of a queue.
    async fn queue_state(&self, queue: &str) -> Result<QueueState, BackendError>;

    /// Start delivering lifecycle events of a queue into `sink`.
    async fn subscribe(&self, queue: &str, sink: EventSink) -> Result<(), BackendError>;

    /// Register (or replace) a repeatable job on a queue.
    async fn add_repeatable(
        &self,
        queue: &str,
        name: &str,
        data: serde_json::Value,
        pattern: &str,
        options: RepeatOptions,
    ) -> Result<RepeatableJob, BackendError>;

    /// List repeatable jobs registered on a queue.
    async fn list_repeatable(&self, queue: &str) -> Result<Vec<RepeatableJob>, BackendError>;

    /// Remove a repeatable job by key. Returns false when the key is unknown.
    async fn remove_repeatable(&self, queue: &str, key: &str) -> Result<bool, BackendError>;

    /// Pause a queue.
    async fn pause(&self, queue: &str) -> Result<(), BackendError>;

    /// Resume a paused queue.
    async fn resume(&self, queue: &str) -> Result<(), BackendError>;
}
