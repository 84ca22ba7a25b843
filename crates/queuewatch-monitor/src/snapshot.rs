//! Per-queue snapshots: counts, pause flag and recent events.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use queuewatch_backend::{EventKind, QueueCounts, QueueState};
use serde::Serialize;

use crate::bounded::BoundedLog;
use crate::event::QueueEvent;

/// Last known state of one queue.
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshot {
    pub name: String,
    #[serde(flatten)]
    pub counts: QueueCounts,
    pub paused: bool,
    pub last_updated: DateTime<Utc>,
    pub events: BoundedLog<QueueEvent>,
}

impl QueueSnapshot {
    fn new(name: &str, event_capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            counts: QueueCounts::default(),
            paused: false,
            last_updated: Utc::now(),
            events: BoundedLog::new(event_capacity),
        }
    }
}

/// Apply the count change implied by an event kind.
pub fn apply_transition(counts: &mut QueueCounts, kind: EventKind) {
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
}

/// Sums over every snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotTotals {
    pub queue_count: usize,
    pub waiting: u64,
    pub active: u64,
    pub failed: u64,
}

/// Keyed store of queue snapshots.
///
/// Snapshots are created lazily on first reference and never removed.
pub struct SnapshotStore {
    snapshots: RwLock<HashMap<String, QueueSnapshot>>,
    event_capacity: usize,
}

impl SnapshotStore {
    /// Create an empty store keeping `event_capacity` events per queue.
    pub fn new(event_capacity: usize) -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
            event_capacity,
        }
    }

    /// Make sure a snapshot exists for `queue`.
    pub fn ensure(&self, queue: &str) {
        if self.snapshots.read().contains_key(queue) {
            return;
        }
        self.snapshots
            .write()
            .entry(queue.to_string())
            .or_insert_with(|| QueueSnapshot::new(queue, self.event_capacity));
    }

    /// Append an event and apply its implied count transition.
    pub fn record_event(&self, event: QueueEvent) {
        let mut snapshots = self.snapshots.write();
        let snapshot = snapshots
            .entry(event.queue.clone())
            .or_insert_with(|| QueueSnapshot::new(&event.queue, self.event_capacity));

        apply_transition(&mut snapshot.counts, event.kind);
        snapshot.last_updated = Utc::now();
        snapshot.events.push(event);
    }

    /// Overwrite counts and pause flag with authoritative backend state.
    pub fn apply_state(&self, queue: &str, state: QueueState) {
        let mut snapshots = self.snapshots.write();
        let snapshot = snapshots
            .entry(queue.to_string())
            .or_insert_with(|| QueueSnapshot::new(queue, self.event_capacity));

        snapshot.counts = state.counts;
        snapshot.paused = state.paused;
        snapshot.last_updated = Utc::now();
    }

    pub fn get(&self, queue: &str) -> Option<QueueSnapshot> {
        self.snapshots.read().get(queue).cloned()
    }

    /// All snapshots, sorted by queue name.
    pub fn all(&self) -> Vec<QueueSnapshot> {
        let mut all: Vec<_> = self.snapshots.read().values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.snapshots.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.snapshots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.read().is_empty()
    }

    /// The newest `limit` events of a queue, in insertion order.
    pub fn events(&self, queue: &str, limit: usize) -> Option<Vec<QueueEvent>> {
        self.snapshots.read().get(queue).map(|s| s.events.tail(limit))
    }

    /// Events of every queue, newest first, truncated to `limit`.
    pub fn all_events(&self, limit: usize) -> Vec<QueueEvent> {
        let mut events: Vec<QueueEvent> = self
            .snapshots
            .read()
            .values()
            .flat_map(|s| s.events.iter().cloned())
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(limit);
        events
    }

    pub fn totals(&self) -> SnapshotTotals {
        let snapshots = self.snapshots.read();
        snapshots.values().fold(
            SnapshotTotals {
                queue_count: snapshots.len(),
                ..Default::default()
            },
            |mut acc, s| {
                acc.waiting += s.counts.waiting;
                acc.active += s.counts.active;
                acc.failed += s.counts.failed;
                acc
            },
        )
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
