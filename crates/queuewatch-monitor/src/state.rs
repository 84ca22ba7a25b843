//! Process-wide monitor state.

use std::collections::BTreeSet;

use parking_lot::{Mutex, RwLock};
use queuewatch_config::MonitorConfig;

use crate::alerts::{Alert, AlertSeverity};
use crate::bounded::BoundedLog;
use crate::metrics::MonitorCounters;
use crate::performance::PerformanceAggregator;
use crate::snapshot::SnapshotStore;

/// Names of the queues under observation.
pub struct QueueRegistry {
    names: RwLock<BTreeSet<String>>,
}

impl QueueRegistry {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            names: RwLock::new(names.into_iter().collect()),
        }
    }

    /// Add a queue. Returns false when it was already known.
    pub fn register(&self, name: &str) -> bool {
        if self.names.read().contains(name) {
            return false;
        }
        self.names.write().insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.read().contains(name)
    }

    /// Sorted queue names.
    pub fn names(&self) -> Vec<String> {
        self.names.read().iter().cloned().collect()
    }
}

/// Bounded log of raised alerts.
pub struct AlertLog {
    log: Mutex<BoundedLog<Alert>>,
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            log: Mutex::new(BoundedLog::new(capacity)),
        }
    }

    pub fn push(&self, alert: Alert) {
        self.log.lock().push(alert);
    }

    /// Alerts oldest first, optionally restricted to one severity.
    pub fn list(&self, severity: Option<AlertSeverity>) -> Vec<Alert> {
        self.log
            .lock()
            .iter()
            .filter(|a| severity.is_none_or(|s| a.severity == s))
            .cloned()
            .collect()
    }

    /// The newest `n` alerts, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Alert> {
        self.log.lock().tail(n)
    }

    pub fn count(&self, severity: AlertSeverity) -> usize {
        self.log.lock().iter().filter(|a| a.severity == severity).count()
    }

    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }
}

/// Shared state read by queries and written by the ingestion and periodic tasks.
pub struct MonitorState {
    pub queues: QueueRegistry,
    pub snapshots: SnapshotStore,
    pub performance: PerformanceAggregator,
    pub alerts: AlertLog,
    pub counters: MonitorCounters,
}

impl MonitorState {
    pub fn new(config: &MonitorConfig) -> Self {
        let state = Self {
            queues: QueueRegistry::new(config.queues.iter().cloned()),
            snapshots: SnapshotStore::new(config.event_log_capacity),
            performance: PerformanceAggregator::new(),
            alerts: AlertLog::new(config.alert_log_capacity),
            counters: MonitorCounters::default(),
        };
        for name in &config.queues {
            state.snapshots.ensure(name);
        }
        state
    }

    /// Configured queues plus every queue seen so far, sorted and deduplicated.
    pub fn known_queues(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.queues.names().into_iter().collect();
        names.extend(self.snapshots.names());
        names.into_iter().collect()
    }
}
