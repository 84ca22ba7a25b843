//! Per-queue processing statistics and the system-wide rollup.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cumulative processing statistics of one queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    pub completed_count: u64,
    pub failed_count: u64,
    pub total_processing_time_ms: u64,
    /// Completions that carried usable timestamps.
    pub jobs_timed: u64,
    pub avg_processing_time_ms: f64,
}

impl PerformanceMetric {
    /// Count a completion, adding its duration when known.
    pub fn record_completion(&mut self, duration_ms: Option<u64>) {
        self.completed_count += 1;
        if let Some(ms) = duration_ms {
            self.total_processing_time_ms += ms;
            self.jobs_timed += 1;
        }
        self.avg_processing_time_ms = if self.jobs_timed == 0 {
            0.0
        } else {
            self.total_processing_time_ms as f64 / self.jobs_timed as f64
        };
    }

    pub fn record_failure(&mut self) {
        self.failed_count += 1;
    }

    pub fn total_jobs(&self) -> u64 {
        self.completed_count + self.failed_count
    }

    /// Failed share of finished jobs, `None` before any job finished.
    pub fn failure_ratio(&self) -> Option<f64> {
        match self.total_jobs() {
            0 => None,
            total => Some(self.failed_count as f64 / total as f64),
        }
    }
}

/// System-wide rollup over every queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemPerformance {
    pub total_jobs: u64,
    /// Unweighted mean of the per-queue averages.
    pub avg_processing_time_ms: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Per-queue metrics plus the system rollup.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub queues: BTreeMap<String, PerformanceMetric>,
    pub system: SystemPerformance,
}

/// Processing time between enqueue and processing start.
///
/// Returns `None` when a timestamp is missing or the clock ran backwards.
pub fn processing_time_ms(
    enqueued_at: Option<DateTime<Utc>>,
    processed_at: Option<DateTime<Utc>>,
) -> Option<u64> {
    let (enqueued, processed) = (enqueued_at?, processed_at?);
    u64::try_from((processed - enqueued).num_milliseconds()).ok()
}

/// Aggregates completions and failures per queue.
pub struct PerformanceAggregator {
    metrics: RwLock<HashMap<String, PerformanceMetric>>,
    system: RwLock<SystemPerformance>,
}

impl PerformanceAggregator {
    pub fn new() -> Self {
        Self {
            metrics: RwLock::new(HashMap::new()),
            system: RwLock::new(SystemPerformance::default()),
        }
    }

    pub fn record_completion(
        &self,
        queue: &str,
        enqueued_at: Option<DateTime<Utc>>,
        processed_at: Option<DateTime<Utc>>,
    ) {
        let duration = processing_time_ms(enqueued_at, processed_at);
        if duration.is_none() && enqueued_at.is_some() && processed_at.is_some() {
            debug!("Skipping negative processing time for a job on queue {}", queue);
        }

        self.metrics
            .write()
            .entry(queue.to_string())
            .or_default()
            .record_completion(duration);
    }

    pub fn record_failure(&self, queue: &str) {
        self.metrics
            .write()
            .entry(queue.to_string())
            .or_default()
            .record_failure();
    }

    pub fn get(&self, queue: &str) -> Option<PerformanceMetric> {
        self.metrics.read().get(queue).cloned()
    }

    /// Snapshot of every per-queue metric, keyed by queue name.
    pub fn all(&self) -> BTreeMap<String, PerformanceMetric> {
        self.metrics
            .read()
            .iter()
            .map(|(name, metric)| (name.clone(), metric.clone()))
            .collect()
    }

    /// Recompute the system-wide entry.
    pub fn rollup(&self) -> SystemPerformance {
        let rollup = {
            let metrics = self.metrics.read();
            let total_jobs = metrics.values().map(PerformanceMetric::total_jobs).sum();
            let avg_processing_time_ms = if metrics.is_empty() {
                0.0
            } else {
                metrics
                    .values()
                    .map(|m| m.avg_processing_time_ms)
                    .sum::<f64>()
                    / metrics.len() as f64
            };
            SystemPerformance {
                total_jobs,
                avg_processing_time_ms,
                updated_at: Some(Utc::now()),
            }
        };

        *self.system.write() = rollup.clone();
        rollup
    }

    /// Last computed rollup.
    pub fn system(&self) -> SystemPerformance {
        self.system.read().clone()
    }

    pub fn report(&self) -> PerformanceReport {
        PerformanceReport {
            queues: self.all(),
            system: self.system(),
        }
    }
}

impl Default for PerformanceAggregator {
    fn default() -> Self {
        Self::new()
    }
}
