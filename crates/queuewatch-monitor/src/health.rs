//! System health summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::SnapshotTotals;

/// Health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Nothing needs attention.
    Healthy,
    /// Failures above the configured threshold.
    Warning,
    /// At least one critical alert in the log.
    Critical,
}

impl HealthStatus {
    /// Derive the status from the critical alert count and the total failed jobs.
    pub fn evaluate(critical_alert_count: usize, total_failed: u64, failed_threshold: u64) -> Self {
        if critical_alert_count > 0 {
            HealthStatus::Critical
        } else if total_failed > failed_threshold {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

/// System-wide health summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub status: HealthStatus,
    pub queue_count: usize,
    pub total_waiting: u64,
    pub total_active: u64,
    pub total_failed: u64,
    pub critical_alert_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl SystemHealth {
    pub fn compute(totals: SnapshotTotals, critical_alert_count: usize, failed_threshold: u64) -> Self {
        Self {
            status: HealthStatus::evaluate(critical_alert_count, totals.failed, failed_threshold),
            queue_count: totals.queue_count,
            total_waiting: totals.waiting,
            total_active: totals.active,
            total_failed: totals.failed,
            critical_alert_count,
            timestamp: Utc::now(),
        }
    }
}
