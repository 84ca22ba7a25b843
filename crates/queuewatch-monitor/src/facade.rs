//! Read-side queries over the monitor state.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::alerts::{Alert, AlertSeverity};
use crate::error::MonitorError;
use crate::event::QueueEvent;
use crate::health::SystemHealth;
use crate::metrics;
use crate::performance::{PerformanceMetric, PerformanceReport, SystemPerformance};
use crate::registry::{RecurringJob, RecurringJobRegistry};
use crate::snapshot::QueueSnapshot;
use crate::state::MonitorState;

/// Everything the dashboard shows in one response.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub system_health: SystemHealth,
    pub queues: Vec<QueueSnapshot>,
    pub metrics: BTreeMap<String, PerformanceMetric>,
    pub system_performance: SystemPerformance,
    pub recent_alerts: Vec<Alert>,
    pub recurring_job_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Query entry point used by the HTTP layer.
pub struct QueryFacade {
    state: Arc<MonitorState>,
    registry: Arc<RecurringJobRegistry>,
    health_failed_count: u64,
    dashboard_alert_count: usize,
}

impl QueryFacade {
    pub fn new(state: Arc<MonitorState>, registry: Arc<RecurringJobRegistry>) -> Self {
        Self {
            state,
            registry,
            health_failed_count: 10,
            dashboard_alert_count: 10,
        }
    }

    /// Total failed jobs above which health degrades to warning.
    pub fn with_health_failed_count(mut self, count: u64) -> Self {
        self.health_failed_count = count;
        self
    }

    /// Number of recent alerts on the dashboard.
    pub fn with_dashboard_alert_count(mut self, count: usize) -> Self {
        self.dashboard_alert_count = count;
        self
    }

    pub fn state(&self) -> &Arc<MonitorState> {
        &self.state
    }

    pub fn registry(&self) -> &Arc<RecurringJobRegistry> {
        &self.registry
    }

    pub async fn dashboard(&self) -> Dashboard {
        let recurring_job_count = match self.registry.list().await {
            Ok(jobs) => jobs.len(),
            Err(e) => {
                warn!("Recurring job count unavailable for dashboard: {}", e);
                0
            }
        };

        Dashboard {
            system_health: self.system_health(),
            queues: self.state.snapshots.all(),
            metrics: self.state.performance.all(),
            system_performance: self.state.performance.system(),
            recent_alerts: self.state.alerts.recent(self.dashboard_alert_count),
            recurring_job_count,
            timestamp: Utc::now(),
        }
    }

    pub fn system_health(&self) -> SystemHealth {
        SystemHealth::compute(
            self.state.snapshots.totals(),
            self.state.alerts.count(AlertSeverity::Critical),
            self.health_failed_count,
        )
    }

    /// Snapshots of every queue, sorted by name.
    pub fn queues(&self) -> Vec<QueueSnapshot> {
        self.state.snapshots.all()
    }

    pub fn queue_status(&self, name: &str) -> Option<QueueSnapshot> {
        self.state.snapshots.get(name)
    }

    pub fn performance_metric(&self, name: &str) -> Option<PerformanceMetric> {
        self.state.performance.get(name)
    }

    pub fn performance_report(&self) -> PerformanceReport {
        self.state.performance.report()
    }

    /// Alerts oldest first, optionally filtered by severity.
    pub fn alerts(&self, severity: Option<AlertSeverity>) -> Vec<Alert> {
        self.state.alerts.list(severity)
    }

    pub fn clear_alerts(&self) {
        self.state.alerts.clear();
    }

    pub async fn recurring_jobs(&self) -> Result<Vec<RecurringJob>, MonitorError> {
        self.registry.list().await
    }

    /// Recent events.
    ///
    /// For one queue: its newest `limit` events in insertion order, `None` when
    /// the queue is unknown. Without a queue: every queue's events, newest first.
    pub fn events(&self, queue: Option<&str>, limit: usize) -> Option<Vec<QueueEvent>> {
        match queue {
            Some(name) => self.state.snapshots.events(name, limit),
            None => Some(self.state.snapshots.all_events(limit)),
        }
    }

    /// Prometheus exposition of the current state.
    pub fn metrics_text(&self) -> String {
        metrics::render(&self.state)
    }
}

#[cfg(test)]
#[path = "facade_tests.rs"]
mod tests;
