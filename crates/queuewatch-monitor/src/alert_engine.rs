//! Alert evaluation: reactive alerts from lifecycle events and periodic
//! threshold checks over snapshots and performance metrics.

use std::sync::Arc;

use queuewatch_backend::EventKind;
use queuewatch_config::ThresholdsConfig;
use tracing::{debug, warn};

use crate::alert_manager::AlertNotifier;
use crate::alerts::{Alert, AlertReason, AlertSeverity};
use crate::state::MonitorState;

/// Raises alerts into the alert log.
pub struct AlertEngine {
    state: Arc<MonitorState>,
    thresholds: ThresholdsConfig,
    notifier: Option<AlertNotifier>,
}

impl AlertEngine {
    pub fn new(state: Arc<MonitorState>, thresholds: ThresholdsConfig) -> Self {
        Self {
            state,
            thresholds,
            notifier: None,
        }
    }

    /// Hand critical alerts to an out-of-band notifier.
    pub fn with_notifier(mut self, notifier: AlertNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Append an alert to the log, notifying when it is critical.
    pub fn raise(&self, alert: Alert) {
        debug!(
            "Alert {} on queue {} ({})",
            alert.reason, alert.queue, alert.severity
        );
        self.state.counters.inc_alerts_raised();

        if alert.severity == AlertSeverity::Critical {
            warn!("Critical alert on queue {}: {}", alert.queue, alert.format_text());
            if let Some(ref notifier) = self.notifier {
                notifier.notify(alert.clone());
            }
        }

        self.state.alerts.push(alert);
    }

    /// Reactive path for failed, stalled and error events.
    pub fn on_event(&self, queue: &str, kind: EventKind, error: Option<&str>) -> Option<Alert> {
        let reason = match kind {
            EventKind::Failed => AlertReason::Failed,
            EventKind::Stalled => AlertReason::Stalled,
            EventKind::Error => AlertReason::Error,
            EventKind::Waiting | EventKind::Active | EventKind::Completed => return None,
        };

        let mut alert = Alert::new(queue, reason, error.is_some());
        if let Some(message) = error {
            alert = alert.with_message(message);
        }
        self.raise(alert.clone());
        Some(alert)
    }

    /// Run the health and performance passes once. Returns the alerts raised.
    pub fn evaluate(&self) -> Vec<Alert> {
        let mut raised = self.health_pass();
        raised.extend(self.performance_pass());

        for alert in &raised {
            self.raise(alert.clone());
        }
        raised
    }

    fn health_pass(&self) -> Vec<Alert> {
        let t = &self.thresholds;
        let mut alerts = Vec::new();

        for snapshot in self.state.snapshots.all() {
            let counts = snapshot.counts;
            if counts.failed > t.failed_count {
                alerts.push(
                    Alert::new(&snapshot.name, AlertReason::HighFailureRate, true)
                        .with_message(format!("{} failed jobs", counts.failed)),
                );
            }
            if counts.waiting > t.waiting_count {
                alerts.push(
                    Alert::new(&snapshot.name, AlertReason::QueueBacklog, true)
                        .with_message(format!("{} jobs waiting", counts.waiting)),
                );
            }
            if snapshot.paused {
                alerts.push(Alert::new(&snapshot.name, AlertReason::QueuePaused, false));
            }
        }

        alerts
    }

    fn performance_pass(&self) -> Vec<Alert> {
        let t = &self.thresholds;
        let mut alerts = Vec::new();

        for (queue, metric) in self.state.performance.all() {
            let Some(ratio) = metric.failure_ratio() else {
                continue;
            };
            if metric.avg_processing_time_ms > t.slow_processing_ms {
                alerts.push(
                    Alert::new(&queue, AlertReason::SlowProcessing, true).with_message(format!(
                        "average processing time {:.0}ms",
                        metric.avg_processing_time_ms
                    )),
                );
            }
            if ratio > t.failure_ratio {
                alerts.push(
                    Alert::new(&queue, AlertReason::HighFailureRate, true)
                        .with_message(format!("failure ratio {:.1}%", ratio * 100.0)),
                );
            }
        }

        alerts
    }
}

#[cfg(test)]
#[path = "alert_engine_tests.rs"]
mod tests;
