//! Prometheus-style metrics exposition.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::alerts::AlertSeverity;
use crate::state::MonitorState;

/// Metric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    /// Counter (monotonically increasing).
    Counter,
    /// Gauge (can go up and down).
    Gauge,
}

impl MetricType {
    fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
        }
    }
}

/// Process counters.
#[derive(Debug, Default)]
pub struct MonitorCounters {
    events_ingested: AtomicU64,
    events_rejected: AtomicU64,
    alerts_raised: AtomicU64,
    refresh_failures: AtomicU64,
}

impl MonitorCounters {
    pub fn inc_events_ingested(&self) {
        self.events_ingested.fetch_add(1, Ordering::Relaxed);
    }

    /// Events refused because the ingestion channel was full.
    pub fn inc_events_rejected(&self) {
        self.events_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_alerts_raised(&self) {
        self.alerts_raised.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_refresh_failures(&self) {
        self.refresh_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn events_ingested(&self) -> u64 {
        self.events_ingested.load(Ordering::Relaxed)
    }

    pub fn events_rejected(&self) -> u64 {
        self.events_rejected.load(Ordering::Relaxed)
    }

    pub fn alerts_raised(&self) -> u64 {
        self.alerts_raised.load(Ordering::Relaxed)
    }

    pub fn refresh_failures(&self) -> u64 {
        self.refresh_failures.load(Ordering::Relaxed)
    }
}

struct Exposition {
    output: String,
}

impl Exposition {
    fn header(&mut self, name: &str, metric_type: MetricType, help: &str) {
        let _ = writeln!(self.output, "# HELP {} {}", name, help);
        let _ = writeln!(self.output, "# TYPE {} {}", name, metric_type.as_str());
    }

    fn sample(&mut self, name: &str, labels: &[(&str, &str)], value: impl std::fmt::Display) {
        if labels.is_empty() {
            let _ = writeln!(self.output, "{} {}", name, value);
            return;
        }
        let labels: Vec<String> = labels
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
            .collect();
        let _ = writeln!(self.output, "{}{{{}}} {}", name, labels.join(","), value);
    }
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Render the monitor state in the Prometheus text format.
pub fn render(state: &MonitorState) -> String {
    let mut out = Exposition {
        output: String::new(),
    };
    let snapshots = state.snapshots.all();

    out.header("queuewatch_queue_jobs", MetricType::Gauge, "Jobs per queue and state");
    for snapshot in &snapshots {
        let counts = snapshot.counts;
        for (job_state, value) in [
            ("waiting", counts.waiting),
            ("active", counts.active),
            ("completed", counts.completed),
            ("failed", counts.failed),
            ("delayed", counts.delayed),
        ] {
            out.sample(
                "queuewatch_queue_jobs",
                &[("queue", snapshot.name.as_str()), ("state", job_state)],
                value,
            );
        }
    }

    out.header("queuewatch_queue_paused", MetricType::Gauge, "Whether a queue is paused");
    for snapshot in &snapshots {
        out.sample(
            "queuewatch_queue_paused",
            &[("queue", snapshot.name.as_str())],
            u8::from(snapshot.paused),
        );
    }

    let performance = state.performance.report();
    out.header(
        "queuewatch_processing_time_avg_ms",
        MetricType::Gauge,
        "Average processing time per queue",
    );
    for (queue, metric) in &performance.queues {
        out.sample(
            "queuewatch_processing_time_avg_ms",
            &[("queue", queue.as_str())],
            metric.avg_processing_time_ms,
        );
    }
    out.header(
        "queuewatch_jobs_finished_total",
        MetricType::Counter,
        "Jobs observed finishing, by outcome",
    );
    for (queue, metric) in &performance.queues {
        out.sample(
            "queuewatch_jobs_finished_total",
            &[("queue", queue.as_str()), ("outcome", "completed")],
            metric.completed_count,
        );
        out.sample(
            "queuewatch_jobs_finished_total",
            &[("queue", queue.as_str()), ("outcome", "failed")],
            metric.failed_count,
        );
    }
    out.header(
        "queuewatch_system_processing_time_avg_ms",
        MetricType::Gauge,
        "Mean of the per-queue average processing times",
    );
    out.sample(
        "queuewatch_system_processing_time_avg_ms",
        &[],
        performance.system.avg_processing_time_ms,
    );

    out.header("queuewatch_alerts", MetricType::Gauge, "Alerts in the alert log by severity");
    for severity in [AlertSeverity::Warning, AlertSeverity::Error, AlertSeverity::Critical] {
        let label = severity.to_string().to_lowercase();
        out.sample(
            "queuewatch_alerts",
            &[("severity", label.as_str())],
            state.alerts.count(severity),
        );
    }

    let counters = &state.counters;
    for (name, help, value) in [
        ("queuewatch_events_ingested_total", "Lifecycle events ingested", counters.events_ingested()),
        ("queuewatch_events_rejected_total", "Lifecycle events rejected at the channel", counters.events_rejected()),
        ("queuewatch_alerts_raised_total", "Alerts raised", counters.alerts_raised()),
        ("queuewatch_refresh_failures_total", "Failed snapshot refreshes", counters.refresh_failures()),
    ] {
        out.header(name, MetricType::Counter, help);
        out.sample(name, &[], value);
    }

    out.output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{Alert, AlertReason};
    use crate::event::QueueEvent;
    use queuewatch_backend::EventKind;
    use queuewatch_config::MonitorConfig;

    #[test]
    fn test_counters() {
        let counters = MonitorCounters::default();
        counters.inc_events_ingested();
        counters.inc_events_ingested();
        counters.inc_refresh_failures();
        assert_eq!(counters.events_ingested(), 2);
        assert_eq!(counters.refresh_failures(), 1);
        assert_eq!(counters.alerts_raised(), 0);
    }

    #[test]
    fn test_render() {
        let state = MonitorState::new(&MonitorConfig::default());
        state
            .snapshots
            .record_event(QueueEvent::new("email", EventKind::Waiting, None, None));
        state.performance.record_failure("email");
        state.alerts.push(Alert::new("email", AlertReason::Error, true));
        state.counters.inc_events_ingested();

        let output = render(&state);
        assert!(output.contains("# TYPE queuewatch_queue_jobs gauge"));
        assert!(output.contains("queuewatch_queue_jobs{queue=\"email\",state=\"waiting\"} 1"));
        assert!(output.contains("queuewatch_queue_paused{queue=\"email\"} 0"));
        assert!(output.contains("queuewatch_jobs_finished_total{queue=\"email\",outcome=\"failed\"} 1"));
        assert!(output.contains("queuewatch_alerts{severity=\"critical\"} 1"));
        assert!(output.contains("queuewatch_events_ingested_total 1"));
    }

    #[test]
    fn test_escape_label() {
        assert_eq!(escape_label("a\"b"), "a\\\"b");
        assert_eq!(escape_label("line\nbreak"), "line\\nbreak");
    }
}
