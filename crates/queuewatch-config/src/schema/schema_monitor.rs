//! Monitoring configuration types (monitor, thresholds, alerts, recurring jobs).

use serde::{Deserialize, Serialize};

/// Monitor engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Queue names observed from startup.
    #[serde(default)]
    pub queues: Vec<String>,

    /// Events kept per queue.
    #[serde(default = "default_event_log_capacity")]
    pub event_log_capacity: usize,

    /// Alerts kept in the alert log.
    #[serde(default = "default_alert_log_capacity")]
    pub alert_log_capacity: usize,

    /// Capacity of the lifecycle event channel.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Upper bound for a single snapshot query.
    #[serde(default = "default_refresh_timeout_ms")]
    pub refresh_timeout_ms: u64,

    #[serde(default = "default_rollup_interval_secs")]
    pub rollup_interval_secs: u64,

    #[serde(default = "default_alert_interval_secs")]
    pub alert_interval_secs: u64,

    /// Alerts shown on the dashboard.
    #[serde(default = "default_dashboard_alert_count")]
    pub dashboard_alert_count: usize,

    #[serde(default)]
    pub thresholds: ThresholdsConfig,
}

fn default_event_log_capacity() -> usize {
    100
}

fn default_alert_log_capacity() -> usize {
    50
}

fn default_event_channel_capacity() -> usize {
    1024
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_refresh_timeout_ms() -> u64 {
    5000
}

fn default_rollup_interval_secs() -> u64 {
    60
}

fn default_alert_interval_secs() -> u64 {
    10
}

fn default_dashboard_alert_count() -> usize {
    10
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            queues: Vec::new(),
            event_log_capacity: default_event_log_capacity(),
            alert_log_capacity: default_alert_log_capacity(),
            event_channel_capacity: default_event_channel_capacity(),
            refresh_interval_secs: default_refresh_interval_secs(),
            refresh_timeout_ms: default_refresh_timeout_ms(),
            rollup_interval_secs: default_rollup_interval_secs(),
            alert_interval_secs: default_alert_interval_secs(),
            dashboard_alert_count: default_dashboard_alert_count(),
            thresholds: ThresholdsConfig::default(),
        }
    }
}

/// Alert thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Failed count above which a queue raises `high-failure-rate`.
    #[serde(default = "default_failed_count")]
    pub failed_count: u64,

    /// Waiting count above which a queue raises `queue-backlog`.
    #[serde(default = "default_waiting_count")]
    pub waiting_count: u64,

    /// Average processing time above which a queue raises `slow-processing`.
    #[serde(default = "default_slow_processing_ms")]
    pub slow_processing_ms: f64,

    /// Failure ratio above which a queue raises `high-failure-rate`.
    #[serde(default = "default_failure_ratio")]
    pub failure_ratio: f64,

    /// Total failed count above which system health degrades to warning.
    #[serde(default = "default_health_failed_count")]
    pub health_failed_count: u64,
}

fn default_failed_count() -> u64 {
    10
}

fn default_waiting_count() -> u64 {
    100
}

fn default_slow_processing_ms() -> f64 {
    30_000.0
}

fn default_failure_ratio() -> f64 {
    0.2
}

fn default_health_failed_count() -> u64 {
    10
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            failed_count: default_failed_count(),
            waiting_count: default_waiting_count(),
            slow_processing_ms: default_slow_processing_ms(),
            failure_ratio: default_failure_ratio(),
            health_failed_count: default_health_failed_count(),
        }
    }
}

/// Out-of-band alert delivery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Slack incoming webhook URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_webhook: Option<String>,

    /// Generic JSON webhooks.
    #[serde(default)]
    pub webhooks: Vec<String>,
}

/// Recurring job registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringConfig {
    /// Queue holding the repeatable job definitions.
    #[serde(default = "default_recurring_queue")]
    pub queue: String,
}

fn default_recurring_queue() -> String {
    "recurring".to_string()
}

impl Default for RecurringConfig {
    fn default() -> Self {
        Self {
            queue: default_recurring_queue(),
        }
    }
}
