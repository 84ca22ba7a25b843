//! Alert types and core trait definitions.

#[cfg(test)]
#[path = "alerts_tests.rs"]
mod tests;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::MonitorError;

/// Alert severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Warning.
    Warning,
    /// Error.
    Error,
    /// Critical.
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Warning => write!(f, "WARNING"),
            AlertSeverity::Error => write!(f, "ERROR"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl std::str::FromStr for AlertSeverity {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "warning" => Ok(AlertSeverity::Warning),
            "error" => Ok(AlertSeverity::Error),
            "critical" => Ok(AlertSeverity::Critical),
            other => Err(MonitorError::Validation(format!(
                "unknown severity '{}'",
                other
            ))),
        }
    }
}

impl AlertSeverity {
    /// Severity of an alert raised for `reason`.
    ///
    /// `has_error` tells whether an error message accompanied the trigger.
    pub fn classify(reason: AlertReason, has_error: bool) -> Self {
        match (reason, has_error) {
            (AlertReason::Failed, true) => AlertSeverity::Error,
            (AlertReason::Stalled, _) => AlertSeverity::Warning,
            (AlertReason::Error, _) => AlertSeverity::Critical,
            _ => AlertSeverity::Warning,
        }
    }

    /// Get emoji for severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "\u{26a0}\u{fe0f}",
            AlertSeverity::Error => "\u{274c}",
            AlertSeverity::Critical => "\u{1f6a8}",
        }
    }

    /// Get color for Slack attachments.
    pub fn color(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "#f0ad4e", // yellow
            AlertSeverity::Error => "#d9534f",   // red
            AlertSeverity::Critical => "#800000", // dark red
        }
    }
}

/// What triggered an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertReason {
    Failed,
    Stalled,
    Error,
    HighFailureRate,
    QueueBacklog,
    QueuePaused,
    SlowProcessing,
}

impl AlertReason {
    pub const ALL: [AlertReason; 7] = [
        AlertReason::Failed,
        AlertReason::Stalled,
        AlertReason::Error,
        AlertReason::HighFailureRate,
        AlertReason::QueueBacklog,
        AlertReason::QueuePaused,
        AlertReason::SlowProcessing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertReason::Failed => "failed",
            AlertReason::Stalled => "stalled",
            AlertReason::Error => "error",
            AlertReason::HighFailureRate => "high-failure-rate",
            AlertReason::QueueBacklog => "queue-backlog",
            AlertReason::QueuePaused => "queue-paused",
            AlertReason::SlowProcessing => "slow-processing",
        }
    }

    /// Human-readable headline.
    pub fn title(&self) -> &'static str {
        match self {
            AlertReason::Failed => "Job failed",
            AlertReason::Stalled => "Job stalled",
            AlertReason::Error => "Queue error",
            AlertReason::HighFailureRate => "High failure rate",
            AlertReason::QueueBacklog => "Queue backlog",
            AlertReason::QueuePaused => "Queue paused",
            AlertReason::SlowProcessing => "Slow processing",
        }
    }
}

impl std::fmt::Display for AlertReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alert record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    /// Queue the alert is about.
    pub queue: String,
    pub reason: AlertReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub severity: AlertSeverity,
}

impl Alert {
    /// Create a new alert, classifying its severity.
    pub fn new(queue: impl Into<String>, reason: AlertReason, has_error: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            queue: queue.into(),
            reason,
            message: None,
            timestamp: Utc::now(),
            severity: AlertSeverity::classify(reason, has_error),
        }
    }

    /// Set message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Format for text output.
    pub fn format_text(&self) -> String {
        let mut text = format!(
            "[{}] {} - {} on queue {}",
            self.severity,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.reason.title(),
            self.queue
        );

        if let Some(ref message) = self.message {
            text.push('\n');
            text.push_str(message);
        }

        text
    }

    /// Format for Markdown output.
    pub fn format_markdown(&self) -> String {
        let mut text = format!(
            "{} **{}** on `{}` - {}",
            self.severity.emoji(),
            self.reason.title(),
            self.queue,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );

        if let Some(ref message) = self.message {
            text.push_str(&format!("\n\n{}", message));
        }

        text
    }
}

/// Alert channel trait.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Channel name.
    fn name(&self) -> &str;

    /// Send an alert.
    async fn send(&self, alert: &Alert) -> Result<(), MonitorError>;
}

/// Log channel (writes to tracing).
pub struct LogChannel;

#[async_trait]
impl AlertChannel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, alert: &Alert) -> Result<(), MonitorError> {
        match alert.severity {
            AlertSeverity::Warning => warn!("[ALERT] {}", alert.format_text()),
            AlertSeverity::Error | AlertSeverity::Critical => {
                error!("[ALERT] {}", alert.format_text())
            }
        }
        Ok(())
    }
}
