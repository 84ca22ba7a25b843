//! Alert channel implementations (Slack, generic webhook).

use async_trait::async_trait;
use tracing::debug;

use crate::error::MonitorError;

use super::alerts::{Alert, AlertChannel};

async fn post_json(
    client: &reqwest::Client,
    channel: &str,
    url: &str,
    payload: &serde_json::Value,
) -> Result<(), MonitorError> {
    let response = client
        .post(url)
        .json(payload)
        .send()
        .await
        .map_err(|e| MonitorError::AlertDelivery(format!("{} request failed: {}", channel, e)))?;

    if response.status().is_success() {
        debug!("{} alert sent successfully", channel);
        Ok(())
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(MonitorError::AlertDelivery(format!(
            "{} webhook returned {}: {}",
            channel, status, body
        )))
    }
}

/// Slack webhook channel.
pub struct SlackChannel {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackChannel {
    /// Create a new Slack channel.
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AlertChannel for SlackChannel {
    fn name(&self) -> &str {
        "slack"
    }

    async fn send(&self, alert: &Alert) -> Result<(), MonitorError> {
        let payload = serde_json::json!({
            "attachments": [{
                "color": alert.severity.color(),
                "title": format!("{} {}", alert.severity.emoji(), alert.reason.title()),
                "text": alert.message.as_deref().unwrap_or_default(),
                "footer": "queuewatch",
                "ts": alert.timestamp.timestamp(),
                "fields": [
                    {"title": "queue", "value": alert.queue, "short": true},
                    {"title": "reason", "value": alert.reason.as_str(), "short": true},
                ]
            }]
        });

        post_json(&self.client, "Slack", &self.webhook_url, &payload).await
    }
}

/// Generic JSON webhook channel. Posts the alert record as-is.
pub struct WebhookChannel {
    url: String,
    client: reqwest::Client,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AlertChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, alert: &Alert) -> Result<(), MonitorError> {
        let payload = serde_json::to_value(alert)
            .map_err(|e| MonitorError::AlertDelivery(e.to_string()))?;
        post_json(&self.client, "Webhook", &self.url, &payload).await
    }
}
