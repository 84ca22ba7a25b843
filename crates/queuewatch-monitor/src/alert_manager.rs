//! Out-of-band alert delivery.
//!
//! Critical alerts are queued on a channel by [`AlertNotifier`] and delivered
//! by [`AlertDispatcher`] to every configured [`AlertChannel`]. Delivery never
//! blocks alert evaluation and failures are only logged.

use queuewatch_config::AlertsConfig;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::MonitorError;

use super::alert_channels::{SlackChannel, WebhookChannel};
use super::alerts::{Alert, AlertChannel, LogChannel};

/// Alert manager.
pub struct AlertManager {
    channels: Vec<Box<dyn AlertChannel>>,
}

impl AlertManager {
    /// Create a new alert manager.
    pub fn new() -> Self {
        Self {
            channels: vec![Box::new(LogChannel)],
        }
    }

    /// Create from config.
    pub fn from_config(config: &AlertsConfig) -> Self {
        let mut manager = Self::new();

        if let Some(ref webhook_url) = config.slack_webhook {
            if !webhook_url.is_empty() {
                info!("Adding Slack alert channel");
                manager.add_channel(Box::new(SlackChannel::new(webhook_url)));
            }
        }

        for url in config.webhooks.iter().filter(|u| !u.is_empty()) {
            info!("Adding webhook alert channel {}", url);
            manager.add_channel(Box::new(WebhookChannel::new(url)));
        }

        manager
    }

    /// Add a channel.
    pub fn add_channel(&mut self, channel: Box<dyn AlertChannel>) {
        self.channels.push(channel);
    }

    /// Get list of channel names.
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Send an alert to all channels.
    pub async fn send(&self, alert: &Alert) -> Vec<MonitorError> {
        let mut errors = Vec::new();

        for channel in &self.channels {
            if let Err(e) = channel.send(alert).await {
                error!("Failed to send alert via {}: {}", channel.name(), e);
                errors.push(e);
            }
        }

        errors
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending half of the notification channel.
#[derive(Clone)]
pub struct AlertNotifier {
    tx: mpsc::Sender<Alert>,
}

impl AlertNotifier {
    /// Queue an alert for delivery. Drops it with a warning when the queue is full.
    pub fn notify(&self, alert: Alert) {
        if let Err(e) = self.tx.try_send(alert) {
            warn!("Alert notification dropped: {}", e);
        }
    }
}

/// Drains queued alerts into an [`AlertManager`].
pub struct AlertDispatcher {
    manager: AlertManager,
    rx: mpsc::Receiver<Alert>,
}

impl AlertDispatcher {
    /// Create a dispatcher and its notifier.
    pub fn new(manager: AlertManager, capacity: usize) -> (AlertNotifier, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (AlertNotifier { tx }, Self { manager, rx })
    }

    /// Deliver alerts until cancelled or every notifier is dropped.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            "Alert dispatcher started (channels: {:?})",
            self.manager.channel_names()
        );

        loop {
            tokio::select! {
                alert = self.rx.recv() => {
                    match alert {
                        Some(alert) => {
                            self.manager.send(&alert).await;
                        }
                        None => break,
                    }
                }
                _ = cancel.cancelled() => {
                    info!("Alert dispatcher shutting down");
                    break;
                }
            }
        }
    }
}
