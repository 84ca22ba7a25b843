//! Tests for alert types, channels and manager.

use super::*;
use crate::alert_channels::{SlackChannel, WebhookChannel};
use crate::alert_manager::{AlertDispatcher, AlertManager};
use queuewatch_config::AlertsConfig;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_classify() {
    assert_eq!(AlertSeverity::classify(AlertReason::Failed, true), AlertSeverity::Error);
    assert_eq!(AlertSeverity::classify(AlertReason::Failed, false), AlertSeverity::Warning);
    assert_eq!(AlertSeverity::classify(AlertReason::Stalled, true), AlertSeverity::Warning);
    assert_eq!(AlertSeverity::classify(AlertReason::Error, false), AlertSeverity::Critical);
    assert_eq!(AlertSeverity::classify(AlertReason::Error, true), AlertSeverity::Critical);
    assert_eq!(
        AlertSeverity::classify(AlertReason::HighFailureRate, true),
        AlertSeverity::Warning
    );
    assert_eq!(
        AlertSeverity::classify(AlertReason::QueuePaused, false),
        AlertSeverity::Warning
    );
}

#[test]
fn test_classify_is_total() {
    for reason in AlertReason::ALL {
        for has_error in [true, false] {
            let severity = AlertSeverity::classify(reason, has_error);
            assert!(matches!(
                severity,
                AlertSeverity::Warning | AlertSeverity::Error | AlertSeverity::Critical
            ));
        }
    }
}

#[test]
fn test_alert_new() {
    let alert = Alert::new("email", AlertReason::Failed, true).with_message("SMTP down");
    assert_eq!(alert.queue, "email");
    assert_eq!(alert.severity, AlertSeverity::Error);
    assert_eq!(alert.message.as_deref(), Some("SMTP down"));
}

#[test]
fn test_alert_serde() {
    let alert = Alert::new("email", AlertReason::HighFailureRate, true);
    let json = serde_json::to_value(&alert).unwrap();
    assert_eq!(json["reason"], "high-failure-rate");
    assert_eq!(json["severity"], "warning");
    assert!(json.get("message").is_none());
}

#[test]
fn test_alert_format_text() {
    let alert = Alert::new("email", AlertReason::Error, true).with_message("connection reset");

    let text = alert.format_text();
    assert!(text.contains("[CRITICAL]"));
    assert!(text.contains("Queue error on queue email"));
    assert!(text.contains("connection reset"));
}

#[test]
fn test_alert_format_markdown() {
    let alert = Alert::new("email", AlertReason::Stalled, false);

    let md = alert.format_markdown();
    assert!(md.contains("\u{26a0}\u{fe0f}"));
    assert!(md.contains("**Job stalled**"));
    assert!(md.contains("`email`"));
}

#[test]
fn test_severity_display_and_parse() {
    assert_eq!(AlertSeverity::Warning.to_string(), "WARNING");
    assert_eq!(AlertSeverity::Critical.to_string(), "CRITICAL");
    assert_eq!("critical".parse::<AlertSeverity>().unwrap(), AlertSeverity::Critical);
    assert_eq!("Error".parse::<AlertSeverity>().unwrap(), AlertSeverity::Error);
    assert!("info".parse::<AlertSeverity>().is_err());
}

#[test]
fn test_reason_display_matches_serde() {
    for reason in AlertReason::ALL {
        let json = serde_json::to_string(&reason).unwrap();
        assert_eq!(json, format!("\"{}\"", reason));
    }
}

#[tokio::test]
async fn test_alert_manager_send() {
    let manager = AlertManager::new();
    let alert = Alert::new("email", AlertReason::Failed, false);

    let errors = manager.send(&alert).await;
    assert!(errors.is_empty());
}

#[test]
fn test_alert_manager_from_config() {
    let config = AlertsConfig {
        slack_webhook: Some("https://hooks.slack.com/test".to_string()),
        webhooks: vec!["https://ops.example.com/hook".to_string(), String::new()],
    };

    let manager = AlertManager::from_config(&config);
    assert_eq!(manager.channel_names(), vec!["log", "slack", "webhook"]);
}

#[tokio::test]
async fn test_slack_channel_posts_attachment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/slack"))
        .and(body_partial_json(serde_json::json!({
            "attachments": [{"color": "#800000"}]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let channel = SlackChannel::new(format!("{}/slack", server.uri()));
    let alert = Alert::new("email", AlertReason::Error, true);
    channel.send(&alert).await.unwrap();
}

#[tokio::test]
async fn test_webhook_channel_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500).set_body_string("nope"))
        .mount(&server)
        .await;

    let channel = WebhookChannel::new(format!("{}/hook", server.uri()));
    let alert = Alert::new("email", AlertReason::Error, true);
    let err = channel.send(&alert).await.unwrap_err();
    assert!(matches!(err, MonitorError::AlertDelivery(_)));
}

#[tokio::test]
async fn test_dispatcher_delivers_queued_alerts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(serde_json::json!({"queue": "email", "reason": "error"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut manager = AlertManager::new();
    manager.add_channel(Box::new(WebhookChannel::new(format!("{}/hook", server.uri()))));
    let (notifier, dispatcher) = AlertDispatcher::new(manager, 8);

    let cancel = CancellationToken::new();
    notifier.notify(Alert::new("email", AlertReason::Error, false));
    drop(notifier);

    // Channel closes once the notifier is gone, so the loop ends on its own.
    dispatcher.run(cancel).await;
}
