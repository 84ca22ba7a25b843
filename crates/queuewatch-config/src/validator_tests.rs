use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_invalid_port() {
    let mut config = Config::default();
    config.server.port = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "server.port"));
}

#[test]
fn test_validate_empty_host() {
    let mut config = Config::default();
    config.server.host = String::new();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "server.host"));
}

#[test]
fn test_validate_http_backend_requires_base_url() {
    let mut config = Config::default();
    config.backend.kind = BackendKind::Http;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "backend.base_url"));

    config.backend.base_url = Some("http://localhost:7000".to_string());
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
}

#[test]
fn test_validate_malformed_base_url() {
    let mut config = Config::default();
    config.backend.kind = BackendKind::Http;
    config.backend.base_url = Some("localhost:7000".to_string());

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
}

#[test]
fn test_validate_memory_backend_with_base_url_warns() {
    let mut config = Config::default();
    config.backend.base_url = Some("http://localhost:7000".to_string());

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "backend.base_url"));
}

#[test]
fn test_validate_zero_intervals_and_capacities() {
    let mut config = Config::default();
    config.monitor.refresh_interval_secs = 0;
    config.monitor.alert_interval_secs = 0;
    config.monitor.event_log_capacity = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "monitor.refresh_interval_secs"));
    assert!(result.errors.iter().any(|e| e.path == "monitor.alert_interval_secs"));
    assert!(result.errors.iter().any(|e| e.path == "monitor.event_log_capacity"));
}

#[test]
fn test_validate_failure_ratio_bounds() {
    for ratio in [0.0, -0.1, 1.5, f64::NAN] {
        let mut config = Config::default();
        config.monitor.thresholds.failure_ratio = ratio;
        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid(), "ratio {} should be rejected", ratio);
    }

    let mut config = Config::default();
    config.monitor.thresholds.failure_ratio = 1.0;
    assert!(ConfigValidator::validate(&config).unwrap().is_valid());
}

#[test]
fn test_validate_queue_names() {
    let mut config = Config::default();
    config.monitor.queues = vec!["email".to_string(), "".to_string(), "email".to_string()];

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "monitor.queues[1]"));
    assert!(result.warnings.iter().any(|w| w.path == "monitor.queues[2]"));
}

#[test]
fn test_validate_dashboard_alert_count_warning() {
    let mut config = Config::default();
    config.monitor.dashboard_alert_count = 100;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(!result.warnings.is_empty());
}

#[test]
fn test_validate_alert_webhooks() {
    let mut config = Config::default();
    config.alerts.webhooks = vec![
        "https://hooks.example.com/ops".to_string(),
        "ftp://example.com".to_string(),
    ];
    config.alerts.slack_webhook = Some("https://".to_string());

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "alerts.webhooks[1]"));
    assert!(result.errors.iter().any(|e| e.path == "alerts.slack_webhook"));
    assert!(!result.errors.iter().any(|e| e.path == "alerts.webhooks[0]"));
}

#[test]
fn test_validate_empty_recurring_queue() {
    let mut config = Config::default();
    config.recurring.queue = " ".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "recurring.queue"));
}

#[test]
fn test_validate_multiple_errors() {
    let mut config = Config::default();
    config.server.port = 0;
    config.server.host = String::new();
    config.backend.timeout_ms = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.len() >= 3);
}

#[test]
fn test_validation_result_add_warning() {
    let mut result = ValidationResult::default();
    result.add_warning(ValidationWarning::new("test", "warning"));
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_validate_huge_refresh_interval() {
    let mut config = Config::default();
    config.monitor.refresh_interval_secs = u64::MAX / 10;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(!result
        .errors
        .iter()
        .any(|e| e.path == "monitor.refresh_timeout_ms"));
}
