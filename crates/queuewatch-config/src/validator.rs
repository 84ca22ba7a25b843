//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{BackendKind, Config};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_backend(config, &mut result);
        Self::validate_monitor(config, &mut result);
        Self::validate_thresholds(config, &mut result);
        Self::validate_alerts(config, &mut result);

        if config.recurring.queue.trim().is_empty() {
            result.add_error(ValidationError::new(
                "recurring.queue",
                "Recurring queue name cannot be empty",
            ));
        }

        Ok(result)
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new(
                "server.host",
                "Host cannot be empty",
            ));
        }
    }

    fn validate_backend(config: &Config, result: &mut ValidationResult) {
        let backend = &config.backend;

        match (&backend.kind, &backend.base_url) {
            (BackendKind::Http, None) => {
                result.add_error(ValidationError::new(
                    "backend.base_url",
                    "base_url is required for the http backend",
                ));
            }
            (BackendKind::Memory, Some(_)) => {
                result.add_warning(ValidationWarning::new(
                    "backend.base_url",
                    "base_url is ignored by the memory backend",
                ));
            }
            _ => {}
        }

        if let Some(ref url) = backend.base_url {
            Self::check_url("backend.base_url", url, result);
        }

        if backend.timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "backend.timeout_ms",
                "timeout_ms must be greater than 0",
            ));
        }
    }

    fn validate_monitor(config: &Config, result: &mut ValidationResult) {
        let monitor = &config.monitor;

        let positive = [
            ("monitor.event_log_capacity", monitor.event_log_capacity as u64),
            ("monitor.alert_log_capacity", monitor.alert_log_capacity as u64),
            ("monitor.event_channel_capacity", monitor.event_channel_capacity as u64),
            ("monitor.refresh_interval_secs", monitor.refresh_interval_secs),
            ("monitor.refresh_timeout_ms", monitor.refresh_timeout_ms),
            ("monitor.rollup_interval_secs", monitor.rollup_interval_secs),
            ("monitor.alert_interval_secs", monitor.alert_interval_secs),
        ];
        for (path, value) in positive {
            if value == 0 {
                result.add_error(ValidationError::new(path, "must be greater than 0"));
            }
        }

        for (i, name) in monitor.queues.iter().enumerate() {
            if name.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("monitor.queues[{}]", i),
                    "Queue name cannot be empty",
                ));
            } else if monitor.queues[..i].contains(name) {
                result.add_warning(ValidationWarning::new(
                    format!("monitor.queues[{}]", i),
                    format!("Queue '{}' is listed more than once", name),
                ));
            }
        }

        if monitor.dashboard_alert_count > monitor.alert_log_capacity {
            result.add_warning(ValidationWarning::new(
                "monitor.dashboard_alert_count",
                "dashboard_alert_count exceeds alert_log_capacity",
            ));
        }

        if monitor.refresh_timeout_ms > monitor.refresh_interval_secs.saturating_mul(1000) {
            result.add_warning(ValidationWarning::new(
                "monitor.refresh_timeout_ms",
                "refresh timeout is longer than the refresh interval",
            ));
        }
    }

    fn validate_thresholds(config: &Config, result: &mut ValidationResult) {
        let thresholds = &config.monitor.thresholds;

        if !(thresholds.failure_ratio > 0.0 && thresholds.failure_ratio <= 1.0) {
            result.add_error(ValidationError::new(
                "monitor.thresholds.failure_ratio",
                "failure_ratio must be in (0, 1]",
            ));
        }

        if !(thresholds.slow_processing_ms > 0.0) {
            result.add_error(ValidationError::new(
                "monitor.thresholds.slow_processing_ms",
                "slow_processing_ms must be greater than 0",
            ));
        }
    }

    fn validate_alerts(config: &Config, result: &mut ValidationResult) {
        if let Some(ref url) = config.alerts.slack_webhook {
            Self::check_url("alerts.slack_webhook", url, result);
        }

        for (i, url) in config.alerts.webhooks.iter().enumerate() {
            Self::check_url(&format!("alerts.webhooks[{}]", i), url, result);
        }
    }

    fn check_url(path: &str, url: &str, result: &mut ValidationResult) {
        let rest = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"));
        match rest {
            Some(host) if !host.is_empty() => {}
            _ => result.add_error(ValidationError::new(
                path,
                "URL must start with http:// or https:// and name a host",
            )),
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
