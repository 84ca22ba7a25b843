//! Repeatable (cron-scheduled) job definitions.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Options attached to a repeatable job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatOptions {
    /// IANA timezone the pattern is evaluated in.
    pub tz: Option<String>,
    /// Maximum number of runs.
    pub limit: Option<u64>,
    /// No runs scheduled after this instant.
    pub end_date: Option<DateTime<Utc>>,
}

/// A repeatable job registered on a queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatableJob {
    /// Backend identifier of the definition.
    pub id: String,
    /// Removal key.
    pub key: String,
    /// Job name.
    pub name: String,
    /// Cron pattern as supplied by the caller.
    pub pattern: String,
    /// Payload handed to each run.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Next scheduled run, if any.
    #[serde(default)]
    pub next_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tz: Option<String>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// Maximum number of runs. `Some(0)` never runs.
    #[serde(default)]
    pub limit: Option<u64>,
}

impl RepeatableJob {
    /// Build a definition from a validated pattern.
    ///
    /// Patterns are evaluated in UTC; any other timezone is rejected.
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        data: serde_json::Value,
        options: &RepeatOptions,
    ) -> Result<Self, BackendError> {
        let name = name.into();
        let pattern = pattern.into();
        let schedule = parse_cron(&pattern)?;

        if let Some(tz) = options.tz.as_deref() {
            if !is_utc(tz) {
                return Err(BackendError::InvalidPattern {
                    pattern,
                    reason: format!("unsupported timezone {}, only UTC is supported", tz),
                });
            }
        }

        let next_run = match options.limit {
            Some(0) => None,
            _ => next_run(&schedule, options.end_date),
        };

        Ok(Self {
            id: format!("repeat:{}", uuid::Uuid::new_v4()),
            key: repeat_key(&name, options, &pattern),
            next_run,
            name,
            pattern,
            data,
            tz: options.tz.clone(),
            end_date: options.end_date,
            limit: options.limit,
        })
    }
}

/// Parse a cron pattern.
///
/// Accepts standard 5-field patterns (minute precision) as well as the 6 and 7
/// field forms with seconds and year.
pub fn parse_cron(pattern: &str) -> Result<Schedule, BackendError> {
    let trimmed = pattern.trim();
    let fields = trimmed.split_whitespace().count();

    let normalized = match fields {
        5 => format!("0 {}", trimmed),
        6 | 7 => trimmed.to_string(),
        n => {
            return Err(BackendError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: format!("expected 5 to 7 fields, got {}", n),
            });
        }
    };

    Schedule::from_str(&normalized).map_err(|e| BackendError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Next upcoming run of a schedule, bounded by an optional end date.
pub fn next_run(schedule: &Schedule, end_date: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    let next = schedule.upcoming(Utc).next()?;
    match end_date {
        Some(end) if next > end => None,
        _ => Some(next),
    }
}

fn is_utc(tz: &str) -> bool {
    matches!(tz.to_ascii_uppercase().as_str(), "UTC" | "ETC/UTC" | "Z" | "GMT" | "ETC/GMT")
}

/// Removal key of a repeatable job.
pub fn repeat_key(name: &str, options: &RepeatOptions, pattern: &str) -> String {
    let end = options
        .end_date
        .map(|d| d.timestamp_millis().to_string())
        .unwrap_or_default();
    format!(
        "{}:{}:{}:{}",
        name,
        end,
        options.tz.as_deref().unwrap_or_default(),
        pattern
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Timelike};

    #[test]
    fn test_parse_five_field_pattern() {
        let schedule = parse_cron("0 2 * * *").unwrap();
        let next = schedule.upcoming(Utc).next().unwrap();
        assert_eq!(next.hour(), 2);
        assert_eq!(next.minute(), 0);
    }

    #[test]
    fn test_parse_six_field_pattern() {
        assert!(parse_cron("*/10 * * * * *").is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_cron("not a cron").unwrap_err();
        assert!(matches!(err, BackendError::InvalidPattern { .. }));

        let err = parse_cron("99 * * * *").unwrap_err();
        assert!(matches!(err, BackendError::InvalidPattern { .. }));
    }

    #[test]
    fn test_next_run_respects_end_date() {
        let schedule = parse_cron("0 2 * * *").unwrap();
        let past = Utc::now() - Duration::days(1);
        assert!(next_run(&schedule, Some(past)).is_none());
        assert!(next_run(&schedule, None).is_some());
    }

    #[test]
    fn test_repeat_key_is_stable() {
        let options = RepeatOptions {
            tz: Some("UTC".to_string()),
            ..Default::default()
        };
        let a = repeat_key("nightly", &options, "0 2 * * *");
        let b = repeat_key("nightly", &options, "0 2 * * *");
        assert_eq!(a, b);
        assert!(a.starts_with("nightly:"));
        assert!(a.ends_with("0 2 * * *"));
    }

    #[test]
    fn test_new_repeatable_job() {
        let job = RepeatableJob::new(
            "nightly",
            "0 2 * * *",
            serde_json::json!({"report": true}),
            &RepeatOptions::default(),
        )
        .unwrap();
        assert!(job.id.starts_with("repeat:"));
        assert_eq!(job.name, "nightly");
        assert!(job.next_run.is_some());
    }

    #[test]
    fn test_new_rejects_non_utc_timezone() {
        let options = RepeatOptions {
            tz: Some("Europe/Berlin".to_string()),
            ..Default::default()
        };
        let err = RepeatableJob::new("nightly", "0 2 * * *", serde_json::Value::Null, &options)
            .unwrap_err();
        match err {
            BackendError::InvalidPattern { reason, .. } => assert!(reason.contains("Europe/Berlin")),
            other => panic!("unexpected: {:?}", other),
        }

        let options = RepeatOptions {
            tz: Some("Etc/UTC".to_string()),
            ..Default::default()
        };
        let job =
            RepeatableJob::new("nightly", "0 2 * * *", serde_json::Value::Null, &options).unwrap();
        assert_eq!(job.tz.as_deref(), Some("Etc/UTC"));
        assert!(job.next_run.is_some());
    }

    #[test]
    fn test_new_stores_limit() {
        let options = RepeatOptions {
            limit: Some(3),
            ..Default::default()
        };
        let job =
            RepeatableJob::new("nightly", "0 2 * * *", serde_json::Value::Null, &options).unwrap();
        assert_eq!(job.limit, Some(3));
        assert!(job.next_run.is_some());

        let options = RepeatOptions {
            limit: Some(0),
            ..Default::default()
        };
        let job =
            RepeatableJob::new("nightly", "0 2 * * *", serde_json::Value::Null, &options).unwrap();
        assert_eq!(job.limit, Some(0));
        assert!(job.next_run.is_none());
    }
}
