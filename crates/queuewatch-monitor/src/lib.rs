//! # queuewatch monitor
//!
//! Monitoring and alerting over a set of job queues.
//!
//! ## Features
//!
//! - Per-queue snapshots fed by lifecycle events and periodic backend refreshes
//! - Processing-time aggregation per queue and system-wide
//! - Reactive and threshold-based alerts with Slack/webhook delivery
//! - Recurring (cron) job registry
//! - Dashboard and health queries, Prometheus exposition

pub mod alert_channels;
pub mod alert_engine;
pub mod alert_manager;
pub mod alerts;
pub mod bounded;
pub mod error;
pub mod event;
pub mod facade;
pub mod health;
pub mod ingest;
pub mod metrics;
pub mod monitor;
pub mod performance;
pub mod refresher;
pub mod registry;
pub mod snapshot;
pub mod state;

pub use alert_channels::{SlackChannel, WebhookChannel};
pub use alert_engine::AlertEngine;
pub use alert_manager::{AlertDispatcher, AlertManager, AlertNotifier};
pub use alerts::{Alert, AlertChannel, AlertReason, AlertSeverity, LogChannel};
pub use bounded::BoundedLog;
pub use error::MonitorError;
pub use event::QueueEvent;
pub use facade::{Dashboard, QueryFacade};
pub use health::{HealthStatus, SystemHealth};
pub use ingest::EventIngestor;
pub use monitor::{Monitor, MonitorHandle};
pub use performance::{PerformanceAggregator, PerformanceMetric, PerformanceReport, SystemPerformance};
pub use refresher::{RefreshReport, SnapshotRefresher};
pub use registry::{RecurringJob, RecurringJobRegistry};
pub use snapshot::{QueueSnapshot, SnapshotStore};
pub use state::{AlertLog, MonitorState, QueueRegistry};
