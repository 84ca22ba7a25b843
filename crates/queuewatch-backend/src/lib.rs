//! # queuewatch backend
//!
//! Port to the job queue backend observed by queuewatch.
//!
//! ## Features
//!
//! - `QueueBackend` trait: queue state, lifecycle subscriptions, repeatable jobs
//! - In-memory backend for tests and local runs
//! - HTTP adapter for REST-fronted backends
//! - Cron pattern parsing shared by adapters

pub mod backend;
pub mod error;
pub mod http;
pub mod memory;
pub mod repeat;
pub mod types;

pub use backend::{EventSink, QueueBackend};
pub use error::BackendError;
pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use repeat::{next_run, parse_cron, repeat_key, RepeatOptions, RepeatableJob};
pub use types::{EventKind, JobRecord, LifecycleEvent, QueueCounts, QueueState};
