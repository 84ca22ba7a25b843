//! # queuewatch API
//!
//! HTTP surface over the queue monitor: health, dashboard, queue snapshots,
//! events, performance, alerts, recurring jobs and Prometheus metrics.
//! Backends without a push subscription deliver lifecycle events to
//! `POST /events`.

pub mod error;
pub mod handlers;
pub mod recurring;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use server::{ApiConfig, ApiServer};
pub use state::AppState;
