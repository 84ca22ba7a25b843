//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::recurring;
use crate::state::AppState;

/// Create the main router.
///
/// ## Route Structure
///
/// ```text
/// /health                      - System health
/// /dashboard                   - Dashboard aggregate
/// /queues                      - Queue snapshots
/// /queues/{name}               - One queue snapshot
/// /queues/{name}/events        - Recent events of one queue
/// /events                      - GET recent events, POST backend lifecycle event
/// /performance                 - Performance report
/// /performance/{name}          - One queue's performance
/// /alerts                      - GET alerts (?severity=), DELETE clears
/// /recurring-jobs              - GET list, POST register
/// /recurring-jobs/{name}       - DELETE remove
/// /recurring-jobs/pause        - POST pause
/// /recurring-jobs/resume       - POST resume
/// /metrics                     - Prometheus metrics
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    let queue_routes = Router::new()
        .route("/", get(handlers::list_queues))
        .route("/{name}", get(handlers::get_queue))
        .route("/{name}/events", get(handlers::queue_events));

    let recurring_routes = Router::new()
        .route(
            "/",
            get(recurring::list_recurring_jobs).post(recurring::create_recurring_job),
        )
        .route("/pause", post(recurring::pause_recurring))
        .route("/resume", post(recurring::resume_recurring))
        .route(
            "/{name}",
            axum::routing::delete(recurring::delete_recurring_job),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .route("/dashboard", get(handlers::dashboard))
        .route(
            "/events",
            get(handlers::all_events).post(handlers::push_event),
        )
        .route("/performance", get(handlers::performance_report))
        .route("/performance/{name}", get(handlers::queue_performance))
        .route(
            "/alerts",
            get(handlers::list_alerts).delete(handlers::clear_alerts),
        )
        .route("/metrics", get(handlers::prometheus_metrics))
        .nest("/queues", queue_routes)
        .nest("/recurring-jobs", recurring_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
