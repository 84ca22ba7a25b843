//! Monitoring query handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use queuewatch_backend::LifecycleEvent;
use queuewatch_monitor::{AlertSeverity, QueueEvent, QueueSnapshot};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_EVENT_LIMIT: usize = 50;

/// Query string for event listings.
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub limit: Option<usize>,
}

impl EventsQuery {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_EVENT_LIMIT)
    }
}

/// Query string for alert listings.
#[derive(Debug, Default, Deserialize)]
pub struct AlertsQuery {
    pub severity: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueueListResponse {
    pub count: usize,
    pub queues: Vec<QueueSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub count: usize,
    pub events: Vec<QueueEvent>,
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.facade.system_health())
}

/// GET /dashboard
pub async fn dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.facade.dashboard().await)
}

/// GET /queues
pub async fn list_queues(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let queues = state.facade.queues();
    Json(QueueListResponse {
        count: queues.len(),
        queues,
    })
}

/// GET /queues/{name}
pub async fn get_queue(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<QueueSnapshot>, ApiError> {
    state
        .facade
        .queue_status(&name)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Queue '{}'", name)))
}

/// GET /queues/{name}/events
pub async fn queue_events(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventListResponse>, ApiError> {
    let events = state
        .facade
        .events(Some(&name), query.limit())
        .ok_or_else(|| ApiError::NotFound(format!("Queue '{}'", name)))?;
    Ok(Json(EventListResponse {
        count: events.len(),
        events,
    }))
}

/// GET /events
pub async fn all_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> impl IntoResponse {
    let events = state.facade.events(None, query.limit()).unwrap_or_default();
    Json(EventListResponse {
        count: events.len(),
        events,
    })
}

/// POST /events
///
/// Lifecycle events pushed by a queue backend.
pub async fn push_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<LifecycleEvent>,
) -> Result<impl IntoResponse, ApiError> {
    debug!("Received {} event for queue {}", event.kind, event.queue);

    match state.events.try_send(event) {
        Ok(()) => Ok((StatusCode::ACCEPTED, Json(serde_json::json!({"accepted": true})))),
        Err(TrySendError::Full(event)) => {
            state.facade.state().counters.inc_events_rejected();
            warn!("Ingestion channel full, rejected event for queue {}", event.queue);
            Err(ApiError::Saturated)
        }
        Err(TrySendError::Closed(_)) => {
            state.facade.state().counters.inc_events_rejected();
            Err(ApiError::Saturated)
        }
    }
}

/// GET /performance
pub async fn performance_report(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.facade.performance_report())
}

/// GET /performance/{name}
pub async fn queue_performance(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .facade
        .performance_metric(&name)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Performance data for '{}'", name)))
}

/// GET /alerts?severity=
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AlertsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let severity = query
        .severity
        .as_deref()
        .map(str::parse::<AlertSeverity>)
        .transpose()?;

    let alerts = state.facade.alerts(severity);
    Ok(Json(serde_json::json!({
        "count": alerts.len(),
        "alerts": alerts,
    })))
}

/// DELETE /alerts
pub async fn clear_alerts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.facade.clear_alerts();
    info!("Alert log cleared");
    StatusCode::NO_CONTENT
}

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.facade.metrics_text(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_query_default_limit() {
        assert_eq!(EventsQuery::default().limit(), DEFAULT_EVENT_LIMIT);
        assert_eq!(EventsQuery { limit: Some(5) }.limit(), 5);
    }
}
