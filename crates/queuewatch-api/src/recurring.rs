//! Recurring job route handlers.
//!
//! - GET    /recurring-jobs         - List recurring jobs
//! - POST   /recurring-jobs         - Register a recurring job
//! - DELETE /recurring-jobs/{name}  - Remove a recurring job
//! - POST   /recurring-jobs/pause   - Pause the recurring queue
//! - POST   /recurring-jobs/resume  - Resume the recurring queue

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use queuewatch_backend::RepeatOptions;
use queuewatch_monitor::RecurringJob;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Body of a registration request.
#[derive(Debug, Deserialize)]
pub struct CreateRecurringJob {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub options: RepeatOptions,
}

#[derive(Debug, Serialize)]
pub struct RecurringJobListResponse {
    pub count: usize,
    pub jobs: Vec<RecurringJob>,
}

/// GET /recurring-jobs
pub async fn list_recurring_jobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RecurringJobListResponse>, ApiError> {
    let jobs = state.facade.recurring_jobs().await?;
    Ok(Json(RecurringJobListResponse {
        count: jobs.len(),
        jobs,
    }))
}

/// POST /recurring-jobs
pub async fn create_recurring_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRecurringJob>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state
        .facade
        .registry()
        .add(&request.name, request.data, &request.pattern, request.options)
        .await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// DELETE /recurring-jobs/{name}
pub async fn delete_recurring_job(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.facade.registry().remove(&name).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Recurring job '{}'", name)))
    }
}

/// POST /recurring-jobs/pause
pub async fn pause_recurring(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let registry = state.facade.registry();
    registry.pause().await?;
    Ok(Json(serde_json::json!({"queue": registry.queue(), "paused": true})))
}

/// POST /recurring-jobs/resume
pub async fn resume_recurring(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let registry = state.facade.registry();
    registry.resume().await?;
    Ok(Json(serde_json::json!({"queue": registry.queue(), "paused": false})))
}
