//! Job API Handlers
//!
//! HTTP endpoints for starting separation jobs and polling their state.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::Deserialize;
use stemsplit_core::domain::job::Job;
use stemsplit_core::dto::job::{StartJob, StartJobResponse};

use crate::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::job_service;

/// POST /api/process
/// Register a job and start processing it in the background
pub async fn start_job(
    State(state): State<AppState>,
    req: Result<Json<StartJob>, JsonRejection>,
) -> ApiResult<Json<StartJobResponse>> {
    let Json(req) = req.map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;

    tracing::info!("Starting job: {:?}", req.id);

    let response = job_service::start_job(&state.registry, &state.orchestrator, req)?;

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct JobStatusQuery {
    #[serde(default, alias = "jobId")]
    pub id: Option<String>,
}

/// GET /api/process?id=<jobId>
/// Get the current snapshot of a job
pub async fn get_job_status(
    State(state): State<AppState>,
    Query(params): Query<JobStatusQuery>,
) -> ApiResult<Json<Job>> {
    let id = params
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Job ID is required".to_string()))?;

    tracing::debug!("Getting job: {}", id);

    let job = job_service::get_job(&state.registry, id.trim())?;

    Ok(Json(job))
}
