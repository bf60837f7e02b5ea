//! API Module
//!
//! HTTP API layer of the separation server.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod job;
pub mod upload;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let files = ServeDir::new(&state.config.storage_dir);
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Job endpoints
        .route(
            "/api/process",
            post(job::start_job).get(job::get_job_status),
        )
        // File endpoints
        .route(
            "/api/upload",
            post(upload::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/files",
            get(upload::list_files).delete(upload::delete_file),
        )
        // Stored objects of the local content store
        .nest_service("/files", files)
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
