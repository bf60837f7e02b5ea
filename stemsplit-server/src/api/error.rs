//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::repository::RegistryError;
use crate::service::job_service::JobError;
use crate::service::upload_service::UploadError;
use crate::store::StoreError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    PayloadTooLarge(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::ValidationError(msg) => ApiError::BadRequest(msg),
            JobError::Registry(err @ RegistryError::DuplicateJob(_)) => {
                ApiError::Conflict(err.to_string())
            }
            JobError::Registry(err @ RegistryError::NotFound(_)) => {
                ApiError::NotFound(err.to_string())
            }
            JobError::Registry(err) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingFile
            | UploadError::MissingUrl
            | UploadError::UnsupportedMediaKind(_) => ApiError::BadRequest(err.to_string()),
            UploadError::Store(StoreError::NotFound(url)) => {
                ApiError::NotFound(format!("File not found: {}", url))
            }
            UploadError::Store(err @ (StoreError::ForeignUrl(_) | StoreError::InvalidKey(_))) => {
                ApiError::BadRequest(err.to_string())
            }
            UploadError::Store(err @ StoreError::Io(_)) => ApiError::InternalError(err.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_errors_map_to_status_codes() {
        let status = |err: JobError| ApiError::from(err).into_response().status();

        assert_eq!(
            status(JobError::ValidationError("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(RegistryError::DuplicateJob("job_1".to_string()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(RegistryError::NotFound("job_1".to_string()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(RegistryError::StaleRun("job_1".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upload_errors_map_to_status_codes() {
        let status = |err: UploadError| ApiError::from(err).into_response().status();

        assert_eq!(status(UploadError::MissingFile), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(UploadError::UnsupportedMediaKind("text/plain".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(StoreError::NotFound("u".to_string()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(StoreError::ForeignUrl("u".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
    }
}
