//! Upload API Handlers
//!
//! HTTP endpoints for storing source files, listing and deleting stored files.

use axum::{
    Json,
    extract::{
        Multipart, Query, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
};
use serde::Deserialize;
use stemsplit_core::dto::upload::{DeleteFile, FileList, UploadResponse};

use crate::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::upload_service::{self, UploadError, UploadedFile};

/// Multipart field carrying the file
const FILE_FIELD: &str = "file";

/// POST /api/upload
/// Store a source file and return its public URL with a fresh job id
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let mut multipart =
        multipart.map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e.body_text())))?;

    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        file = Some(UploadedFile {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let file = file.ok_or(UploadError::MissingFile)?;
    tracing::info!("Receiving upload: {} ({} bytes)", file.filename, file.bytes.len());

    let response =
        upload_service::store_upload(state.store.as_ref(), &state.config.uploads_prefix, file)
            .await?;

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct ListFilesQuery {
    #[serde(default)]
    pub prefix: Option<String>,
}

/// GET /api/files?prefix=<keyPrefix>
/// List stored files
pub async fn list_files(
    State(state): State<AppState>,
    Query(params): Query<ListFilesQuery>,
) -> ApiResult<Json<FileList>> {
    let files = upload_service::list_files(state.store.as_ref(), params.prefix.as_deref()).await?;

    tracing::debug!("Listed {} stored file(s)", files.files.len());

    Ok(Json(files))
}

/// DELETE /api/files
/// Delete a stored file by its public URL
pub async fn delete_file(
    State(state): State<AppState>,
    req: Result<Json<DeleteFile>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(req) = req.map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;

    upload_service::delete_file(state.store.as_ref(), &req.url).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(format!("Invalid upload: {}", err.body_text()))
    }
}
