//! Upload and stored-file DTOs

use serde::{Deserialize, Serialize};

/// Result of uploading a source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Freshly generated id to start a job with
    pub job_id: String,
    /// Public URL of the stored file
    pub url: String,
    pub filename: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// A file held by the content store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Storage key, e.g. `processed/job_1/vocals.wav`
    pub key: String,
    pub url: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Response of listing stored files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileList {
    pub files: Vec<StoredFile>,
}

/// Request to delete a stored file by its public URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFile {
    pub url: String,
}
