//! Job DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::JobStatus;

/// Request to start a separation job
///
/// Every field is optional on the wire so that the server can reject an
/// incomplete request with a readable message instead of a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJob {
    #[serde(default, alias = "jobId", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "fileUrl", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, alias = "stems", skip_serializing_if = "Option::is_none")]
    pub requested_stems: Option<Vec<String>>,
}

impl StartJob {
    pub fn new(
        id: impl Into<String>,
        source_url: impl Into<String>,
        requested_stems: Vec<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            source_url: Some(source_url.into()),
            requested_stems: Some(requested_stems),
        }
    }
}

/// Immediate acknowledgement of a started job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartJobResponse {
    #[serde(alias = "jobId")]
    pub id: String,
    pub status: JobStatus,
    pub message: String,
}
