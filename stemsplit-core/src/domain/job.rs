//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress checkpoints reported while a job is processing
pub mod progress {
    /// Job registered, no work started yet
    pub const REGISTERED: u8 = 0;
    /// Source file is being fetched
    pub const FETCHING: u8 = 10;
    /// Separation engine is running
    pub const SEPARATING: u8 = 20;
    /// Stems are being uploaded to the content store
    pub const UPLOADING: u8 = 80;
    /// Job completed
    pub const DONE: u8 = 100;

    /// All values a job may report, in order
    pub const CHECKPOINTS: [u8; 5] = [REGISTERED, FETCHING, SEPARATING, UPLOADING, DONE];
}

/// Separation job record
///
/// Structure shared between the server (owns it) and clients (poll it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub progress: u8,
    pub requested_stems: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<StemResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Creates a freshly registered job in the `processing` state
    pub fn new(id: impl Into<String>, requested_stems: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            status: JobStatus::Processing,
            progress: progress::REGISTERED,
            requested_stems,
            results: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never change again
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A separated stem and the public URL it was stored at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemResult {
    pub stem: String,
    pub url: String,
}

/// Generate a job id of the form `job_<unix-millis>_<random>`
pub fn generate_job_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("job_{}_{}", Utc::now().timestamp_millis(), &suffix[..7])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_processing_at_zero() {
        let job = Job::new("job_1", vec!["vocals".to_string()]);
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, 0);
        assert!(job.results.is_none());
        assert!(job.error.is_none());
        assert!(!job.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&JobStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let status: JobStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(status, JobStatus::Failed);
    }

    #[test]
    fn test_snapshot_omits_absent_fields() {
        let job = Job::new("job_1", vec!["vocals".to_string(), "drums".to_string()]);
        let value = serde_json::to_value(&job).unwrap();

        assert_eq!(value["status"], "processing");
        assert_eq!(value["requestedStems"][1], "drums");
        assert!(value.get("results").is_none());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_generated_ids_are_prefixed_and_unique() {
        let a = generate_job_id();
        let b = generate_job_id();
        assert!(a.starts_with("job_"));
        assert_eq!(a.split('_').count(), 3);
        assert_ne!(a, b);
    }
}
