//! Job Service
//!
//! Business logic for starting and querying separation jobs.

use std::sync::Arc;
use std::time::Duration;

use stemsplit_core::domain::job::{Job, JobStatus};
use stemsplit_core::dto::job::{StartJob, StartJobResponse};
use thiserror::Error;

use crate::repository::{JobRegistry, RegistryError};
use crate::service::orchestrator::{JobSpec, Orchestrator};

/// Service error type
#[derive(Debug, Error)]
pub enum JobError {
    #[error("{0}")]
    ValidationError(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Register a new job and hand it to the orchestrator
///
/// Returns as soon as the job is visible; processing continues in the
/// background.
pub fn start_job(
    registry: &JobRegistry,
    orchestrator: &Arc<Orchestrator>,
    req: StartJob,
) -> Result<StartJobResponse, JobError> {
    let spec = validate_start(req)?;

    let run = registry.register(&spec.id, spec.requested_stems.clone())?;

    tracing::info!(
        "Job {} registered: {} -> {:?}",
        spec.id,
        spec.source_url,
        spec.requested_stems
    );

    let id = spec.id.clone();
    orchestrator.spawn(spec, run);

    Ok(StartJobResponse {
        id,
        status: JobStatus::Processing,
        message: "Processing started".to_string(),
    })
}

/// Get a job snapshot by ID
pub fn get_job(registry: &JobRegistry, id: &str) -> Result<Job, JobError> {
    Ok(registry.get(id)?)
}

/// Periodically evict terminal jobs older than `ttl`
pub fn spawn_job_sweeper(registry: Arc<JobRegistry>, ttl: Duration) -> tokio::task::JoinHandle<()> {
    // Sweep often enough that a job outlives its TTL by at most ~10%
    let period = (ttl / 10).clamp(Duration::from_secs(1), Duration::from_secs(60));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = registry.evict_expired(ttl);
            if evicted > 0 {
                tracing::debug!("Evicted {} expired job(s), {} remaining", evicted, registry.len());
            }
        }
    })
}

// =============================================================================
// Validation
// =============================================================================

fn validate_start(req: StartJob) -> Result<JobSpec, JobError> {
    let missing = || {
        JobError::ValidationError("Missing required fields: id, sourceUrl, requestedStems".to_string())
    };

    let id = req
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(missing)?;
    let source_url = req
        .source_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(missing)?;
    let requested = req.requested_stems.ok_or_else(missing)?;

    let parsed = reqwest::Url::parse(&source_url)
        .map_err(|e| JobError::ValidationError(format!("Invalid sourceUrl '{}': {}", source_url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(JobError::ValidationError(format!(
            "Invalid sourceUrl '{}': only http and https are supported",
            source_url
        )));
    }

    let mut requested_stems: Vec<String> = Vec::with_capacity(requested.len());
    for stem in requested {
        let stem = stem.trim();
        if stem.is_empty() {
            return Err(JobError::ValidationError(
                "Stem names must not be empty".to_string(),
            ));
        }
        if !requested_stems.iter().any(|s| s.eq_ignore_ascii_case(stem)) {
            requested_stems.push(stem.to_string());
        }
    }
    if requested_stems.is_empty() {
        return Err(JobError::ValidationError(
            "requestedStems must name at least one stem".to_string(),
        ));
    }

    Ok(JobSpec {
        id,
        source_url,
        requested_stems,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str, url: &str, stems: &[&str]) -> StartJob {
        StartJob::new(id, url, stems.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_validate_start_valid() {
        let spec = validate_start(request(
            " job_1 ",
            "https://files.example.com/song.mp3",
            &["vocals", "Vocals", " instrumental"],
        ))
        .unwrap();

        assert_eq!(spec.id, "job_1");
        assert_eq!(spec.source_url, "https://files.example.com/song.mp3");
        assert_eq!(spec.requested_stems, vec!["vocals", "instrumental"]);
    }

    #[test]
    fn test_validate_start_missing_fields() {
        let err = validate_start(StartJob {
            id: Some("job_1".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, JobError::ValidationError(_)));

        assert!(validate_start(request("", "https://x/a.mp3", &["vocals"])).is_err());
        assert!(validate_start(request("job_1", "  ", &["vocals"])).is_err());
    }

    #[test]
    fn test_validate_start_invalid_stems() {
        assert!(validate_start(request("job_1", "https://x/a.mp3", &[])).is_err());
        assert!(validate_start(request("job_1", "https://x/a.mp3", &["vocals", ""])).is_err());
    }

    #[test]
    fn test_validate_start_invalid_url() {
        assert!(validate_start(request("job_1", "not a url", &["vocals"])).is_err());
        assert!(validate_start(request("job_1", "file:///etc/passwd", &["vocals"])).is_err());
    }

    #[test]
    fn test_get_job_unknown() {
        let registry = JobRegistry::new();
        let err = get_job(&registry, "job_missing").unwrap_err();
        assert!(matches!(
            err,
            JobError::Registry(RegistryError::NotFound(id)) if id == "job_missing"
        ));
    }

    #[tokio::test]
    async fn test_sweeper_evicts_terminal_jobs() {
        let registry = Arc::new(JobRegistry::new());
        let run = registry.register("job_1", vec!["vocals".to_string()]).unwrap();
        registry
            .update("job_1", run, crate::repository::JobUpdate::Fail("boom".to_string()))
            .unwrap();
        registry.register("job_2", vec!["vocals".to_string()]).unwrap();

        let sweeper = spawn_job_sweeper(Arc::clone(&registry), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(200)).await;
        sweeper.abort();

        assert!(registry.get("job_1").is_err());
        assert!(registry.get("job_2").is_ok());
    }
}
