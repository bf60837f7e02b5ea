//! Job Registry
//!
//! Process-wide in-memory table of separation jobs. The table lock is only held
//! to find or insert a slot; every job carries its own mutex so updates to one
//! job are serialized without blocking reads or writes of other jobs.
//!
//! Contents are lost on restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use stemsplit_core::domain::job::{Job, JobStatus, StemResult, progress};
use thiserror::Error;

/// Identifies the orchestrator run allowed to update a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunToken(u64);

/// A partial update applied atomically to a stored job
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    Progress(u8),
    Complete(Vec<StemResult>),
    Fail(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Job {0} already exists")]
    DuplicateJob(String),

    #[error("Job {0} not found")]
    NotFound(String),

    #[error("Job {0} is owned by another run")]
    StaleRun(String),

    #[error("Job {id} is already {status}")]
    Terminal { id: String, status: JobStatus },

    #[error("Job {id} progress cannot move from {current} to {requested}")]
    ProgressRegression {
        id: String,
        current: u8,
        requested: u8,
    },
}

struct JobSlot {
    run: RunToken,
    job: Mutex<Job>,
}

/// Concurrency-safe store of job state
#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, Arc<JobSlot>>>,
    next_run: AtomicU64,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job in the `processing` state
    ///
    /// The returned token must accompany every update made for this job.
    pub fn register(
        &self,
        id: &str,
        requested_stems: Vec<String>,
    ) -> Result<RunToken, RegistryError> {
        let mut jobs = self.jobs.write();

        if jobs.contains_key(id) {
            return Err(RegistryError::DuplicateJob(id.to_string()));
        }

        let run = RunToken(self.next_run.fetch_add(1, Ordering::Relaxed));
        jobs.insert(
            id.to_string(),
            Arc::new(JobSlot {
                run,
                job: Mutex::new(Job::new(id, requested_stems)),
            }),
        );

        Ok(run)
    }

    /// Current snapshot of a job
    pub fn get(&self, id: &str) -> Result<Job, RegistryError> {
        let slot = self.slot(id)?;
        let job = slot.job.lock().clone();
        Ok(job)
    }

    /// Apply an update on behalf of the run identified by `run`
    ///
    /// Terminal jobs never change again and progress never moves backwards.
    /// Returns the snapshot after the update.
    pub fn update(&self, id: &str, run: RunToken, update: JobUpdate) -> Result<Job, RegistryError> {
        let slot = self.slot(id)?;

        if slot.run != run {
            return Err(RegistryError::StaleRun(id.to_string()));
        }

        let mut job = slot.job.lock();

        if job.is_terminal() {
            return Err(RegistryError::Terminal {
                id: id.to_string(),
                status: job.status,
            });
        }

        match update {
            JobUpdate::Progress(requested) => {
                let requested = requested.min(progress::DONE);
                if requested < job.progress {
                    return Err(RegistryError::ProgressRegression {
                        id: id.to_string(),
                        current: job.progress,
                        requested,
                    });
                }
                job.progress = requested;
            }
            JobUpdate::Complete(results) => {
                job.status = JobStatus::Completed;
                job.progress = progress::DONE;
                job.results = Some(results);
                job.error = None;
            }
            JobUpdate::Fail(message) => {
                let message = if message.trim().is_empty() {
                    "Processing failed".to_string()
                } else {
                    message
                };
                job.status = JobStatus::Failed;
                job.results = None;
                job.error = Some(message);
            }
        }

        job.updated_at = chrono::Utc::now();
        Ok(job.clone())
    }

    /// Remove terminal jobs whose last update is older than `ttl`
    ///
    /// Jobs still processing are kept regardless of age. Returns the number of
    /// evicted jobs.
    pub fn evict_expired(&self, ttl: Duration) -> usize {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return 0;
        };
        let cutoff = chrono::Utc::now() - ttl;

        let mut jobs = self.jobs.write();
        let before = jobs.len();
        jobs.retain(|_, slot| {
            let job = slot.job.lock();
            !(job.is_terminal() && job.updated_at <= cutoff)
        });
        before - jobs.len()
    }

    /// Number of tracked jobs
    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }

    fn slot(&self, id: &str) -> Result<Arc<JobSlot>, RegistryError> {
        self.jobs
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stems(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn result(stem: &str) -> StemResult {
        StemResult {
            stem: stem.to_string(),
            url: format!("https://store/processed/job/{}.wav", stem),
        }
    }

    #[test]
    fn test_register_makes_job_visible() {
        let registry = JobRegistry::new();
        registry.register("job_1", stems(&["vocals"])).unwrap();

        let job = registry.get("job_1").unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, 0);
        assert_eq!(job.requested_stems, stems(&["vocals"]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_duplicate_is_rejected() {
        let registry = JobRegistry::new();
        registry.register("job_1", stems(&["vocals"])).unwrap();

        let err = registry.register("job_1", stems(&["drums"])).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateJob("job_1".to_string()));
        assert_eq!(registry.get("job_1").unwrap().requested_stems, stems(&["vocals"]));
    }

    #[test]
    fn test_unknown_job_is_not_found() {
        let registry = JobRegistry::new();
        assert_eq!(
            registry.get("missing").unwrap_err(),
            RegistryError::NotFound("missing".to_string())
        );

        let run = registry.register("other", stems(&["bass"])).unwrap();
        assert!(matches!(
            registry.update("missing", run, JobUpdate::Progress(10)),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_progress_never_regresses() {
        let registry = JobRegistry::new();
        let run = registry.register("job_1", stems(&["vocals"])).unwrap();

        registry.update("job_1", run, JobUpdate::Progress(20)).unwrap();
        let err = registry
            .update("job_1", run, JobUpdate::Progress(10))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ProgressRegression { current: 20, .. }));
        assert_eq!(registry.get("job_1").unwrap().progress, 20);
    }

    #[test]
    fn test_complete_sets_results_and_full_progress() {
        let registry = JobRegistry::new();
        let run = registry.register("job_1", stems(&["vocals"])).unwrap();

        registry.update("job_1", run, JobUpdate::Progress(80)).unwrap();
        let job = registry
            .update("job_1", run, JobUpdate::Complete(vec![result("vocals")]))
            .unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert_eq!(job.results, Some(vec![result("vocals")]));
        assert!(job.error.is_none());
    }

    #[test]
    fn test_terminal_jobs_are_frozen() {
        let registry = JobRegistry::new();
        let run = registry.register("job_1", stems(&["vocals"])).unwrap();

        registry
            .update("job_1", run, JobUpdate::Fail("boom".to_string()))
            .unwrap();

        let err = registry
            .update("job_1", run, JobUpdate::Complete(vec![result("vocals")]))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Terminal {
                status: JobStatus::Failed,
                ..
            }
        ));

        let job = registry.get("job_1").unwrap();
        assert_eq!(job.error.as_deref(), Some("boom"));
        assert!(job.results.is_none());
    }

    #[test]
    fn test_fail_with_empty_message_gets_default() {
        let registry = JobRegistry::new();
        let run = registry.register("job_1", stems(&["vocals"])).unwrap();

        let job = registry
            .update("job_1", run, JobUpdate::Fail("  ".to_string()))
            .unwrap();
        assert_eq!(job.error.as_deref(), Some("Processing failed"));
    }

    #[test]
    fn test_stale_run_cannot_update_reregistered_job() {
        let registry = JobRegistry::new();
        let old_run = registry.register("job_1", stems(&["vocals"])).unwrap();
        registry
            .update("job_1", old_run, JobUpdate::Fail("first".to_string()))
            .unwrap();

        assert_eq!(registry.evict_expired(Duration::ZERO), 1);
        let new_run = registry.register("job_1", stems(&["drums"])).unwrap();
        assert_ne!(old_run, new_run);

        let err = registry
            .update("job_1", old_run, JobUpdate::Progress(10))
            .unwrap_err();
        assert_eq!(err, RegistryError::StaleRun("job_1".to_string()));
        assert_eq!(registry.get("job_1").unwrap().progress, 0);
    }

    #[test]
    fn test_eviction_keeps_processing_jobs() {
        let registry = JobRegistry::new();
        registry.register("running", stems(&["vocals"])).unwrap();
        let run = registry.register("done", stems(&["vocals"])).unwrap();
        registry
            .update("done", run, JobUpdate::Complete(vec![]))
            .unwrap();

        assert_eq!(registry.evict_expired(Duration::from_secs(3600)), 0);
        assert_eq!(registry.evict_expired(Duration::ZERO), 1);
        assert!(registry.get("running").is_ok());
        assert!(registry.get("done").is_err());
    }

    #[test]
    fn test_concurrent_updates_to_distinct_jobs() {
        let registry = Arc::new(JobRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let id = format!("job_{}", i);
                    let run = registry.register(&id, vec!["vocals".to_string()]).unwrap();
                    for p in progress::CHECKPOINTS {
                        registry.update(&id, run, JobUpdate::Progress(p)).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 8);
        for i in 0..8 {
            assert_eq!(registry.get(&format!("job_{}", i)).unwrap().progress, 100);
        }
    }
}
