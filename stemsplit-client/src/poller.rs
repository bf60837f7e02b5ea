//! Job poller
//!
//! Starts a job and polls its status until it reaches a terminal state.

use std::time::Duration;

use stemsplit_core::domain::job::{Job, JobStatus, StemResult};
use stemsplit_core::dto::job::StartJob;
use tokio::time;
use tracing::{debug, info};

use crate::StemsplitClient;
use crate::error::{ClientError, Result};

/// Time between two status requests unless configured otherwise
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Follows a job from start to completion
#[derive(Debug, Clone)]
pub struct JobPoller {
    client: StemsplitClient,
    interval: Duration,
    max_attempts: Option<u32>,
}

impl JobPoller {
    /// Creates a poller with the default interval and no attempt limit
    pub fn new(client: StemsplitClient) -> Self {
        Self {
            client,
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }

    /// Time between status checks; clamped to at least one millisecond
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Give up with [`ClientError::PollTimeout`] after `attempts` status checks
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Start a job and wait for its stems
    ///
    /// `on_progress` sees every snapshot observed, the terminal one included.
    pub async fn run<F>(&self, req: StartJob, on_progress: F) -> Result<Vec<StemResult>>
    where
        F: FnMut(&Job),
    {
        let ack = self.client.start_job(&req).await?;
        info!("Job {} started", ack.id);

        self.wait(&ack.id, on_progress).await
    }

    /// Wait for an already started job
    pub async fn wait<F>(&self, job_id: &str, mut on_progress: F) -> Result<Vec<StemResult>>
    where
        F: FnMut(&Job),
    {
        // The first status check waits one full interval
        let mut interval = time::interval_at(time::Instant::now() + self.interval, self.interval);
        let mut attempts = 0u32;

        loop {
            if self.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(ClientError::PollTimeout {
                    id: job_id.to_string(),
                    attempts,
                });
            }

            interval.tick().await;
            attempts += 1;

            let job = self.client.get_job(job_id).await?;
            debug!("Job {} is {} ({}%)", job.id, job.status, job.progress);
            on_progress(&job);

            match job.status {
                JobStatus::Processing => continue,
                JobStatus::Completed => {
                    info!("Job {} completed", job.id);
                    return Ok(job.results.unwrap_or_default());
                }
                JobStatus::Failed => {
                    return Err(ClientError::JobFailed {
                        id: job.id,
                        message: job
                            .error
                            .unwrap_or_else(|| "Processing failed".to_string()),
                    });
                }
            }
        }
    }
}
