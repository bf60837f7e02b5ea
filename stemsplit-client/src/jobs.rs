//! Job-related API endpoints

use crate::StemsplitClient;
use crate::error::Result;
use stemsplit_core::domain::job::Job;
use stemsplit_core::dto::job::{StartJob, StartJobResponse};

impl StemsplitClient {
    /// Start a separation job
    ///
    /// The server acknowledges as soon as the job is registered; use
    /// [`get_job`](Self::get_job) or a [`JobPoller`](crate::JobPoller) to follow it.
    ///
    /// # Example
    /// ```no_run
    /// # use stemsplit_client::StemsplitClient;
    /// # use stemsplit_core::dto::job::StartJob;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = StemsplitClient::new("http://localhost:8080");
    /// let ack = client
    ///     .start_job(&StartJob::new(
    ///         "job_1",
    ///         "https://cdn.example.com/song.mp3",
    ///         vec!["vocals".to_string(), "instrumental".to_string()],
    ///     ))
    ///     .await?;
    /// println!("{} is {}", ack.id, ack.status);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start_job(&self, req: &StartJob) -> Result<StartJobResponse> {
        let url = format!("{}/api/process", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Get the current snapshot of a job
    pub async fn get_job(&self, job_id: &str) -> Result<Job> {
        let url = format!("{}/api/process", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("id", job_id)])
            .send()
            .await?;

        self.handle_response(response).await
    }
}
