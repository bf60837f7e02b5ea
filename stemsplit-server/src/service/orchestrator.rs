//! Separation Orchestrator
//!
//! Drives one job from `processing` to `completed` or `failed`:
//! - fetch the source file into a scratch directory (progress 10)
//! - run the separation engine (progress 20)
//! - upload every produced stem to the content store (progress 80)
//! - attach the results (progress 100)
//!
//! The run happens on a detached task. Every error, panics included, ends in a
//! terminal `failed` update, and the scratch directory is removed on every path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::join_all;
use stemsplit_core::domain::job::{StemResult, progress};
use stemsplit_core::domain::media::MediaKind;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::engine::{EngineError, EngineReport, SeparationEngine, StemOutput};
use crate::repository::{JobRegistry, JobUpdate, RegistryError, RunToken};
use crate::store::{ContentStore, StoreError, key_segment};

/// Everything needed to process one registered job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub id: String,
    pub source_url: String,
    pub requested_stems: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Directory per-job scratch directories are created in
    pub scratch_dir: PathBuf,
    /// Key prefix for separated stems
    pub processed_prefix: String,
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Failed to fetch source file: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Scratch storage error: {0}")]
    Scratch(#[from] std::io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Message reported by the engine itself, kept verbatim
    #[error("{0}")]
    EngineReported(String),

    #[error("Failed to read output for stem '{stem}': {source}")]
    ReadOutput {
        stem: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to upload stem '{stem}': {source}")]
    Upload {
        stem: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub struct Orchestrator {
    registry: Arc<JobRegistry>,
    engine: Arc<dyn SeparationEngine>,
    store: Arc<dyn ContentStore>,
    http: reqwest::Client,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<JobRegistry>,
        engine: Arc<dyn SeparationEngine>,
        store: Arc<dyn ContentStore>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            registry,
            engine,
            store,
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Launch processing of a registered job on a detached task
    ///
    /// The returned handle may be dropped; the task keeps running.
    pub fn spawn(self: &Arc<Self>, spec: JobSpec, run: RunToken) -> tokio::task::JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.supervise(spec, run).await })
    }

    /// Run the job on its own task and record the terminal state
    async fn supervise(self: Arc<Self>, spec: JobSpec, run: RunToken) {
        let id = spec.id.clone();

        // A panic inside the worker surfaces here as a JoinError
        let worker = {
            let this = Arc::clone(&self);
            tokio::spawn(async move { this.run(&spec, run).await })
        };

        let update = match worker.await {
            Ok(Ok(results)) => {
                info!("Job {} completed with {} stem(s)", id, results.len());
                JobUpdate::Complete(results)
            }
            Ok(Err(e)) => {
                error!("Job {} failed: {}", id, e);
                JobUpdate::Fail(e.to_string())
            }
            Err(e) => {
                error!("Job {} processing task aborted: {}", id, e);
                JobUpdate::Fail(format!("Processing task aborted: {}", e))
            }
        };

        if let Err(e) = self.registry.update(&id, run, update) {
            warn!("Failed to record final state for job {}: {}", id, e);
        }
    }

    async fn run(&self, spec: &JobSpec, run: RunToken) -> Result<Vec<StemResult>, OrchestratorError> {
        tokio::fs::create_dir_all(&self.settings.scratch_dir).await?;
        let scratch = tempfile::Builder::new()
            .prefix(&format!("{}-", key_segment(&spec.id)))
            .tempdir_in(&self.settings.scratch_dir)?;

        let result = self.process(spec, run, scratch.path()).await;

        let scratch_path = scratch.path().to_path_buf();
        match scratch.close() {
            Ok(()) => debug!("Removed scratch directory {}", scratch_path.display()),
            Err(e) => warn!(
                "Failed to remove scratch directory {}: {}",
                scratch_path.display(),
                e
            ),
        }

        result
    }

    async fn process(
        &self,
        spec: &JobSpec,
        run: RunToken,
        scratch: &Path,
    ) -> Result<Vec<StemResult>, OrchestratorError> {
        self.advance(spec, run, progress::FETCHING)?;
        let input = self.fetch_source(&spec.source_url, scratch).await?;

        self.advance(spec, run, progress::SEPARATING)?;
        let output_dir = scratch.join("output");
        tokio::fs::create_dir_all(&output_dir).await?;

        info!("Job {}: separating {:?}", spec.id, spec.requested_stems);
        let outputs = match self
            .engine
            .separate(&input, &output_dir, &spec.requested_stems)
            .await?
        {
            EngineReport::Success { outputs } => outputs,
            EngineReport::Error { message } => {
                return Err(OrchestratorError::EngineReported(message));
            }
        };

        self.advance(spec, run, progress::UPLOADING)?;
        let outputs = order_outputs(outputs, &spec.requested_stems);
        self.upload_stems(&spec.id, outputs).await
    }

    fn advance(&self, spec: &JobSpec, run: RunToken, value: u8) -> Result<(), OrchestratorError> {
        self.registry
            .update(&spec.id, run, JobUpdate::Progress(value))?;
        debug!("Job {} progress: {}%", spec.id, value);
        Ok(())
    }

    async fn fetch_source(&self, url: &str, scratch: &Path) -> Result<PathBuf, OrchestratorError> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        let path = scratch.join(format!("input.{}", source_extension(url)));
        tokio::fs::write(&path, &bytes).await?;

        debug!("Fetched {} ({} bytes) into {}", url, bytes.len(), path.display());
        Ok(path)
    }

    /// Upload all stems concurrently; on any failure the stems already stored
    /// are deleted again and the first error is returned
    async fn upload_stems(
        &self,
        job_id: &str,
        outputs: Vec<StemOutput>,
    ) -> Result<Vec<StemResult>, OrchestratorError> {
        let uploads = outputs
            .into_iter()
            .map(|output| self.upload_stem(job_id, output));
        let outcomes = join_all(uploads).await;

        if outcomes.iter().all(Result::is_ok) {
            return Ok(outcomes.into_iter().filter_map(Result::ok).collect());
        }

        let mut first_error = None;
        for outcome in outcomes {
            match outcome {
                Ok(stored) => {
                    if let Err(e) = self.store.delete(&stored.url).await {
                        warn!("Failed to remove orphaned stem {}: {}", stored.url, e);
                    }
                }
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(Vec::new()),
        }
    }

    async fn upload_stem(
        &self,
        job_id: &str,
        output: StemOutput,
    ) -> Result<StemResult, OrchestratorError> {
        let bytes = tokio::fs::read(&output.path)
            .await
            .map_err(|source| OrchestratorError::ReadOutput {
                stem: output.stem.clone(),
                source,
            })?;

        let ext = output
            .path
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "wav".to_string());
        let content_type = MediaKind::from_extension(&ext)
            .map(MediaKind::mime)
            .unwrap_or("application/octet-stream");

        let key = format!(
            "{}/{}/{}.{}",
            self.settings.processed_prefix,
            key_segment(job_id),
            key_segment(&output.stem),
            key_segment(&ext)
        );

        let object = self
            .store
            .put(&key, bytes, content_type)
            .await
            .map_err(|source| OrchestratorError::Upload {
                stem: output.stem.clone(),
                source,
            })?;

        Ok(StemResult {
            stem: output.stem,
            url: object.url,
        })
    }
}

/// Order engine outputs by the request: requested stems first in request order,
/// then any other stem the engine produced in the order it reported them
///
/// Stem names match case-insensitively. Nothing the engine produced is dropped.
fn order_outputs(outputs: Vec<StemOutput>, requested: &[String]) -> Vec<StemOutput> {
    let mut ranked: Vec<(usize, StemOutput)> = outputs
        .into_iter()
        .map(|output| {
            let rank = requested
                .iter()
                .position(|r| r.eq_ignore_ascii_case(&output.stem))
                .unwrap_or_else(|| {
                    debug!("Engine produced unrequested stem '{}'", output.stem);
                    requested.len()
                });
            (rank, output)
        })
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, output)| output).collect()
}

/// Extension for the downloaded input, taken from the URL path when it names a
/// recognized media kind
fn source_extension(url: &str) -> &'static str {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .and_then(|name| {
            name.rsplit_once('.')
                .and_then(|(_, ext)| MediaKind::from_extension(ext))
        })
        .map(MediaKind::extension)
        .unwrap_or("mp3")
}
