//! Separation Engine
//!
//! The engine turns one input file into one output file per stem. The server
//! only depends on the [`SeparationEngine`] trait; [`CommandEngine`] runs an
//! external program for it.

mod command;
mod report;

pub use command::CommandEngine;
pub use report::parse_report;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// A file produced for one stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemOutput {
    pub stem: String,
    pub path: PathBuf,
}

/// Outcome reported by an engine that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineReport {
    /// Separation succeeded; one entry per stem actually produced
    Success { outputs: Vec<StemOutput> },
    /// Engine ran but reported a failure
    Error { message: String },
}

/// The engine could not produce a report
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to launch separation engine: {0}")]
    Launch(#[source] std::io::Error),

    #[error("Separation engine exited with {status}: {stderr}")]
    Exited { status: String, stderr: String },

    #[error("Separation engine did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Failed to parse separation result")]
    ResultParse,
}

/// Service trait for audio separation
#[async_trait]
pub trait SeparationEngine: Send + Sync {
    /// Separate `input` into the requested stems, writing files under `output_dir`
    ///
    /// # Arguments
    /// * `input` - Local path of the source file
    /// * `output_dir` - Existing directory the engine may write into
    /// * `stems` - Requested stem names, in request order
    async fn separate(
        &self,
        input: &Path,
        output_dir: &Path,
        stems: &[String],
    ) -> Result<EngineReport, EngineError>;
}
