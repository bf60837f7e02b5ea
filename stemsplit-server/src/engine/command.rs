//! External command engine
//!
//! Runs `<program> [args...] <input> <output-dir> <stems-json>` and reads the
//! structured report from its stdout.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{EngineError, EngineReport, SeparationEngine, parse_report};

/// Maximum number of stderr bytes carried into an error message
const STDERR_TAIL_BYTES: usize = 2048;

/// Separation engine backed by an external program
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandEngine {
    /// Creates a new command engine
    ///
    /// # Arguments
    /// * `program` - Executable to launch (e.g. `python3`)
    /// * `args` - Leading arguments (e.g. the script path)
    /// * `timeout` - Deadline for a single invocation; the child is killed when exceeded
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl SeparationEngine for CommandEngine {
    async fn separate(
        &self,
        input: &Path,
        output_dir: &Path,
        stems: &[String],
    ) -> Result<EngineReport, EngineError> {
        let stems_json = serde_json::to_string(stems)
            .map_err(|e| EngineError::Launch(std::io::Error::other(e)))?;

        debug!(
            "Running separation engine: {} {:?} {} {} {}",
            self.program,
            self.args,
            input.display(),
            output_dir.display(),
            stems_json
        );

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(input)
            .arg(output_dir)
            .arg(&stems_json)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(EngineError::Launch)?;

        // Dropping the future on timeout drops the child, which kills it
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| EngineError::Timeout(self.timeout))?
            .map_err(EngineError::Launch)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        debug!("Separation engine output: {}", stdout.trim());
        if !stderr.trim().is_empty() {
            warn!("Separation engine stderr: {}", stderr.trim());
        }

        // An error report keeps its message whatever the exit status; a success
        // report only counts when the process also exited cleanly
        match parse_report(&stdout) {
            Some(report @ EngineReport::Error { .. }) => Ok(report),
            Some(report) if output.status.success() => {
                Ok(resolve_relative_outputs(report, output_dir))
            }
            None if output.status.success() => Err(EngineError::ResultParse),
            _ => Err(EngineError::Exited {
                status: output.status.to_string(),
                stderr: tail(stderr.trim(), STDERR_TAIL_BYTES).to_string(),
            }),
        }
    }
}

/// Relative output paths are taken relative to the output directory
fn resolve_relative_outputs(report: EngineReport, output_dir: &Path) -> EngineReport {
    match report {
        EngineReport::Success { outputs } => EngineReport::Success {
            outputs: outputs
                .into_iter()
                .map(|mut output| {
                    if output.path.is_relative() {
                        output.path = output_dir.join(&output.path);
                    }
                    output
                })
                .collect(),
        },
        other => other,
    }
}

fn tail(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
