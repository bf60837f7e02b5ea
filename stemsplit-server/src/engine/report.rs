//! Structured result extraction
//!
//! Engines print progress text mixed with a JSON report such as
//! `{"status": "success", "output_files": {"vocals": "/tmp/x/vocals.wav"}}` or
//! `{"status": "error", "error": "model failed to load"}`. The last top-level
//! JSON object carrying a recognized `status` wins.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use super::{EngineReport, StemOutput};

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum WireReport {
    Success {
        #[serde(default)]
        output_files: BTreeMap<String, PathBuf>,
    },
    Error {
        #[serde(default)]
        error: Option<String>,
    },
}

impl From<WireReport> for EngineReport {
    fn from(wire: WireReport) -> Self {
        match wire {
            WireReport::Success { output_files } => EngineReport::Success {
                outputs: output_files
                    .into_iter()
                    .map(|(stem, path)| StemOutput { stem, path })
                    .collect(),
            },
            WireReport::Error { error } => EngineReport::Error {
                message: error
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Separation engine reported an error".to_string()),
            },
        }
    }
}

/// Find the engine report in `output`
///
/// Returns `None` when no recognizable report is present.
pub fn parse_report(output: &str) -> Option<EngineReport> {
    let mut found = None;
    let mut pos = 0;

    while let Some(offset) = output[pos..].find('{') {
        let start = pos + offset;
        let mut stream =
            serde_json::Deserializer::from_str(&output[start..]).into_iter::<serde_json::Value>();

        match stream.next() {
            Some(Ok(value)) => {
                if value.get("status").is_some() {
                    if let Ok(wire) = serde_json::from_value::<WireReport>(value) {
                        found = Some(wire);
                    }
                }
                // Skip past the whole object so nested objects are not revisited
                pos = start + stream.byte_offset().max(1);
            }
            _ => pos = start + 1,
        }
    }

    found.map(EngineReport::from)
}
