//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod file;
mod job;

pub use job::ProcessArgs;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Upload a local audio or video file
    Upload {
        /// File to upload
        file: PathBuf,

        /// Start separating the uploaded file into these stems (comma separated)
        #[arg(long, value_delimiter = ',')]
        stems: Vec<String>,
    },
    /// Separate a file reachable by URL and wait for the stems
    Process(ProcessArgs),
    /// Show the current state of a job
    Status {
        /// Job ID
        id: String,
    },
    /// List stored files
    Files {
        /// Only files whose key starts with this prefix (e.g. uploads)
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Delete a stored file
    Delete {
        /// URL returned by an upload or a completed job
        url: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Upload { file, stems } => file::upload(config, &file, stems).await,
        Commands::Process(args) => job::process(config, args).await,
        Commands::Status { id } => job::status(config, &id).await,
        Commands::Files { prefix } => file::list(config, prefix.as_deref()).await,
        Commands::Delete { url } => file::delete(config, &url).await,
    }
}
