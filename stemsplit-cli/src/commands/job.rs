//! Job command handlers
//!
//! Starting separation jobs, following their progress and showing their state.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use stemsplit_client::JobPoller;
use stemsplit_core::domain::job::{Job, JobStatus, StemResult, generate_job_id};
use stemsplit_core::dto::job::StartJob;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// URL of the source audio or video file
    pub source_url: String,

    /// Stems to extract (comma separated, e.g. vocals,instrumental)
    #[arg(long, value_delimiter = ',', required = true)]
    pub stems: Vec<String>,

    /// Job ID to use (generated when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Milliseconds between status checks
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,

    /// Give up after this many status checks
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Return right after the job is started
    #[arg(long)]
    pub no_wait: bool,
}

/// Start a job and, unless `--no-wait`, follow it to the end
pub async fn process(config: &Config, args: ProcessArgs) -> Result<()> {
    let client = config.client();
    let id = args.id.unwrap_or_else(generate_job_id);
    let req = StartJob::new(id.clone(), args.source_url, args.stems);

    if args.no_wait {
        let ack = client
            .start_job(&req)
            .await
            .context("Failed to start job")?;
        println!("{} Job {} {}", "✓".green(), ack.id.cyan(), ack.message);
        return Ok(());
    }

    let mut poller = JobPoller::new(client).with_interval(Duration::from_millis(args.interval_ms));
    if let Some(max) = args.max_attempts {
        poller = poller.with_max_attempts(max);
    }

    println!("{} Job {}", "▸".cyan(), id.cyan());

    let mut last_progress = None;
    let stems = poller
        .run(req, |job| {
            if last_progress != Some(job.progress) {
                last_progress = Some(job.progress);
                println!("  {} {}", format!("{:>3}%", job.progress).dimmed(), stage(job));
            }
        })
        .await
        .with_context(|| format!("Job {} did not complete", id))?;

    println!("{}", "Separation complete:".bold());
    print_stems(&stems);

    Ok(())
}

/// Get and display a single job
pub async fn status(config: &Config, id: &str) -> Result<()> {
    let job = config
        .client()
        .get_job(id)
        .await
        .with_context(|| format!("Failed to get job {}", id))?;

    print_job_details(&job);

    Ok(())
}

/// Human-readable name of the step a job is in
fn stage(job: &Job) -> &'static str {
    match (job.status, job.progress) {
        (JobStatus::Completed, _) => "completed",
        (JobStatus::Failed, _) => "failed",
        (JobStatus::Processing, 0..10) => "queued",
        (JobStatus::Processing, 10..20) => "downloading source",
        (JobStatus::Processing, 20..80) => "separating",
        (JobStatus::Processing, _) => "uploading stems",
    }
}

/// Print detailed job information
fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:        {}", job.id.cyan());
    println!("  Status:    {}", colorize_status(job.status));
    println!("  Progress:  {}% ({})", job.progress, stage(job));
    println!("  Stems:     {}", job.requested_stems.join(", "));
    println!("  Created:   {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Updated:   {}", job.updated_at.format("%Y-%m-%d %H:%M:%S"));

    if let Some(results) = &job.results {
        println!("\n{}", "Results:".bold());
        print_stems(results);
    }

    if let Some(error) = &job.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }
}

fn print_stems(stems: &[StemResult]) {
    if stems.is_empty() {
        println!("{}", "  No stems were produced.".yellow());
    }
    for stem in stems {
        println!("  {} {:<14} {}", "▸".cyan(), stem.stem, stem.url.dimmed());
    }
}

/// Colorize job status for display
fn colorize_status(status: JobStatus) -> ColoredString {
    match status {
        JobStatus::Processing => status.as_str().cyan(),
        JobStatus::Completed => status.as_str().green(),
        JobStatus::Failed => status.as_str().red(),
    }
}
