//! File command handlers

use std::path::Path;

use anyhow::{Context, Result};
use colored::*;

use super::job::{self, ProcessArgs};
use crate::config::Config;

/// Upload a file, optionally starting separation right away
pub async fn upload(config: &Config, file: &Path, stems: Vec<String>) -> Result<()> {
    let uploaded = config
        .client()
        .upload_file(file)
        .await
        .with_context(|| format!("Failed to upload {}", file.display()))?;

    println!("{} Uploaded {}", "✓".green(), uploaded.filename.bold());
    println!("  URL:    {}", uploaded.url.cyan());
    println!("  Type:   {}", uploaded.content_type);
    println!("  Size:   {} bytes", uploaded.size);
    println!("  Job ID: {}", uploaded.job_id.dimmed());

    if stems.is_empty() {
        return Ok(());
    }

    println!();
    job::process(
        config,
        ProcessArgs {
            source_url: uploaded.url,
            stems,
            id: Some(uploaded.job_id),
            interval_ms: 1000,
            max_attempts: None,
            no_wait: false,
        },
    )
    .await
}

/// List stored files
pub async fn list(config: &Config, prefix: Option<&str>) -> Result<()> {
    let listing = config
        .client()
        .list_files(prefix)
        .await
        .context("Failed to list files")?;

    if listing.files.is_empty() {
        println!("{}", "No stored files".dimmed());
        return Ok(());
    }

    for file in &listing.files {
        println!(
            "{}  {}  {}",
            format_size(file.size).bold(),
            file.content_type.dimmed(),
            file.url.cyan()
        );
    }
    println!("\n{} file(s)", listing.files.len());
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{:>7} {}", bytes, UNITS[0])
    } else {
        format!("{:>7.1} {}", value, UNITS[unit])
    }
}

/// Delete a stored file
pub async fn delete(config: &Config, url: &str) -> Result<()> {
    config
        .client()
        .delete_file(url)
        .await
        .with_context(|| format!("Failed to delete {}", url))?;

    println!("{} Deleted {}", "✓".green(), url.dimmed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "    512 B");
        assert_eq!(format_size(2048), "    2.0 KiB");
        assert_eq!(format_size(5 * 1024 * 1024 + 512 * 1024), "    5.5 MiB");
    }
}
