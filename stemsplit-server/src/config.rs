//! Server configuration
//!
//! Every setting has a default so the server starts with an empty environment.
//! Values are read from environment variables by [`Config::from_env`].

use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP listener binds to
    pub bind_addr: String,

    /// Base URL clients reach this server at, used to build stored file URLs
    pub public_url: String,

    /// Root directory of the local content store
    pub storage_dir: PathBuf,

    /// Directory per-job scratch directories are created in
    pub scratch_dir: PathBuf,

    /// Program launched to separate audio
    pub engine_program: String,

    /// Arguments placed before `<input> <output-dir> <stems-json>`
    pub engine_args: Vec<String>,

    /// Deadline for a single engine invocation
    pub engine_timeout: Duration,

    /// How long finished jobs stay pollable; `None` keeps them for the process lifetime
    pub job_ttl: Option<Duration>,

    /// Maximum accepted request body for uploads
    pub max_upload_bytes: usize,

    /// Key prefix for separated stems
    pub processed_prefix: String,

    /// Key prefix for raw uploads
    pub uploads_prefix: String,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables (all optional):
    /// - STEMSPLIT_BIND_ADDR (default: 0.0.0.0:8080)
    /// - STEMSPLIT_PUBLIC_URL (default: http://localhost:8080)
    /// - STEMSPLIT_STORAGE_DIR (default: ./storage)
    /// - STEMSPLIT_SCRATCH_DIR (default: system temp dir)
    /// - STEMSPLIT_ENGINE_PROGRAM (default: python3)
    /// - STEMSPLIT_ENGINE_ARGS (whitespace separated, default: scripts/separate_audio.py)
    /// - ENGINE_TIMEOUT_SECS (default: 1800)
    /// - JOB_TTL_SECS (default: unset)
    /// - MAX_UPLOAD_BYTES (default: 200 MiB)
    /// - PROCESSED_PREFIX (default: processed)
    /// - UPLOADS_PREFIX (default: uploads)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let engine_args = std::env::var("STEMSPLIT_ENGINE_ARGS")
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or(defaults.engine_args);

        let engine_timeout = std::env::var("ENGINE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.engine_timeout);

        let job_ttl = std::env::var("JOB_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        let max_upload_bytes = std::env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            bind_addr: env_or("STEMSPLIT_BIND_ADDR", defaults.bind_addr),
            public_url: env_or("STEMSPLIT_PUBLIC_URL", defaults.public_url),
            storage_dir: std::env::var("STEMSPLIT_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            scratch_dir: std::env::var("STEMSPLIT_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            engine_program: env_or("STEMSPLIT_ENGINE_PROGRAM", defaults.engine_program),
            engine_args,
            engine_timeout,
            job_ttl,
            max_upload_bytes,
            processed_prefix: env_or("PROCESSED_PREFIX", defaults.processed_prefix),
            uploads_prefix: env_or("UPLOADS_PREFIX", defaults.uploads_prefix),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if !self.public_url.starts_with("http://") && !self.public_url.starts_with("https://") {
            anyhow::bail!("public_url must start with http:// or https://");
        }

        if self.engine_program.is_empty() {
            anyhow::bail!("engine_program cannot be empty");
        }

        if self.engine_timeout.is_zero() {
            anyhow::bail!("engine_timeout must be greater than 0");
        }

        if matches!(self.job_ttl, Some(ttl) if ttl.is_zero()) {
            anyhow::bail!("job_ttl must be greater than 0 when set");
        }

        if self.max_upload_bytes == 0 {
            anyhow::bail!("max_upload_bytes must be greater than 0");
        }

        for (name, prefix) in [
            ("processed_prefix", &self.processed_prefix),
            ("uploads_prefix", &self.uploads_prefix),
        ] {
            if prefix.is_empty() || prefix.contains("..") || prefix.starts_with('/') {
                anyhow::bail!("{} must be a non-empty relative key prefix", name);
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            public_url: "http://localhost:8080".to_string(),
            storage_dir: PathBuf::from("storage"),
            scratch_dir: std::env::temp_dir(),
            engine_program: "python3".to_string(),
            engine_args: vec!["scripts/separate_audio.py".to_string()],
            engine_timeout: Duration::from_secs(30 * 60),
            job_ttl: None,
            max_upload_bytes: 200 * 1024 * 1024,
            processed_prefix: "processed".to_string(),
            uploads_prefix: "uploads".to_string(),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine_timeout, Duration::from_secs(1800));
        assert_eq!(config.processed_prefix, "processed");
        assert_eq!(config.uploads_prefix, "uploads");
        assert!(config.job_ttl.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.public_url = "localhost:8080".to_string();
        assert!(config.validate().is_err());
        config.public_url = "https://stems.example.com".to_string();
        assert!(config.validate().is_ok());

        config.job_ttl = Some(Duration::ZERO);
        assert!(config.validate().is_err());
        config.job_ttl = Some(Duration::from_secs(3600));
        assert!(config.validate().is_ok());

        config.processed_prefix = "../escape".to_string();
        assert!(config.validate().is_err());
    }
}
