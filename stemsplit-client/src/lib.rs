//! Stemsplit HTTP Client
//!
//! A type-safe HTTP client for the Stemsplit separation server, plus a
//! [`JobPoller`] that starts a job and waits for its stems.
//!
//! # Example
//!
//! ```no_run
//! use stemsplit_client::{JobPoller, StemsplitClient};
//! use stemsplit_core::dto::job::StartJob;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = StemsplitClient::new("http://localhost:8080");
//!     let poller = JobPoller::new(client);
//!
//!     let stems = poller
//!         .run(
//!             StartJob::new("job_1", "https://cdn.example.com/song.mp3", vec!["vocals".into()]),
//!             |job| println!("{}%", job.progress),
//!         )
//!         .await?;
//!
//!     for stem in stems {
//!         println!("{}: {}", stem.stem, stem.url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod files;
mod jobs;
mod poller;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use poller::{DEFAULT_POLL_INTERVAL, JobPoller};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Stemsplit server API
///
/// Methods are grouped by concern:
/// - Job lifecycle (start, status)
/// - Stored files (upload, list, delete)
#[derive(Debug, Clone)]
pub struct StemsplitClient {
    /// Base URL of the server (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl StemsplitClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the server (e.g., "http://localhost:8080")
    ///
    /// # Example
    /// ```
    /// use stemsplit_client::StemsplitClient;
    ///
    /// let client = StemsplitClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., DELETE operations)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        self.check_status(response).await.map(|_| ())
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = StemsplitClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = StemsplitClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let client = StemsplitClient::with_client("http://localhost:8080", http_client);
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
