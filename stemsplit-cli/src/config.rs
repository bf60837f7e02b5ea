//! Configuration module
//!
//! Settings shared by every command.

use stemsplit_client::StemsplitClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the separation server
    pub server_url: String,
}

impl Config {
    pub fn client(&self) -> StemsplitClient {
        StemsplitClient::new(&self.server_url)
    }
}
