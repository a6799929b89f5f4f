//! Configuration types for the records API client.

use std::time::Duration;

/// Default base URL of the records API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for connecting to the records API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the API (e.g., "http://localhost:3000/api").
    pub base_url: String,
    /// Bearer token issued by the external auth service.
    /// If None, requests are sent without an Authorization header.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create configuration that authenticates with a bearer token.
    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::new(base_url)
        }
    }

    /// Override the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the records listing URL.
    pub fn records_url(&self) -> String {
        format!("{}/records", self.base_url)
    }

    /// Get the complete statistics URL.
    pub fn statistics_url(&self) -> String {
        format!("{}/records/statistics", self.base_url)
    }

    /// Get the guards listing URL.
    pub fn guards_url(&self) -> String {
        format!("{}/guards", self.base_url)
    }

    /// Get the sites listing URL.
    pub fn sites_url(&self) -> String {
        format!("{}/sites", self.base_url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
