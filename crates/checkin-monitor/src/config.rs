//! Configuration for the monitoring pipeline.

use std::env;
use std::time::Duration;

use checkin_api::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use checkin_api::ApiConfig;

use crate::cache::DEFAULT_CACHE_TTL;
use crate::controller::DEFAULT_DEBOUNCE;
use crate::enrich::DEFAULT_ALLOWED_RADIUS_METERS;
use crate::error::MonitorError;

/// Configuration for the monitoring pipeline.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Records API base URL.
    pub api_url: String,

    /// Bearer token issued by the external auth service.
    pub api_token: Option<String>,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// How long a cached composite result stays usable.
    pub cache_ttl: Duration,

    /// Quiet period before a filter change is fetched.
    pub debounce: Duration,

    /// Rows per page.
    pub page_size: u32,

    /// Geofence radius for sites without one.
    pub default_radius_meters: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            request_timeout: DEFAULT_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            debounce: DEFAULT_DEBOUNCE,
            page_size: 20,
            default_radius_meters: DEFAULT_ALLOWED_RADIUS_METERS,
        }
    }
}

impl MonitorConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `CHECKIN_API_URL` - Records API base URL (default: http://localhost:3000/api)
    /// - `CHECKIN_API_TOKEN` - Bearer token
    /// - `CHECKIN_REQUEST_TIMEOUT_SECS` - Request timeout (default: 30)
    /// - `CHECKIN_CACHE_TTL_SECS` - Cache TTL (default: 300)
    /// - `CHECKIN_DEBOUNCE_MS` - Debounce quiet period (default: 300)
    /// - `CHECKIN_PAGE_SIZE` - Rows per page (default: 20)
    /// - `CHECKIN_DEFAULT_RADIUS_METERS` - Fallback geofence radius (default: 500)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Result<Self, MonitorError> {
        let defaults = Self::default();

        let api_url = env::var("CHECKIN_API_URL").unwrap_or(defaults.api_url);
        if api_url.trim().is_empty() {
            return Err(MonitorError::Configuration(
                "CHECKIN_API_URL is empty".to_string(),
            ));
        }

        let api_token = env::var("CHECKIN_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let request_timeout = env::var("CHECKIN_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let cache_ttl = env::var("CHECKIN_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        let debounce = env::var("CHECKIN_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.debounce);

        let page_size = env::var("CHECKIN_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &u32| n > 0)
            .unwrap_or(defaults.page_size);

        let default_radius_meters = env::var("CHECKIN_DEFAULT_RADIUS_METERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&r: &f64| r.is_finite() && r > 0.0)
            .unwrap_or(defaults.default_radius_meters);

        Ok(Self {
            api_url,
            api_token,
            request_timeout,
            cache_ttl,
            debounce,
            page_size,
            default_radius_meters,
        })
    }

    /// Client configuration for the records API.
    pub fn api_config(&self) -> ApiConfig {
        let config = match &self.api_token {
            Some(token) => ApiConfig::with_token(&self.api_url, token),
            None => ApiConfig::new(&self.api_url),
        };
        config.timeout(self.request_timeout)
    }
}
