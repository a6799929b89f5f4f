//! Records API HTTP client.

use async_trait::async_trait;
use checkin_core::{
    ListEnvelope, RecordQuery, RecordSource, RecordsEnvelope, SourceError, StatisticsEnvelope,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Error body some deployments send alongside a non-success status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Client for the guard check-in records API.
#[derive(Clone)]
pub struct CheckinClient {
    http: Client,
    config: ApiConfig,
}

impl CheckinClient {
    /// Create a client for the configured API.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::Config("base URL is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Http)?;

        Ok(Self { http, config })
    }

    /// Fetch one page of records.
    pub async fn records(&self, query: &RecordQuery) -> Result<RecordsEnvelope, ApiError> {
        self.get_json(&self.config.records_url(), &query.query_pairs())
            .await
    }

    /// Fetch counts across every record matching the query's filters.
    pub async fn statistics(&self, query: &RecordQuery) -> Result<StatisticsEnvelope, ApiError> {
        self.get_json(&self.config.statistics_url(), &query.filter_pairs())
            .await
    }

    /// Fetch every guard.
    pub async fn guards(&self) -> Result<ListEnvelope, ApiError> {
        self.get_json(&self.config.guards_url(), &[]).await
    }

    /// Fetch every site.
    pub async fn sites(&self) -> Result<ListEnvelope, ApiError> {
        self.get_json(&self.config.sites_url(), &[]).await
    }

    /// Get the configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Get the underlying HTTP client.
    pub fn http_client(&self) -> &Client {
        &self.http
    }

    /// Issue a GET and decode the JSON envelope.
    async fn get_json<R: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<R, ApiError> {
        debug!("GET {} ({} params)", url, params.len());

        let mut request = self.http.get(url).query(params);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(ApiError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: error_message(&body),
            });
        }

        let bytes = response.bytes().await.map_err(ApiError::Http)?;
        serde_json::from_slice(&bytes).map_err(ApiError::Json)
    }
}

/// Pull a human-readable message out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
            ..
        }) => message,
        Ok(ErrorBody {
            error: Some(error), ..
        }) => error,
        _ => body.to_string(),
    }
}

#[async_trait]
impl RecordSource for CheckinClient {
    async fn fetch_records(&self, query: &RecordQuery) -> Result<RecordsEnvelope, SourceError> {
        Ok(self.records(query).await?)
    }

    async fn fetch_guards(&self) -> Result<ListEnvelope, SourceError> {
        Ok(self.guards().await?)
    }

    async fn fetch_sites(&self) -> Result<ListEnvelope, SourceError> {
        Ok(self.sites().await?)
    }

    async fn fetch_statistics(
        &self,
        query: &RecordQuery,
    ) -> Result<Option<StatisticsEnvelope>, SourceError> {
        match self.statistics(query).await {
            Ok(envelope) => Ok(Some(envelope)),
            // Deployments without the endpoint answer 404
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &str {
        "CheckinClient"
    }
}

impl std::fmt::Debug for CheckinClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckinClient")
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.config.token.is_some())
            .finish()
    }
}
