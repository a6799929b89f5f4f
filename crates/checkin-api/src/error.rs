//! Error types for checkin-api.

use checkin_core::SourceError;
use thiserror::Error;

/// Errors that can occur when talking to the records API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<ApiError> for SourceError {
    fn from(err: ApiError) -> Self {
        match err {
            // Statuses are read before the body, so transport errors carry none.
            ApiError::Http(e) => SourceError::Network(e.to_string()),
            ApiError::Json(e) => SourceError::Decode(e.to_string()),
            ApiError::Status { status, body } if status == 401 || status == 403 => {
                SourceError::Unauthorized(format!("HTTP {}: {}", status, body))
            }
            ApiError::Status { status, body } => SourceError::Status {
                status,
                message: body,
            },
            ApiError::Config(message) => {
                SourceError::Rejected(format!("invalid configuration: {}", message))
            }
        }
    }
}
