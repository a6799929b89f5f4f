//! Error types for record source operations.

use thiserror::Error;

/// Errors that can occur while fetching from a record source.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// No response was received (transport failure, timeout, DNS).
    #[error("network error: {0}")]
    Network(String),

    /// The backend refused the credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The backend answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The envelope reported `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// The response body could not be decoded at all.
    #[error("invalid response: {0}")]
    Decode(String),
}
