//! Error types for the monitoring pipeline.

use checkin_core::SourceError;
use thiserror::Error;

/// Shown when the backend rejects the caller's credentials.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Shown when the backend cannot be reached.
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";

const AUTH_PHRASES: &[&str] = &[
    "401",
    "403",
    "unauthorized",
    "forbidden",
    "token",
    "session",
    "authentication",
];

const NETWORK_PHRASES: &[&str] = &[
    "network",
    "connection",
    "timed out",
    "timeout",
    "fetch",
    "unreachable",
    "dns",
];

/// Errors that can occur during a fetch cycle.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A required resource could not be loaded.
    #[error("failed to load {resource}: {source}")]
    Fetch {
        resource: &'static str,
        #[source]
        source: SourceError,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MonitorError {
    pub fn fetch(resource: &'static str, source: SourceError) -> Self {
        MonitorError::Fetch { resource, source }
    }

    /// Message suitable for the dashboard's alert region.
    ///
    /// The resource name is for logs only; pass-through alerts carry the
    /// server's own message.
    pub fn user_message(&self) -> String {
        match self {
            MonitorError::Fetch { source, .. } => {
                let raw = source.to_string();
                let classified = classify_error(&raw);
                if classified != raw {
                    return classified;
                }
                match source {
                    SourceError::Status { message, .. } if !message.trim().is_empty() => {
                        message.clone()
                    }
                    _ => raw,
                }
            }
            MonitorError::Configuration(_) => classify_error(&self.to_string()),
        }
    }
}

/// Map a raw error message to what the dashboard shows.
///
/// Authentication phrases win over network phrases; anything else passes through.
pub fn classify_error(message: &str) -> String {
    let lower = message.to_lowercase();
    if AUTH_PHRASES.iter().any(|p| lower.contains(p)) {
        SESSION_EXPIRED_MESSAGE.to_string()
    } else if NETWORK_PHRASES.iter().any(|p| lower.contains(p)) {
        CONNECTIVITY_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}
