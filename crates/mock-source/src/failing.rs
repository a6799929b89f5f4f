//! Failing source implementation - every request errors.

use async_trait::async_trait;
use checkin_core::{ListEnvelope, RecordQuery, RecordSource, RecordsEnvelope, SourceError};

/// A source that fails every request with the same error.
#[derive(Debug, Clone)]
pub struct FailingSource {
    error: SourceError,
}

impl FailingSource {
    pub fn new(error: SourceError) -> Self {
        Self { error }
    }

    /// A source that behaves like an unreachable server.
    pub fn offline() -> Self {
        Self::new(SourceError::Network("connection refused".to_string()))
    }
}

#[async_trait]
impl RecordSource for FailingSource {
    async fn fetch_records(&self, _query: &RecordQuery) -> Result<RecordsEnvelope, SourceError> {
        Err(self.error.clone())
    }

    async fn fetch_guards(&self) -> Result<ListEnvelope, SourceError> {
        Err(self.error.clone())
    }

    async fn fetch_sites(&self) -> Result<ListEnvelope, SourceError> {
        Err(self.error.clone())
    }

    fn name(&self) -> &str {
        "FailingSource"
    }
}
