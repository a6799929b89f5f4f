//! Delayed source implementation - wraps another source with artificial latency.

use std::time::Duration;

use async_trait::async_trait;
use checkin_core::{
    ListEnvelope, RecordQuery, RecordSource, RecordsEnvelope, SourceError, StatisticsEnvelope,
};
use tokio::time::sleep;

type DelayFn = Box<dyn Fn(&RecordQuery) -> Duration + Send + Sync>;

/// A source that wraps another source and delays the records fetch.
///
/// Useful for simulating slow networks and overlapping fetch cycles.
pub struct DelayedSource<S: RecordSource> {
    inner: S,
    delay: DelayFn,
}

impl<S: RecordSource> DelayedSource<S> {
    /// Delay every records fetch by the same duration.
    pub fn new(inner: S, delay: Duration) -> Self {
        Self {
            inner,
            delay: Box::new(move |_: &RecordQuery| delay),
        }
    }

    /// Create a source with a delay in milliseconds.
    pub fn with_millis(inner: S, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Choose the delay per query, e.g. to make an earlier request resolve last.
    pub fn with_fn(
        inner: S,
        delay: impl Fn(&RecordQuery) -> Duration + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner,
            delay: Box::new(delay),
        }
    }

    /// Get a reference to the wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: RecordSource> RecordSource for DelayedSource<S> {
    async fn fetch_records(&self, query: &RecordQuery) -> Result<RecordsEnvelope, SourceError> {
        sleep((self.delay)(query)).await;
        self.inner.fetch_records(query).await
    }

    async fn fetch_guards(&self) -> Result<ListEnvelope, SourceError> {
        self.inner.fetch_guards().await
    }

    async fn fetch_sites(&self) -> Result<ListEnvelope, SourceError> {
        self.inner.fetch_sites().await
    }

    async fn fetch_statistics(
        &self,
        query: &RecordQuery,
    ) -> Result<Option<StatisticsEnvelope>, SourceError> {
        self.inner.fetch_statistics(query).await
    }

    fn name(&self) -> &str {
        "DelayedSource"
    }
}
