//! Single fetch cycle: cache lookup, parallel fetch, enrichment, statistics.

use std::sync::Arc;

use chrono::NaiveDateTime;
use checkin_core::{Guard, Pagination, RecordSource, Site, SourceError};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CompositeResult, RequestCache};
use crate::enrich::{enrich, EnrichedRecord};
use crate::error::MonitorError;
use crate::query::{FilterState, PaginationState, QueryDescriptor};
use crate::statistics::{reconcile, ReconciledStatistics};

/// Result of one fetch cycle, ready for display.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub records: Vec<EnrichedRecord>,
    pub guards: Vec<Guard>,
    pub sites: Vec<Site>,
    pub statistics: ReconciledStatistics,
    pub pagination: Option<Pagination>,
    /// Whether the composite result was replayed from the cache.
    pub from_cache: bool,
}

/// Runs fetch cycles against a record source, sharing one request cache.
///
/// Flow of a cycle:
///
/// ```text
/// filter state ──▶ QueryDescriptor ──▶ cache lookup
///                                       │ hit          │ miss
///                                       │              ▼
///                                       │   records ║ guards ║ sites ║ stats
///                                       │              │
///                                       │   cache store + sweep
///                                       ▼              ▼
///                                     enrichment join ──▶ statistics
/// ```
pub struct FetchOrchestrator<S: RecordSource> {
    source: Arc<S>,
    cache: Arc<RequestCache>,
}

impl<S: RecordSource> FetchOrchestrator<S> {
    /// Create an orchestrator with its own default cache.
    pub fn new(source: S) -> Self {
        Self::with_cache(Arc::new(source), Arc::new(RequestCache::default()))
    }

    /// Create an orchestrator over a shared source and cache.
    pub fn with_cache(source: Arc<S>, cache: Arc<RequestCache>) -> Self {
        Self { source, cache }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    /// Run one cycle with date bounds taken from the local clock.
    pub async fn run(
        &self,
        filter: &FilterState,
        pagination: &PaginationState,
    ) -> Result<DashboardData, MonitorError> {
        self.run_descriptor(QueryDescriptor::build(filter, pagination))
            .await
    }

    /// Run one cycle with date bounds computed at `now`.
    pub async fn run_at(
        &self,
        filter: &FilterState,
        pagination: &PaginationState,
        now: NaiveDateTime,
    ) -> Result<DashboardData, MonitorError> {
        self.run_descriptor(QueryDescriptor::build_at(filter, pagination, now))
            .await
    }

    async fn run_descriptor(
        &self,
        descriptor: QueryDescriptor,
    ) -> Result<DashboardData, MonitorError> {
        let key = descriptor.cache_key();

        if let Some(cached) = self.cache.get(&key).await {
            debug!("Replaying cached result for {}", key);
            return Ok(Self::assemble(cached, true));
        }

        info!(
            "Fetching records page {} from {} ({})",
            descriptor.query.page + 1,
            self.source.name(),
            descriptor.date_range.as_str()
        );
        let composite = self.fetch_composite(&descriptor).await?;

        self.cache.put(key, composite.clone()).await;
        self.cache.sweep(Instant::now()).await;

        Ok(Self::assemble(composite, false))
    }

    /// Issue the resource fetches concurrently and normalize their envelopes.
    ///
    /// Records, guards and sites must all succeed. The complete-statistics
    /// fetch is best-effort.
    async fn fetch_composite(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<CompositeResult, MonitorError> {
        let query = &descriptor.query;
        let (records, guards, sites, statistics) = tokio::join!(
            self.source.fetch_records(query),
            self.source.fetch_guards(),
            self.source.fetch_sites(),
            self.source.fetch_statistics(query),
        );

        let records = records.map_err(|e| MonitorError::fetch("records", e))?;
        let guards = guards.map_err(|e| MonitorError::fetch("guards", e))?;
        let sites = sites.map_err(|e| MonitorError::fetch("sites", e))?;

        if !records.success {
            return Err(rejected("records", records.message));
        }
        if !guards.success {
            return Err(rejected("guards", guards.message));
        }
        if !sites.success {
            return Err(rejected("sites", sites.message));
        }

        let complete_statistics = match statistics {
            Ok(Some(envelope)) => envelope.into_statistics(),
            Ok(None) => None,
            Err(e) => {
                warn!("Complete statistics unavailable, falling back: {}", e);
                None
            }
        };

        let composite = CompositeResult {
            records: records.records(),
            pagination: records.pagination,
            envelope_statistics: records.statistics,
            complete_statistics,
            guards: guards.items("guards"),
            sites: sites.items("sites"),
        };

        info!(
            "Fetched {} records, {} guards, {} sites",
            composite.records.len(),
            composite.guards.len(),
            composite.sites.len()
        );
        Ok(composite)
    }

    fn assemble(composite: CompositeResult, from_cache: bool) -> DashboardData {
        let records = enrich(&composite.records, &composite.guards, &composite.sites);
        let statistics = reconcile(
            composite.complete_statistics.as_ref(),
            composite.envelope_statistics.as_ref(),
            &records,
        );

        DashboardData {
            records,
            guards: composite.guards,
            sites: composite.sites,
            statistics,
            pagination: composite.pagination,
            from_cache,
        }
    }
}

fn rejected(resource: &'static str, message: Option<String>) -> MonitorError {
    let message = message.unwrap_or_else(|| format!("the server could not return {}", resource));
    MonitorError::fetch(resource, SourceError::Rejected(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::DateRange;
    use crate::statistics::Provenance;
    use checkin_core::{EnvelopeStatistics, ListEnvelope, RecordsEnvelope, WorkSessionRecord};
    use mock_source::{Resource, StaticSource};
    use std::time::Duration;

    fn all_time() -> FilterState {
        FilterState {
            date_range: DateRange::AllTime,
            ..Default::default()
        }
    }

    fn source() -> StaticSource {
        StaticSource::new(
            vec![
                WorkSessionRecord::new("r1", "g1", "s1")
                    .with_status("SUCCESS")
                    .at(10.0, 20.0),
                WorkSessionRecord::new("r2", "g9", "s1").with_status("failed"),
            ],
            vec![Guard::new("g1", "Ada")],
            vec![Site::new("s1", "Depot", 10.0, 20.0)],
        )
    }

    #[tokio::test]
    async fn test_fresh_fetch_enriches_and_falls_back_to_page_stats() {
        let orchestrator = FetchOrchestrator::new(source());
        let data = orchestrator
            .run(&all_time(), &PaginationState::default())
            .await
            .unwrap();

        assert!(!data.from_cache);
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.records[0].guard_name, "Ada");
        assert!(data.records[1].guard_name.contains("g9"));
        assert_eq!(data.records[0].distance_from_site, Some(0.0));
        assert_eq!(data.statistics.provenance(), Provenance::PageOnly);
        assert_eq!(data.statistics.summary().success_rate, 50);
        assert_eq!(data.pagination.unwrap().total, 2);
    }

    #[tokio::test]
    async fn test_issues_all_three_fetches_once_then_serves_cache() {
        let orchestrator = FetchOrchestrator::new(source());
        let filter = all_time();
        let pagination = PaginationState::default();

        orchestrator.run(&filter, &pagination).await.unwrap();
        let second = orchestrator.run(&filter, &pagination).await.unwrap();

        assert!(second.from_cache);
        assert_eq!(second.records.len(), 2);
        let source = orchestrator.source();
        assert_eq!(source.calls(Resource::Records), 1);
        assert_eq!(source.calls(Resource::Guards), 1);
        assert_eq!(source.calls(Resource::Sites), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_cache_refetches() {
        let orchestrator = FetchOrchestrator::with_cache(
            Arc::new(source()),
            Arc::new(RequestCache::new(Duration::from_secs(60))),
        );
        let filter = all_time();
        let pagination = PaginationState::default();

        orchestrator.run(&filter, &pagination).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        let again = orchestrator.run(&filter, &pagination).await.unwrap();

        assert!(!again.from_cache);
        assert_eq!(orchestrator.source().calls(Resource::Records), 2);
        // The sweep after the refetch leaves only the fresh entry
        assert_eq!(orchestrator.cache().len().await, 1);
    }

    #[tokio::test]
    async fn test_different_page_is_a_cache_miss() {
        let orchestrator = FetchOrchestrator::new(source());
        let filter = all_time();
        orchestrator
            .run(&filter, &PaginationState::page(0, 1))
            .await
            .unwrap();
        let second = orchestrator
            .run(&filter, &PaginationState::page(1, 1))
            .await
            .unwrap();

        assert!(!second.from_cache);
        assert_eq!(second.records[0].id, "r2");
        assert_eq!(orchestrator.source().queries()[1].page, 1);
    }

    #[tokio::test]
    async fn test_any_failed_resource_fails_the_cycle() {
        let orchestrator = FetchOrchestrator::new(
            source().failing(Resource::Sites, SourceError::Network("connection reset".into())),
        );
        let err = orchestrator
            .run(&all_time(), &PaginationState::default())
            .await
            .unwrap_err();

        assert!(matches!(err, MonitorError::Fetch { resource: "sites", .. }));
        assert_eq!(
            err.user_message(),
            crate::error::CONNECTIVITY_MESSAGE
        );
        assert!(orchestrator.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope_fails_the_cycle() {
        let orchestrator = FetchOrchestrator::new(
            source().with_guards_envelope(ListEnvelope::failure("Guard directory offline")),
        );
        let err = orchestrator
            .run(&all_time(), &PaginationState::default())
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Guard directory offline");
    }

    #[tokio::test]
    async fn test_malformed_payloads_become_empty_collections() {
        let mut records = RecordsEnvelope::ok(&[]);
        records.data = serde_json::json!({ "unexpected": true });
        let orchestrator = FetchOrchestrator::new(
            source()
                .with_records_envelope(records)
                .with_sites_envelope(ListEnvelope {
                    success: true,
                    data: serde_json::Value::Null,
                    message: None,
                }),
        );
        let data = orchestrator
            .run(&all_time(), &PaginationState::default())
            .await
            .unwrap();

        assert!(data.records.is_empty());
        assert!(data.sites.is_empty());
        assert_eq!(data.guards.len(), 1);
        assert_eq!(data.statistics.provenance(), Provenance::PageOnly);
    }

    #[tokio::test]
    async fn test_statistics_precedence() {
        let embedded = FetchOrchestrator::new(source().with_embedded_statistics());
        let data = embedded
            .run(&all_time(), &PaginationState::page(0, 1))
            .await
            .unwrap();
        assert_eq!(data.statistics.provenance(), Provenance::Complete);
        assert_eq!(data.statistics.summary().total, 2);

        let envelope = RecordsEnvelope::ok(&[]).with_statistics(EnvelopeStatistics {
            total_records: 99,
            ..Default::default()
        });
        let both = FetchOrchestrator::new(
            source()
                .with_records_envelope(envelope)
                .with_complete_statistics(),
        );
        let data = both
            .run(&all_time(), &PaginationState::default())
            .await
            .unwrap();
        assert_eq!(data.statistics.summary().total, 2);
    }

    #[tokio::test]
    async fn test_failed_statistics_endpoint_is_not_fatal() {
        let orchestrator = FetchOrchestrator::new(
            source()
                .with_complete_statistics()
                .failing(Resource::Statistics, SourceError::Status {
                    status: 500,
                    message: "boom".into(),
                }),
        );
        let data = orchestrator
            .run(&all_time(), &PaginationState::default())
            .await
            .unwrap();
        assert_eq!(data.statistics.provenance(), Provenance::PageOnly);
    }

    #[tokio::test]
    async fn test_today_scenario_with_unknown_guard() {
        let now = chrono::NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let mut inside = WorkSessionRecord::new("r1", "g1", "s1").with_status("success");
        inside.check_in_time = Some("2026-10-16T08:00:00".to_string());
        let mut unknown = WorkSessionRecord::new("r2", "ghost-7", "s1").with_status("pending");
        unknown.check_in_time = Some("2026-10-16T09:30:00".to_string());
        let mut yesterday = WorkSessionRecord::new("r3", "g1", "s1");
        yesterday.check_in_time = Some("2026-10-15T23:00:00".to_string());

        let orchestrator = FetchOrchestrator::new(StaticSource::new(
            vec![inside, unknown, yesterday],
            vec![Guard::new("g1", "Ada")],
            vec![Site::new("s1", "Depot", 0.0, 0.0)],
        ));
        let data = orchestrator
            .run_at(&FilterState::default(), &PaginationState::default(), now)
            .await
            .unwrap();

        assert_eq!(data.records.len(), 2);
        assert!(data.records[1].guard_name.contains("ghost-7"));
        let query = &orchestrator.source().queries()[0];
        assert_eq!(query.start_date.as_deref(), Some("2026-10-16T00:00:00"));
        assert_eq!(query.end_date.as_deref(), Some("2026-10-16T23:59:59"));
        assert!(query.status.is_none());
    }
}
