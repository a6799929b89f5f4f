//! Static source implementation - serves fixed data with server-side filtering.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use checkin_core::{
    CheckInStatus, EnvelopeStatistics, Guard, ListEnvelope, Pagination, RecordQuery,
    RecordSource, RecordsEnvelope, Site, SourceError, StatisticsEnvelope, WorkSessionRecord,
};

/// The resources a source serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Records,
    Guards,
    Sites,
    Statistics,
}

/// A source backed by in-memory collections.
///
/// Records are filtered, sorted by nothing and paginated the way the real
/// backend does, so tests can observe which query reached the source.
#[derive(Debug, Default)]
pub struct StaticSource {
    records: Vec<WorkSessionRecord>,
    guards: Vec<Guard>,
    sites: Vec<Site>,
    /// Replaces the computed records envelope verbatim.
    records_envelope: Option<RecordsEnvelope>,
    guards_envelope: Option<ListEnvelope>,
    sites_envelope: Option<ListEnvelope>,
    embed_statistics: bool,
    serve_statistics: bool,
    errors: HashMap<Resource, SourceError>,
    calls: Mutex<HashMap<Resource, usize>>,
    queries: Mutex<Vec<RecordQuery>>,
}

impl StaticSource {
    /// Create a source serving the given collections.
    pub fn new(records: Vec<WorkSessionRecord>, guards: Vec<Guard>, sites: Vec<Site>) -> Self {
        Self {
            records,
            guards,
            sites,
            ..Default::default()
        }
    }

    /// Embed a statistics block in every records envelope.
    pub fn with_embedded_statistics(mut self) -> Self {
        self.embed_statistics = true;
        self
    }

    /// Serve the dedicated complete-statistics endpoint.
    pub fn with_complete_statistics(mut self) -> Self {
        self.serve_statistics = true;
        self
    }

    /// Answer every records request with this envelope.
    pub fn with_records_envelope(mut self, envelope: RecordsEnvelope) -> Self {
        self.records_envelope = Some(envelope);
        self
    }

    /// Answer every guards request with this envelope.
    pub fn with_guards_envelope(mut self, envelope: ListEnvelope) -> Self {
        self.guards_envelope = Some(envelope);
        self
    }

    /// Answer every sites request with this envelope.
    pub fn with_sites_envelope(mut self, envelope: ListEnvelope) -> Self {
        self.sites_envelope = Some(envelope);
        self
    }

    /// Fail every request for `resource` with `error`.
    pub fn failing(mut self, resource: Resource, error: SourceError) -> Self {
        self.errors.insert(resource, error);
        self
    }

    /// Number of requests received for `resource`.
    pub fn calls(&self, resource: Resource) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(&resource).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Every records query received, oldest first.
    pub fn queries(&self) -> Vec<RecordQuery> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }

    fn record_call(&self, resource: Resource) -> Result<(), SourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(resource).or_insert(0) += 1;
        }
        match self.errors.get(&resource) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn matching(&self, query: &RecordQuery) -> Vec<&WorkSessionRecord> {
        let status = query.status.as_deref().and_then(CheckInStatus::parse_filter);
        self.records
            .iter()
            .filter(|r| match status {
                Some(status) => {
                    CheckInStatus::normalize(r.status.as_deref().unwrap_or_default()) == status
                }
                None => true,
            })
            .filter(|r| query.guard_id.is_none() || r.guard_id == query.guard_id)
            .filter(|r| query.site_id.is_none() || r.site_id == query.site_id)
            .filter(|r| within_bounds(r, query))
            .collect()
    }
}

/// Wall-clock strings of equal shape compare lexicographically.
fn within_bounds(record: &WorkSessionRecord, query: &RecordQuery) -> bool {
    let Some(time) = record.check_in_time.as_deref() else {
        return query.start_date.is_none() && query.end_date.is_none();
    };
    let time = time.get(..19).unwrap_or(time);
    let after_start = query
        .start_date
        .as_deref()
        .map_or(true, |start| time >= start);
    let before_end = query.end_date.as_deref().map_or(true, |end| time <= end);
    after_start && before_end
}

fn count(records: &[&WorkSessionRecord]) -> EnvelopeStatistics {
    let mut stats = EnvelopeStatistics {
        total_records: records.len() as u64,
        ..Default::default()
    };
    for record in records {
        match CheckInStatus::normalize(record.status.as_deref().unwrap_or_default()) {
            CheckInStatus::Success => stats.success_count += 1,
            CheckInStatus::Failed => stats.failed_count += 1,
            CheckInStatus::Pending => stats.pending_count += 1,
        }
    }
    if stats.total_records > 0 {
        stats.success_rate =
            Some(stats.success_count as f64 * 100.0 / stats.total_records as f64);
    }
    stats
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn fetch_records(&self, query: &RecordQuery) -> Result<RecordsEnvelope, SourceError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        self.record_call(Resource::Records)?;

        if let Some(envelope) = &self.records_envelope {
            return Ok(envelope.clone());
        }

        let matching = self.matching(query);
        let page_size = query.page_size.max(1) as usize;
        let page: Vec<WorkSessionRecord> = matching
            .iter()
            .skip(query.page as usize * page_size)
            .take(page_size)
            .map(|r| (*r).clone())
            .collect();

        let total = matching.len() as u64;
        let mut envelope = RecordsEnvelope::ok(&page).with_pagination(Pagination {
            total,
            page: query.page + 1,
            page_size: page_size as u32,
            total_pages: matching.len().div_ceil(page_size) as u32,
        });
        if self.embed_statistics {
            envelope = envelope.with_statistics(count(&matching));
        }
        Ok(envelope)
    }

    async fn fetch_guards(&self) -> Result<ListEnvelope, SourceError> {
        self.record_call(Resource::Guards)?;
        Ok(self
            .guards_envelope
            .clone()
            .unwrap_or_else(|| ListEnvelope::ok(&self.guards)))
    }

    async fn fetch_sites(&self) -> Result<ListEnvelope, SourceError> {
        self.record_call(Resource::Sites)?;
        Ok(self
            .sites_envelope
            .clone()
            .unwrap_or_else(|| ListEnvelope::ok(&self.sites)))
    }

    async fn fetch_statistics(
        &self,
        query: &RecordQuery,
    ) -> Result<Option<StatisticsEnvelope>, SourceError> {
        self.record_call(Resource::Statistics)?;
        if !self.serve_statistics {
            return Ok(None);
        }
        Ok(Some(StatisticsEnvelope {
            success: true,
            data: Some(count(&self.matching(query))),
            message: None,
        }))
    }

    fn name(&self) -> &str {
        "StaticSource"
    }
}
