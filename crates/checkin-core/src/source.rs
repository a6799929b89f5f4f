//! The record source trait and the request parameters it accepts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::envelope::{ListEnvelope, RecordsEnvelope, StatisticsEnvelope};
use crate::error::SourceError;

/// Sort direction for the records listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Literal request parameters for `GET /records`.
///
/// `page` is 0-based here and rendered 1-based on the wire. Date bounds are
/// local wall-clock strings without an offset suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub status: Option<String>,
    pub guard_id: Option<String>,
    pub site_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 20,
            sort_by: "checkInTime".to_string(),
            sort_order: SortOrder::Desc,
            status: None,
            guard_id: None,
            site_id: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl RecordQuery {
    /// Filter parameters shared by the listing and the statistics endpoint.
    ///
    /// Absent filters are omitted entirely, never sent as empty strings.
    pub fn filter_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = &self.start_date {
            pairs.push(("startDate", start.clone()));
        }
        if let Some(end) = &self.end_date {
            pairs.push(("endDate", end.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        if let Some(guard_id) = &self.guard_id {
            pairs.push(("guardId", guard_id.clone()));
        }
        if let Some(site_id) = &self.site_id {
            pairs.push(("siteId", site_id.clone()));
        }
        pairs
    }

    /// Full parameter list for `GET /records`, with a 1-based page.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", (self.page + 1).to_string()),
            ("pageSize", self.page_size.to_string()),
            ("sortBy", self.sort_by.clone()),
            ("sortOrder", self.sort_order.as_str().to_string()),
        ];
        pairs.extend(self.filter_pairs());
        pairs
    }
}

/// A backend serving the three record resources.
///
/// Implementations return raw envelopes; interpreting `success` and
/// normalizing payloads is left to the caller.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one page of work session records.
    async fn fetch_records(&self, query: &RecordQuery) -> Result<RecordsEnvelope, SourceError>;

    /// Fetch every guard.
    async fn fetch_guards(&self) -> Result<ListEnvelope, SourceError>;

    /// Fetch every site.
    async fn fetch_sites(&self) -> Result<ListEnvelope, SourceError>;

    /// Fetch counts across every row matching the query's filters.
    ///
    /// Default implementation reports that no such source exists.
    async fn fetch_statistics(
        &self,
        query: &RecordQuery,
    ) -> Result<Option<StatisticsEnvelope>, SourceError> {
        let _ = query;
        Ok(None)
    }

    /// Get a human-readable name for this source.
    fn name(&self) -> &str;
}
