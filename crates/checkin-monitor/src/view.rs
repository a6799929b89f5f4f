//! State handed to display collaborators.

use checkin_core::{Guard, Site};
use serde::Serialize;

use crate::enrich::{EnrichedRecord, DEFAULT_ALLOWED_RADIUS_METERS};
use crate::orchestrator::DashboardData;
use crate::statistics::ReconciledStatistics;

/// Everything the dashboard renders.
///
/// On a failed cycle `records`, `guards` and `sites` are all emptied together
/// and `error` carries the alert text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub records: Vec<EnrichedRecord>,
    pub statistics: ReconciledStatistics,
    pub loading: bool,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<Guard>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sites: Vec<Site>,
    /// Rows matching the filter across all pages, when the backend reports it.
    pub total_records: Option<u64>,
    pub total_pages: Option<u32>,
    /// Records whose check-in fell outside their site's radius.
    pub distance_anomalies: usize,
    pub from_cache: bool,
}

impl DashboardView {
    /// Build the view for a successful cycle.
    pub fn from_data(data: DashboardData, default_radius: f64) -> Self {
        let distance_anomalies = data
            .records
            .iter()
            .filter(|r| r.is_distance_anomaly(default_radius))
            .count();

        Self {
            total_records: data.pagination.as_ref().map(|p| p.total),
            total_pages: data.pagination.as_ref().map(|p| p.total_pages),
            records: data.records,
            statistics: data.statistics,
            loading: false,
            error: None,
            guards: data.guards,
            sites: data.sites,
            distance_anomalies,
            from_cache: data.from_cache,
        }
    }

    /// Build the view for a failed cycle.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Text of the disclosure banner for page-scoped statistics, if one is needed.
    pub fn disclosure(&self) -> Option<&'static str> {
        if self.error.is_none() && self.statistics.needs_disclosure() {
            Some("Statistics reflect the current page only.")
        } else {
            None
        }
    }
}

impl From<DashboardData> for DashboardView {
    fn from(data: DashboardData) -> Self {
        Self::from_data(data, DEFAULT_ALLOWED_RADIUS_METERS)
    }
}
