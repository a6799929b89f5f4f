//! Reconciliation of competing statistics sources into one summary.
//!
//! Sources are tried in order and the first that answers wins:
//!
//! 1. the dedicated all-rows statistics endpoint
//! 2. the statistics block embedded in the records envelope
//! 3. a scan of the current page
//!
//! Only the last produces [`Provenance::PageOnly`]; the dashboard must
//! disclose that the counts cover the visible page alone.

use checkin_core::{CheckInStatus, EnvelopeStatistics};
use serde::Serialize;

use crate::enrich::EnrichedRecord;

/// Counts behind the dashboard's summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub pending: u64,
    /// Integer percentage of successful check-ins.
    pub success_rate: u32,
}

/// Whether a summary covers every matching row or only the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    Complete,
    PageOnly,
}

/// A summary tagged with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "provenance", content = "summary", rename_all = "kebab-case")]
pub enum ReconciledStatistics {
    Complete(StatisticsSummary),
    PageOnly(StatisticsSummary),
}

impl ReconciledStatistics {
    pub fn provenance(&self) -> Provenance {
        match self {
            ReconciledStatistics::Complete(_) => Provenance::Complete,
            ReconciledStatistics::PageOnly(_) => Provenance::PageOnly,
        }
    }

    pub fn summary(&self) -> &StatisticsSummary {
        match self {
            ReconciledStatistics::Complete(s) | ReconciledStatistics::PageOnly(s) => s,
        }
    }

    /// Whether the display must warn that counts are page-scoped.
    pub fn needs_disclosure(&self) -> bool {
        self.provenance() == Provenance::PageOnly
    }
}

impl Default for ReconciledStatistics {
    fn default() -> Self {
        ReconciledStatistics::PageOnly(StatisticsSummary::default())
    }
}

/// The inputs every resolver sees.
#[derive(Debug, Clone, Copy)]
pub struct StatisticsInputs<'a> {
    pub complete: Option<&'a EnvelopeStatistics>,
    pub envelope: Option<&'a EnvelopeStatistics>,
    pub page: &'a [EnrichedRecord],
}

/// One statistics source. Returns `None` when the source has nothing to offer.
pub type Resolver = fn(&StatisticsInputs<'_>) -> Option<ReconciledStatistics>;

/// Resolvers in precedence order. The last one always answers.
pub const RESOLVERS: &[Resolver] = &[from_complete_source, from_envelope, from_page];

fn rate(successful: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (successful as f64 * 100.0 / total as f64).round() as u32
}

fn summarize_block(stats: &EnvelopeStatistics) -> StatisticsSummary {
    StatisticsSummary {
        total: stats.total_records,
        successful: stats.success_count,
        failed: stats.failed_count,
        pending: stats.pending_count,
        success_rate: stats
            .success_rate
            .filter(|r| r.is_finite())
            .map(|r| r.round().clamp(0.0, 100.0) as u32)
            .unwrap_or_else(|| rate(stats.success_count, stats.total_records)),
    }
}

fn from_complete_source(inputs: &StatisticsInputs<'_>) -> Option<ReconciledStatistics> {
    inputs
        .complete
        .map(|s| ReconciledStatistics::Complete(summarize_block(s)))
}

fn from_envelope(inputs: &StatisticsInputs<'_>) -> Option<ReconciledStatistics> {
    inputs
        .envelope
        .map(|s| ReconciledStatistics::Complete(summarize_block(s)))
}

fn from_page(inputs: &StatisticsInputs<'_>) -> Option<ReconciledStatistics> {
    let mut summary = StatisticsSummary {
        total: inputs.page.len() as u64,
        ..Default::default()
    };
    for record in inputs.page {
        match record.status {
            CheckInStatus::Success => summary.successful += 1,
            CheckInStatus::Failed => summary.failed += 1,
            CheckInStatus::Pending => summary.pending += 1,
        }
    }
    summary.success_rate = rate(summary.successful, summary.total);
    Some(ReconciledStatistics::PageOnly(summary))
}

/// Resolve the summary from the first source that answers.
pub fn reconcile(
    complete: Option<&EnvelopeStatistics>,
    envelope: Option<&EnvelopeStatistics>,
    page: &[EnrichedRecord],
) -> ReconciledStatistics {
    let inputs = StatisticsInputs {
        complete,
        envelope,
        page,
    };
    RESOLVERS
        .iter()
        .find_map(|resolve| resolve(&inputs))
        .unwrap_or_default()
}
