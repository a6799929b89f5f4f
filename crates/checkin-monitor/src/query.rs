//! Translation of dashboard filter state into record queries.
//!
//! Date bounds are computed in local time and rendered as wall-clock strings
//! (`YYYY-MM-DDTHH:mm:ss`) with no offset suffix. The backend reads
//! unsuffixed timestamps as facility-local time, so adding an offset here
//! would shift the remote filter by the local UTC offset.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use checkin_core::{CheckInStatus, RecordQuery, SortOrder};
use serde::{Deserialize, Serialize};

/// Wire format of date bounds.
pub const DATE_PARAM_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Coarse date window selected in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DateRange {
    #[default]
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "last-7-days")]
    Last7Days,
    #[serde(rename = "last-30-days")]
    Last30Days,
    #[serde(rename = "all-time")]
    AllTime,
}

impl DateRange {
    /// Parse a range name. Returns `None` for unknown names.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "today" => Some(DateRange::Today),
            "last-7-days" | "7days" | "week" => Some(DateRange::Last7Days),
            "last-30-days" | "30days" | "month" => Some(DateRange::Last30Days),
            "all-time" | "all" => Some(DateRange::AllTime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::Today => "today",
            DateRange::Last7Days => "last-7-days",
            DateRange::Last30Days => "last-30-days",
            DateRange::AllTime => "all-time",
        }
    }

    /// Inclusive local bounds of the window at `now`, or `None` for all time.
    pub fn bounds(&self, now: NaiveDateTime) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let today = now.date();
        match self {
            DateRange::Today => Some((start_of_day(today), end_of_day(today))),
            DateRange::Last7Days => Some((start_of_day(today - Duration::days(7)), now)),
            DateRange::Last30Days => Some((start_of_day(today - Duration::days(30)), now)),
            DateRange::AllTime => None,
        }
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 23:59:59.999 on `date`.
fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::milliseconds(86_399_999)
}

/// Render a local timestamp in the offset-less wire format.
pub fn format_local(timestamp: NaiveDateTime) -> String {
    timestamp.format(DATE_PARAM_FORMAT).to_string()
}

/// Filter controls of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// `None` means all statuses.
    pub status: Option<CheckInStatus>,
    pub guard_id: Option<String>,
    pub site_id: Option<String>,
    pub date_range: DateRange,
}

/// Pagination and sort controls of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// 0-based page index.
    pub page_index: u32,
    pub page_size: u32,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: 20,
            sort_by: "checkInTime".to_string(),
            sort_order: SortOrder::Desc,
        }
    }
}

impl PaginationState {
    pub fn page(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index,
            page_size,
            ..Default::default()
        }
    }
}

/// Coarse identity of a query used for caching.
///
/// Sort and exact date bounds are left out on purpose; see [`QueryDescriptor::cache_key`].
#[derive(Debug, Serialize)]
struct CacheKeyParts<'a> {
    page: u32,
    page_size: u32,
    date_range: &'a str,
    status: &'a str,
    guard_id: Option<&'a str>,
    site_id: Option<&'a str>,
}

/// Normalized query: the literal request parameters plus the coarse date window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub date_range: DateRange,
    pub query: RecordQuery,
}

impl QueryDescriptor {
    /// Build a descriptor with date bounds computed from the local clock.
    pub fn build(filter: &FilterState, pagination: &PaginationState) -> Self {
        Self::build_at(filter, pagination, Local::now().naive_local())
    }

    /// Build a descriptor with date bounds computed at `now` (local wall clock).
    pub fn build_at(
        filter: &FilterState,
        pagination: &PaginationState,
        now: NaiveDateTime,
    ) -> Self {
        let (start_date, end_date) = match filter.date_range.bounds(now) {
            Some((start, end)) => (Some(format_local(start)), Some(format_local(end))),
            None => (None, None),
        };

        let query = RecordQuery {
            page: pagination.page_index,
            page_size: pagination.page_size,
            sort_by: pagination.sort_by.clone(),
            sort_order: pagination.sort_order,
            status: filter.status.map(|s| s.as_str().to_string()),
            guard_id: non_empty(filter.guard_id.as_deref()),
            site_id: non_empty(filter.site_id.as_deref()),
            start_date,
            end_date,
        };

        Self {
            date_range: filter.date_range,
            query,
        }
    }

    /// Deterministic cache key over page, page size, date window and filters.
    ///
    /// Two descriptors that differ only in sort or in recomputed date bounds
    /// share a key.
    pub fn cache_key(&self) -> String {
        let parts = CacheKeyParts {
            page: self.query.page,
            page_size: self.query.page_size,
            date_range: self.date_range.as_str(),
            status: self.query.status.as_deref().unwrap_or("all"),
            guard_id: self.query.guard_id.as_deref(),
            site_id: self.query.site_id.as_deref(),
        };
        serde_json::to_string(&parts).unwrap_or_else(|_| format!("{:?}", parts))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn filter(range: DateRange) -> FilterState {
        FilterState {
            date_range: range,
            ..Default::default()
        }
    }

    #[test]
    fn test_today_bounds() {
        let now = at(2026, 10, 16, 14, 30, 5);
        let d = QueryDescriptor::build_at(&filter(DateRange::Today), &PaginationState::default(), now);
        assert_eq!(d.query.start_date.as_deref(), Some("2026-10-16T00:00:00"));
        assert_eq!(d.query.end_date.as_deref(), Some("2026-10-16T23:59:59"));
    }

    #[test]
    fn test_today_end_keeps_milliseconds_internally() {
        let now = at(2026, 10, 16, 1, 0, 0);
        let (_, end) = DateRange::Today.bounds(now).unwrap();
        assert_eq!(
            end,
            NaiveDate::from_ymd_opt(2026, 10, 16)
                .unwrap()
                .and_hms_milli_opt(23, 59, 59, 999)
                .unwrap()
        );
    }

    #[test]
    fn test_last_7_days_bounds() {
        let now = at(2026, 10, 16, 14, 30, 5);
        let d = QueryDescriptor::build_at(
            &filter(DateRange::Last7Days),
            &PaginationState::default(),
            now,
        );
        assert_eq!(d.query.start_date.as_deref(), Some("2026-10-09T00:00:00"));
        assert_eq!(d.query.end_date.as_deref(), Some("2026-10-16T14:30:05"));
    }

    #[test]
    fn test_last_30_days_crosses_month() {
        let now = at(2026, 3, 10, 8, 0, 0);
        let (start, end) = DateRange::Last30Days.bounds(now).unwrap();
        assert_eq!(format_local(start), "2026-02-08T00:00:00");
        assert_eq!(end, now);
    }

    #[test]
    fn test_all_time_emits_no_bounds() {
        let d = QueryDescriptor::build_at(
            &filter(DateRange::AllTime),
            &PaginationState::default(),
            at(2026, 10, 16, 0, 0, 0),
        );
        assert!(d.query.start_date.is_none());
        assert!(d.query.end_date.is_none());
        let keys: Vec<&str> = d.query.query_pairs().iter().map(|(k, _)| *k).collect();
        assert!(!keys.contains(&"startDate"));
        assert!(!keys.contains(&"endDate"));
    }

    #[test]
    fn test_no_offset_suffix() {
        let now = at(2026, 10, 16, 14, 30, 5);
        let d = QueryDescriptor::build_at(&filter(DateRange::Today), &PaginationState::default(), now);
        let start = d.query.start_date.unwrap();
        assert!(!start.ends_with('Z'));
        assert!(!start.contains('+'));
        assert_eq!(start.len(), 19);
    }

    #[test]
    fn test_filters_and_pagination() {
        let filter = FilterState {
            status: Some(CheckInStatus::Failed),
            guard_id: Some("g7".to_string()),
            site_id: Some("  ".to_string()),
            date_range: DateRange::AllTime,
        };
        let d = QueryDescriptor::build_at(&filter, &PaginationState::page(2, 50), at(2026, 1, 1, 0, 0, 0));
        assert_eq!(d.query.page, 2);
        assert_eq!(d.query.page_size, 50);
        assert_eq!(d.query.status.as_deref(), Some("failed"));
        assert_eq!(d.query.guard_id.as_deref(), Some("g7"));
        assert!(d.query.site_id.is_none());
        assert!(d.query.query_pairs().contains(&("page", "3".to_string())));
    }

    #[test]
    fn test_cache_key_ignores_sort_and_exact_bounds() {
        let f = filter(DateRange::Last7Days);
        let mut p = PaginationState::default();
        let a = QueryDescriptor::build_at(&f, &p, at(2026, 10, 16, 9, 0, 0));
        p.sort_order = SortOrder::Asc;
        p.sort_by = "guardId".to_string();
        let b = QueryDescriptor::build_at(&f, &p, at(2026, 10, 16, 9, 0, 7));

        assert_ne!(a.query, b.query);
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_distinguishes_filters() {
        let now = at(2026, 10, 16, 9, 0, 0);
        let p = PaginationState::default();
        let base = QueryDescriptor::build_at(&filter(DateRange::Today), &p, now);
        let other_range = QueryDescriptor::build_at(&filter(DateRange::AllTime), &p, now);
        let other_page = QueryDescriptor::build_at(&filter(DateRange::Today), &PaginationState::page(1, 20), now);
        let other_status = QueryDescriptor::build_at(
            &FilterState {
                status: Some(CheckInStatus::Success),
                ..filter(DateRange::Today)
            },
            &p,
            now,
        );

        assert_ne!(base.cache_key(), other_range.cache_key());
        assert_ne!(base.cache_key(), other_page.cache_key());
        assert_ne!(base.cache_key(), other_status.cache_key());
        assert!(base.cache_key().contains("\"status\":\"all\""));
    }

    #[test]
    fn test_date_range_parse() {
        assert_eq!(DateRange::parse("Today"), Some(DateRange::Today));
        assert_eq!(DateRange::parse("week"), Some(DateRange::Last7Days));
        assert_eq!(DateRange::parse("last-30-days"), Some(DateRange::Last30Days));
        assert_eq!(DateRange::parse("all"), Some(DateRange::AllTime));
        assert_eq!(DateRange::parse("yesterday"), None);
    }
}
