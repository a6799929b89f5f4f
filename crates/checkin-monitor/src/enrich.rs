//! Denormalization of records with guard and site details.

use std::collections::HashMap;

use checkin_core::{
    distance_meters, CheckInStatus, Guard, SessionStatus, Site, WorkSessionRecord,
};
use serde::Serialize;

/// Geofence radius applied when a site has none configured.
pub const DEFAULT_ALLOWED_RADIUS_METERS: f64 = 500.0;

/// A record joined with its guard and site, ready for display.
///
/// Rebuilt from scratch on every enrichment pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecord {
    pub id: String,
    pub guard_id: Option<String>,
    pub guard_name: String,
    pub guard_phone: Option<String>,
    pub site_id: Option<String>,
    pub site_name: String,
    pub site_latitude: Option<f64>,
    pub site_longitude: Option<f64>,
    pub site_allowed_radius: Option<f64>,
    pub check_in_time: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub check_out_time: Option<String>,
    pub check_out_latitude: Option<f64>,
    pub check_out_longitude: Option<f64>,
    pub status: CheckInStatus,
    pub session_status: SessionStatus,
    pub spot_checks_triggered: u32,
    pub spot_checks_passed: u32,
    pub reason: Option<String>,
    /// Distance from the site's reference point, when computable.
    /// `Some(0.0)` is a real measurement, distinct from `None`.
    pub distance_from_site: Option<f64>,
    pub duration_minutes: Option<i64>,
}

impl EnrichedRecord {
    /// Allowed radius for this record's site, falling back to `default_radius`.
    pub fn allowed_radius(&self, default_radius: f64) -> f64 {
        self.site_allowed_radius.unwrap_or(default_radius)
    }

    /// Whether the check-in landed outside the site's geofence.
    ///
    /// Records without a computed distance are never anomalous.
    pub fn is_distance_anomaly(&self, default_radius: f64) -> bool {
        self.distance_from_site
            .is_some_and(|d| d > self.allowed_radius(default_radius))
    }
}

fn unknown_guard(id: Option<&str>) -> String {
    format!("Unknown guard ({})", id.unwrap_or("none"))
}

fn unknown_site(id: Option<&str>) -> String {
    format!("Unknown site ({})", id.unwrap_or("none"))
}

/// Join records with guards and sites.
///
/// Lookup misses produce a placeholder naming the missing id; no record is
/// ever dropped, so the output has the same length and order as `records`.
pub fn enrich(records: &[WorkSessionRecord], guards: &[Guard], sites: &[Site]) -> Vec<EnrichedRecord> {
    let guards_by_id: HashMap<&str, &Guard> = guards.iter().map(|g| (g.id.as_str(), g)).collect();
    let sites_by_id: HashMap<&str, &Site> = sites.iter().map(|s| (s.id.as_str(), s)).collect();

    records
        .iter()
        .map(|record| {
            let guard = record
                .guard_id
                .as_deref()
                .and_then(|id| guards_by_id.get(id).copied());
            let site = record
                .site_id
                .as_deref()
                .and_then(|id| sites_by_id.get(id).copied());

            let distance_from_site = match (site.and_then(Site::coordinate), record.coordinate()) {
                (Some((site_lat, site_lon)), Some((lat, lon))) => {
                    Some(distance_meters(lat, lon, site_lat, site_lon))
                }
                _ => None,
            };

            EnrichedRecord {
                id: record.id.clone(),
                guard_id: record.guard_id.clone(),
                guard_name: guard
                    .map(|g| g.name.clone())
                    .unwrap_or_else(|| unknown_guard(record.guard_id.as_deref())),
                guard_phone: guard.and_then(|g| g.phone.clone()),
                site_id: record.site_id.clone(),
                site_name: site
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| unknown_site(record.site_id.as_deref())),
                site_latitude: site.and_then(|s| s.latitude),
                site_longitude: site.and_then(|s| s.longitude),
                site_allowed_radius: site.and_then(|s| s.allowed_radius),
                check_in_time: record.check_in_time.clone(),
                latitude: record.latitude,
                longitude: record.longitude,
                check_out_time: record.check_out_time.clone(),
                check_out_latitude: record.check_out_latitude,
                check_out_longitude: record.check_out_longitude,
                status: CheckInStatus::normalize(record.status.as_deref().unwrap_or_default()),
                session_status: record.session_status,
                spot_checks_triggered: record.spot_checks_triggered,
                spot_checks_passed: record.spot_checks_passed,
                reason: record.reason.clone(),
                distance_from_site,
                duration_minutes: record.duration().map(|d| d.num_minutes()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guards() -> Vec<Guard> {
        vec![Guard::new("g1", "Ada Obi").with_phone("+15550001")]
    }

    fn sites() -> Vec<Site> {
        vec![
            Site::new("s1", "North Gate", 10.0, 20.0).with_radius(100.0),
            Site::new("s2", "Depot", 10.0, 20.0),
        ]
    }

    #[test]
    fn test_joins_names_and_phone() {
        let records = vec![WorkSessionRecord::new("r1", "g1", "s1").with_status("success")];
        let enriched = enrich(&records, &guards(), &sites());

        assert_eq!(enriched[0].guard_name, "Ada Obi");
        assert_eq!(enriched[0].guard_phone.as_deref(), Some("+15550001"));
        assert_eq!(enriched[0].site_name, "North Gate");
        assert_eq!(enriched[0].site_allowed_radius, Some(100.0));
    }

    #[test]
    fn test_unknown_guard_placeholder_keeps_record() {
        let records = vec![
            WorkSessionRecord::new("r1", "g1", "s1"),
            WorkSessionRecord::new("r2", "g404", "s999"),
        ];
        let enriched = enrich(&records, &guards(), &sites());

        assert_eq!(enriched.len(), records.len());
        assert!(enriched[1].guard_name.contains("g404"));
        assert!(!enriched[1].guard_name.is_empty());
        assert!(enriched[1].site_name.contains("s999"));
        assert!(enriched[1].guard_phone.is_none());
    }

    #[test]
    fn test_missing_guard_reference() {
        let mut record = WorkSessionRecord::new("r1", "g1", "s1");
        record.guard_id = None;
        let enriched = enrich(&[record], &guards(), &sites());
        assert_eq!(enriched[0].guard_name, "Unknown guard (none)");
    }

    #[test]
    fn test_never_drops_with_empty_lookups() {
        let records: Vec<_> = (0..7)
            .map(|i| WorkSessionRecord::new(format!("r{}", i), "g", "s"))
            .collect();
        assert_eq!(enrich(&records, &[], &[]).len(), 7);
    }

    #[test]
    fn test_status_normalized() {
        let records = vec![
            WorkSessionRecord::new("r1", "g1", "s1").with_status("SUCCESS"),
            WorkSessionRecord::new("r2", "g1", "s1").with_status("Failed"),
            WorkSessionRecord::new("r3", "g1", "s1").with_status("mystery"),
            WorkSessionRecord::new("r4", "g1", "s1"),
        ];
        let statuses: Vec<CheckInStatus> = enrich(&records, &guards(), &sites())
            .into_iter()
            .map(|r| r.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                CheckInStatus::Success,
                CheckInStatus::Failed,
                CheckInStatus::Pending,
                CheckInStatus::Pending
            ]
        );
    }

    #[test]
    fn test_distance_zero_is_distinct_from_none() {
        let records = vec![
            WorkSessionRecord::new("r1", "g1", "s1").at(10.0, 20.0),
            WorkSessionRecord::new("r2", "g1", "s1"),
            WorkSessionRecord::new("r3", "g1", "missing").at(10.0, 20.0),
        ];
        let enriched = enrich(&records, &guards(), &sites());

        assert_eq!(enriched[0].distance_from_site, Some(0.0));
        assert_eq!(enriched[1].distance_from_site, None);
        assert_eq!(enriched[2].distance_from_site, None);
    }

    #[test]
    fn test_anomaly_uses_default_radius_when_unset() {
        // ~0.0054 degrees of latitude is about 600 m
        let records = vec![WorkSessionRecord::new("r1", "g1", "s2").at(10.0054, 20.0)];
        let enriched = enrich(&records, &guards(), &sites());
        let distance = enriched[0].distance_from_site.unwrap();

        assert!((distance - 600.0).abs() < 2.0, "got {}", distance);
        assert_eq!(enriched[0].allowed_radius(DEFAULT_ALLOWED_RADIUS_METERS), 500.0);
        assert!(enriched[0].is_distance_anomaly(DEFAULT_ALLOWED_RADIUS_METERS));
    }

    #[test]
    fn test_anomaly_uses_site_radius() {
        let records = vec![
            WorkSessionRecord::new("r1", "g1", "s1").at(10.0009, 20.0),
            WorkSessionRecord::new("r2", "g1", "s1").at(10.0005, 20.0),
            WorkSessionRecord::new("r3", "g1", "s1"),
        ];
        let enriched = enrich(&records, &guards(), &sites());

        assert!(enriched[0].is_distance_anomaly(DEFAULT_ALLOWED_RADIUS_METERS));
        assert!(!enriched[1].is_distance_anomaly(DEFAULT_ALLOWED_RADIUS_METERS));
        assert!(!enriched[2].is_distance_anomaly(DEFAULT_ALLOWED_RADIUS_METERS));
    }
}
