//! Work session records, guards and sites as served by the records API.

use chrono::{DateTime, Duration, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier as it appears on the wire: either a JSON string or a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    WireId::deserialize(deserializer).map(String::from)
}

fn deserialize_optional_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<WireId>::deserialize(deserializer).map(|id| id.map(String::from))
}

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Free-text field that tolerates numbers and drops other non-string values.
fn deserialize_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Lifecycle of a guard's work session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    /// Checked in, not yet checked out.
    Active,
    /// Checked out normally.
    Completed,
    /// Closed by the backend after the session exceeded its window.
    TimedOut,
    /// Created before lifecycle tracking existed, or carrying an unknown value.
    #[default]
    Legacy,
}

impl SessionStatus {
    /// Normalize a raw wire value. Unknown values become [`SessionStatus::Legacy`].
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().replace('_', "-").as_str() {
            "active" => SessionStatus::Active,
            "completed" => SessionStatus::Completed,
            "timed-out" | "timeout" => SessionStatus::TimedOut,
            _ => SessionStatus::Legacy,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::TimedOut => "timed-out",
            SessionStatus::Legacy => "legacy",
        }
    }
}

impl<'de> Deserialize<'de> for SessionStatus {
    /// Any non-string value (null, numbers, objects) is [`SessionStatus::Legacy`].
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(raw) => Self::normalize(&raw),
            _ => SessionStatus::Legacy,
        })
    }
}

/// Outcome of a check-in against its site's geofence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckInStatus {
    Success,
    Failed,
    /// Not yet validated, or an unrecognized value.
    #[default]
    Pending,
}

impl CheckInStatus {
    /// Normalize a raw wire value case-insensitively. Unknown values become
    /// [`CheckInStatus::Pending`].
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "success" => CheckInStatus::Success,
            "failed" => CheckInStatus::Failed,
            _ => CheckInStatus::Pending,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInStatus::Success => "success",
            CheckInStatus::Failed => "failed",
            CheckInStatus::Pending => "pending",
        }
    }

    /// Parse a filter value. Returns `None` for values outside the closed set
    /// (including `"all"`).
    pub fn parse_filter(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "success" => Some(CheckInStatus::Success),
            "failed" => Some(CheckInStatus::Failed),
            "pending" => Some(CheckInStatus::Pending),
            _ => None,
        }
    }
}

/// One guard's check-in/check-out episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSessionRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub guard_id: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub site_id: Option<String>,

    /// Check-in timestamp as sent by the backend.
    #[serde(default, alias = "startTime")]
    pub check_in_time: Option<String>,

    /// Reported check-in latitude.
    #[serde(default)]
    pub latitude: Option<f64>,

    /// Reported check-in longitude.
    #[serde(default)]
    pub longitude: Option<f64>,

    #[serde(default, alias = "endTime")]
    pub check_out_time: Option<String>,

    #[serde(default)]
    pub check_out_latitude: Option<f64>,

    #[serde(default)]
    pub check_out_longitude: Option<f64>,

    /// Raw validation status. Normalized during enrichment.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub status: Option<String>,

    #[serde(default)]
    pub session_status: SessionStatus,

    /// Spot checks triggered during the session.
    #[serde(default, alias = "totalSpotChecks", deserialize_with = "null_as_default")]
    pub spot_checks_triggered: u32,

    /// Spot checks the guard passed.
    #[serde(default, alias = "passedSpotChecks", deserialize_with = "null_as_default")]
    pub spot_checks_passed: u32,

    #[serde(default)]
    pub reason: Option<String>,
}

impl WorkSessionRecord {
    /// Create a minimal record for a guard at a site.
    pub fn new(
        id: impl Into<String>,
        guard_id: impl Into<String>,
        site_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            guard_id: Some(guard_id.into()),
            site_id: Some(site_id.into()),
            check_in_time: None,
            latitude: None,
            longitude: None,
            check_out_time: None,
            check_out_latitude: None,
            check_out_longitude: None,
            status: None,
            session_status: SessionStatus::default(),
            spot_checks_triggered: 0,
            spot_checks_passed: 0,
            reason: None,
        }
    }

    /// Set the reported check-in coordinate.
    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Set the raw status string.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Reported check-in coordinate, if both components are present.
    pub fn coordinate(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Duration between check-in and check-out when both timestamps parse.
    pub fn duration(&self) -> Option<Duration> {
        let start = parse_timestamp(self.check_in_time.as_deref()?)?;
        let end = parse_timestamp(self.check_out_time.as_deref()?)?;
        Some(end - start)
    }

    /// Fraction of triggered spot checks that passed, or `None` if none triggered.
    pub fn spot_check_pass_rate(&self) -> Option<f64> {
        if self.spot_checks_triggered == 0 {
            return None;
        }
        Some(f64::from(self.spot_checks_passed) / f64::from(self.spot_checks_triggered))
    }
}

/// Parse an RFC 3339 timestamp or an offset-less local wall-clock timestamp.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// A guard, used for name and phone lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guard {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, alias = "phoneNumber")]
    pub phone: Option<String>,

    /// Assigned site, if any.
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub site_id: Option<String>,
}

impl Guard {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: None,
            site_id: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// A guarded site and its geofence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,

    /// Allowed check-in radius in meters.
    #[serde(default, alias = "radius")]
    pub allowed_radius: Option<f64>,
}

impl Site {
    pub fn new(id: impl Into<String>, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            allowed_radius: None,
        }
    }

    pub fn with_radius(mut self, meters: f64) -> Self {
        self.allowed_radius = Some(meters);
        self
    }

    /// Reference coordinate, if both components are present.
    pub fn coordinate(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_in_status_normalize() {
        assert_eq!(CheckInStatus::normalize("SUCCESS"), CheckInStatus::Success);
        assert_eq!(CheckInStatus::normalize(" Failed "), CheckInStatus::Failed);
        assert_eq!(CheckInStatus::normalize("pending"), CheckInStatus::Pending);
        assert_eq!(CheckInStatus::normalize("approved"), CheckInStatus::Pending);
        assert_eq!(CheckInStatus::normalize(""), CheckInStatus::Pending);
    }

    #[test]
    fn test_check_in_status_filter() {
        assert_eq!(CheckInStatus::parse_filter("all"), None);
        assert_eq!(CheckInStatus::parse_filter("Failed"), Some(CheckInStatus::Failed));
    }

    #[test]
    fn test_session_status_normalize() {
        assert_eq!(SessionStatus::normalize("ACTIVE"), SessionStatus::Active);
        assert_eq!(SessionStatus::normalize("timed_out"), SessionStatus::TimedOut);
        assert_eq!(SessionStatus::normalize("completed"), SessionStatus::Completed);
        assert_eq!(SessionStatus::normalize("archived"), SessionStatus::Legacy);
    }

    #[test]
    fn test_record_deserialize_wire_shape() {
        let record: WorkSessionRecord = serde_json::from_value(json!({
            "id": 42,
            "guardId": "g-1",
            "siteId": 7,
            "checkInTime": "2026-10-16T08:00:00",
            "checkOutTime": "2026-10-16T16:30:00",
            "latitude": 51.5,
            "longitude": -0.12,
            "status": "SUCCESS",
            "sessionStatus": "bogus",
            "totalSpotChecks": 4,
            "spotChecksPassed": 3
        }))
        .unwrap();

        assert_eq!(record.id, "42");
        assert_eq!(record.guard_id.as_deref(), Some("g-1"));
        assert_eq!(record.site_id.as_deref(), Some("7"));
        assert_eq!(record.session_status, SessionStatus::Legacy);
        assert_eq!(record.coordinate(), Some((51.5, -0.12)));
        assert_eq!(record.spot_checks_triggered, 4);
        assert_eq!(record.spot_check_pass_rate(), Some(0.75));
        assert_eq!(record.duration(), Some(Duration::minutes(510)));
    }

    #[test]
    fn test_record_missing_session_status_is_legacy() {
        let record: WorkSessionRecord = serde_json::from_value(json!({ "id": "r1" })).unwrap();
        assert_eq!(record.session_status, SessionStatus::Legacy);
        assert!(record.guard_id.is_none());
        assert!(record.coordinate().is_none());
        assert!(record.duration().is_none());
        assert!(record.spot_check_pass_rate().is_none());
    }

    #[test]
    fn test_duration_with_offsets() {
        let mut record = WorkSessionRecord::new("r1", "g1", "s1");
        record.check_in_time = Some("2026-10-16T08:00:00Z".to_string());
        record.check_out_time = Some("2026-10-16T10:00:00+01:00".to_string());
        assert_eq!(record.duration(), Some(Duration::hours(1)));
    }

    #[test]
    fn test_record_tolerates_nulls_and_odd_types() {
        let record: WorkSessionRecord = serde_json::from_value(json!({
            "id": "r9",
            "status": 1,
            "sessionStatus": { "code": 3 },
            "totalSpotChecks": null,
            "passedSpotChecks": null
        }))
        .unwrap();
        assert_eq!(record.status.as_deref(), Some("1"));
        assert_eq!(record.session_status, SessionStatus::Legacy);
        assert_eq!(record.spot_checks_triggered, 0);
        assert_eq!(record.spot_checks_passed, 0);

        let site: Site = serde_json::from_value(json!({ "id": 5, "name": null })).unwrap();
        assert_eq!(site.name, "");
        assert!(site.coordinate().is_none());
    }

    #[test]
    fn test_site_radius_alias() {
        let site: Site = serde_json::from_value(json!({
            "id": 3,
            "name": "Depot",
            "latitude": 1.0,
            "longitude": 2.0,
            "radius": 250
        }))
        .unwrap();
        assert_eq!(site.allowed_radius, Some(250.0));
        assert_eq!(site.coordinate(), Some((1.0, 2.0)));
    }

    #[test]
    fn test_guard_phone_alias() {
        let guard: Guard = serde_json::from_value(json!({
            "id": "g1",
            "name": "Ada",
            "phoneNumber": "+15550001",
            "siteId": null
        }))
        .unwrap();
        assert_eq!(guard.phone.as_deref(), Some("+15550001"));
        assert!(guard.site_id.is_none());
    }
}
