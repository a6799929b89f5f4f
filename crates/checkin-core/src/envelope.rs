//! Response envelopes returned by the records API.
//!
//! Every resource answers with `{success, data, message?}`; the records
//! listing adds optional `pagination` and `statistics` blocks. A successful
//! envelope whose `data` is missing or the wrong shape is normalized to an
//! empty collection rather than treated as an error. Entries are decoded one
//! at a time; only an entry that cannot be used at all is dropped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::record::WorkSessionRecord;

/// Deserialize an optional block, treating a malformed block as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Normalize an envelope `data` payload into a collection.
fn normalize_items<T: DeserializeOwned>(data: &Value, resource: &str) -> Vec<T> {
    match data {
        Value::Null => {
            debug!("{} envelope carried no data, using empty collection", resource);
            Vec::new()
        }
        Value::Array(elements) => elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| match T::deserialize(element) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Skipping unusable {} entry at index {}: {}", resource, index, e);
                    None
                }
            })
            .collect(),
        other => {
            warn!(
                "Unexpected {} payload type ({}), using empty collection",
                resource,
                json_type(other)
            );
            Vec::new()
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Pagination block of the records listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    /// 1-based page number.
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: u32,
}

/// Aggregate counts across every row matching a filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeStatistics {
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub pending_count: u64,
    /// Success percentage as reported by the backend.
    #[serde(default)]
    pub success_rate: Option<f64>,
}

/// Envelope of `GET /records`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordsEnvelope {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub data: Value,

    #[serde(default, deserialize_with = "lenient")]
    pub pagination: Option<Pagination>,

    #[serde(default, deserialize_with = "lenient")]
    pub statistics: Option<EnvelopeStatistics>,

    #[serde(default)]
    pub message: Option<String>,
}

impl RecordsEnvelope {
    /// Build a successful envelope around a page of records.
    pub fn ok(records: &[WorkSessionRecord]) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(records).unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Build an unsuccessful envelope with a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_statistics(mut self, statistics: EnvelopeStatistics) -> Self {
        self.statistics = Some(statistics);
        self
    }

    /// Records carried by the envelope, empty if the payload is missing or malformed.
    pub fn records(&self) -> Vec<WorkSessionRecord> {
        normalize_items(&self.data, "records")
    }
}

/// Envelope of the unpaginated `GET /guards` and `GET /sites` listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEnvelope {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub data: Value,

    #[serde(default)]
    pub message: Option<String>,
}

impl ListEnvelope {
    /// Build a successful envelope around a list of entities.
    pub fn ok<T: Serialize>(items: &[T]) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(items).unwrap_or_default(),
            message: None,
        }
    }

    /// Build an unsuccessful envelope with a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Value::Null,
            message: Some(message.into()),
        }
    }

    /// Entities carried by the envelope, empty if the payload is missing or malformed.
    pub fn items<T: DeserializeOwned>(&self, resource: &str) -> Vec<T> {
        normalize_items(&self.data, resource)
    }
}

/// Envelope of `GET /records/statistics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticsEnvelope {
    #[serde(default)]
    pub success: bool,

    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<EnvelopeStatistics>,

    #[serde(default)]
    pub message: Option<String>,
}

impl StatisticsEnvelope {
    /// Statistics, if the envelope succeeded and carried a usable block.
    pub fn into_statistics(self) -> Option<EnvelopeStatistics> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}
