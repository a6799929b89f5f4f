//! Core types and traits for the guard check-in monitoring pipeline.
//!
//! This crate provides the shared vocabulary used by the HTTP client and the
//! monitoring pipeline. It defines:
//!
//! - [`WorkSessionRecord`], [`Guard`], [`Site`] - the three upstream resources
//! - [`RecordsEnvelope`] / [`ListEnvelope`] - response envelopes and their normalization
//! - [`RecordSource`] - the trait every record backend implements
//! - [`SourceError`] - error types for source operations
//! - [`distance_meters`] - great-circle distance between two coordinates
//!
//! # Example
//!
//! ```rust
//! use checkin_core::{CheckInStatus, distance_meters};
//!
//! assert_eq!(CheckInStatus::normalize("SUCCESS"), CheckInStatus::Success);
//! assert_eq!(distance_meters(51.5, -0.12, 51.5, -0.12), 0.0);
//! ```

mod distance;
mod envelope;
mod error;
mod record;
mod source;

pub use distance::{distance_meters, EARTH_RADIUS_METERS};
pub use envelope::{
    EnvelopeStatistics, ListEnvelope, Pagination, RecordsEnvelope, StatisticsEnvelope,
};
pub use error::SourceError;
pub use record::{CheckInStatus, Guard, SessionStatus, Site, WorkSessionRecord};
pub use source::{RecordQuery, RecordSource, SortOrder};

// Re-export async_trait for implementors
pub use async_trait::async_trait;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
