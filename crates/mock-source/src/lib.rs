//! Mock record sources for exercising the monitoring pipeline without a backend.
//!
//! This crate provides implementations of the `RecordSource` trait for testing:
//! - `StaticSource` - Serves fixed guards, sites and records with server-side filtering
//! - `FailingSource` - Fails every request with a fixed error
//! - `DelayedSource` - Wraps another source with artificial latency
//!
//! For a real backend, use the `checkin-api` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_source::{Guard, RecordQuery, RecordSource, Site, StaticSource, WorkSessionRecord};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_source::SourceError> {
//!     let source = StaticSource::new(
//!         vec![WorkSessionRecord::new("r1", "g1", "s1").with_status("success")],
//!         vec![Guard::new("g1", "Ada")],
//!         vec![Site::new("s1", "Depot", 51.5, -0.12)],
//!     );
//!
//!     let envelope = source.fetch_records(&RecordQuery::default()).await?;
//!     assert_eq!(envelope.records().len(), 1);
//!     Ok(())
//! }
//! ```

mod delayed;
mod failing;
mod fixed;

// Re-export checkin-core types for convenience
pub use checkin_core::{
    async_trait, Guard, ListEnvelope, RecordQuery, RecordSource, RecordsEnvelope, Site,
    SourceError, StatisticsEnvelope, WorkSessionRecord,
};

pub use delayed::DelayedSource;
pub use failing::FailingSource;
pub use fixed::{Resource, StaticSource};
