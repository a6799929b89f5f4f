//! Guard check-in records API client library.
//!
//! This crate provides a Rust client for the records backend over HTTP. It
//! implements [`checkin_core::RecordSource`] for:
//!
//! - `GET /records` - paginated, filtered work session records
//! - `GET /records/statistics` - counts across every matching row
//! - `GET /guards` and `GET /sites` - unpaginated entity listings
//!
//! # Example
//!
//! ```no_run
//! use checkin_api::{ApiConfig, CheckinClient};
//! use checkin_core::RecordQuery;
//!
//! # async fn example() -> Result<(), checkin_api::ApiError> {
//! let config = ApiConfig::with_token("https://guards.example.com/api", "secret");
//! let client = CheckinClient::new(config)?;
//!
//! let envelope = client.records(&RecordQuery::default()).await?;
//! println!("{} records on this page", envelope.records().len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::CheckinClient;
pub use config::ApiConfig;
pub use error::ApiError;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
