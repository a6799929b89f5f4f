//! Check-in record retrieval pipeline for the guard monitoring dashboard.
//!
//! This crate sits between the paginated records API and the display layer.
//! It provides:
//!
//! - [`QueryDescriptor`] - filter state translated into request parameters and a cache key
//! - [`RequestCache`] - TTL-bounded cache of composite fetch results
//! - [`FetchOrchestrator`] - one fetch cycle: cache, parallel fetch, enrichment, statistics
//! - [`enrich`] - guard/site join with geofence distance
//! - [`reconcile`] - tiered statistics resolution with a provenance flag
//! - [`DashboardController`] - debounced triggers publishing a [`DashboardView`]
//!
//! # Architecture
//!
//! ```text
//! filter change
//!      ↓
//! ┌────────────────────────────────────────────────────────┐
//! │                 DASHBOARD CONTROLLER                   │
//! │  debounce (300 ms) → sequence number → orchestrator    │
//! │         ↓                                              │
//! │  QueryDescriptor → RequestCache ── hit ──┐             │
//! │         ↓ miss                           │             │
//! │  records ║ guards ║ sites ║ statistics   │             │
//! │         ↓                                │             │
//! │  cache store + sweep                     │             │
//! │         ↓                                ↓             │
//! │  enrichment join → statistics reconciler               │
//! │         ↓                                              │
//! │  publish view (newest cycle only)                      │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use checkin_api::CheckinClient;
//! use checkin_monitor::{
//!     DashboardController, FetchOrchestrator, FilterState, MonitorConfig, PaginationState,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitorConfig::from_env()?;
//! let client = CheckinClient::new(config.api_config())?;
//! let controller = DashboardController::new(FetchOrchestrator::new(client));
//!
//! let view = controller
//!     .refresh(FilterState::default(), PaginationState::default())
//!     .await;
//! println!("{} records, {:?}", view.records.len(), view.statistics.provenance());
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod controller;
mod enrich;
mod error;
mod orchestrator;
mod query;
mod statistics;
mod view;

pub use cache::{CacheEntry, CompositeResult, RequestCache, DEFAULT_CACHE_TTL};
pub use config::MonitorConfig;
pub use controller::{DashboardController, DEFAULT_DEBOUNCE};
pub use enrich::{enrich, EnrichedRecord, DEFAULT_ALLOWED_RADIUS_METERS};
pub use error::{classify_error, MonitorError, CONNECTIVITY_MESSAGE, SESSION_EXPIRED_MESSAGE};
pub use orchestrator::{DashboardData, FetchOrchestrator};
pub use query::{format_local, DateRange, FilterState, PaginationState, QueryDescriptor};
pub use statistics::{
    reconcile, Provenance, ReconciledStatistics, Resolver, StatisticsInputs, StatisticsSummary,
    RESOLVERS,
};
pub use view::DashboardView;

// Re-export core types for convenience
pub use checkin_core::{CheckInStatus, SortOrder};
