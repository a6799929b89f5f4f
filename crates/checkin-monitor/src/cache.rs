//! Time-bounded cache of composite fetch results.
//!
//! Entries are keyed by [`QueryDescriptor::cache_key`](crate::QueryDescriptor::cache_key)
//! and usable while younger than the TTL. Reads never delete; expired
//! entries are dropped by [`RequestCache::sweep`], which the orchestrator
//! runs after every fresh fetch.

use std::collections::HashMap;
use std::time::Duration;

use checkin_core::{EnvelopeStatistics, Guard, Pagination, Site, WorkSessionRecord};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Default time-to-live for cache entries.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Everything one fetch cycle retrieved, after envelope normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeResult {
    pub records: Vec<WorkSessionRecord>,
    pub pagination: Option<Pagination>,
    /// Statistics block embedded in the records envelope.
    pub envelope_statistics: Option<EnvelopeStatistics>,
    /// Statistics from the dedicated all-rows endpoint.
    pub complete_statistics: Option<EnvelopeStatistics>,
    pub guards: Vec<Guard>,
    pub sites: Vec<Site>,
}

/// A cached composite result and when it was captured.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: CompositeResult,
    pub captured_at: Instant,
}

impl CacheEntry {
    /// Whether the entry is still usable at `now`.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.captured_at) < ttl
    }
}

/// Process-wide cache shared by every fetch cycle.
///
/// Writes replace whole entries, so a reader never observes a partial payload.
#[derive(Debug)]
pub struct RequestCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl RequestCache {
    /// Create an empty cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a fresh entry.
    pub async fn get(&self, key: &str) -> Option<CompositeResult> {
        self.get_at(key, Instant::now()).await
    }

    /// Look up an entry that is fresh at `now`.
    pub async fn get_at(&self, key: &str, now: Instant) -> Option<CompositeResult> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now, self.ttl) => {
                debug!("Cache hit: {}", key);
                Some(entry.payload.clone())
            }
            Some(_) => {
                debug!("Cache entry expired: {}", key);
                None
            }
            None => {
                debug!("Cache miss: {}", key);
                None
            }
        }
    }

    /// Store a payload captured now.
    pub async fn put(&self, key: impl Into<String>, payload: CompositeResult) {
        self.put_at(key, payload, Instant::now()).await
    }

    /// Store a payload captured at `captured_at`, replacing any previous entry.
    pub async fn put_at(&self, key: impl Into<String>, payload: CompositeResult, captured_at: Instant) {
        self.entries.write().await.insert(
            key.into(),
            CacheEntry {
                payload,
                captured_at,
            },
        );
    }

    /// Remove every entry expired at `now`. Returns the number removed.
    pub async fn sweep(&self, now: Instant) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Cache sweep removed {} expired entries", removed);
        }
        removed
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
