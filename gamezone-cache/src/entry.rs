//! Cache entries and their lifecycle states.

use futures_util::future::{BoxFuture, Shared};
use gamezone_core::ApiError;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::key::QueryKey;

/// Type-erased cached value. Reads downcast back to the caller's type.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// The shared future every caller of one fetch awaits.
pub(crate) type InFlight = Shared<BoxFuture<'static, Result<CachedValue, ApiError>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// A fetch is in flight and no value has been stored yet.
    Pending,
    Success,
    Error,
    /// Invalidated. The stored value, if any, is no longer served.
    Stale,
}

/// One row of the cache table.
pub struct CacheEntry {
    pub(crate) key: QueryKey,
    pub(crate) status: EntryStatus,
    pub(crate) value: Option<CachedValue>,
    pub(crate) error: Option<ApiError>,
    pub(crate) last_fetched_at: Option<Instant>,
    pub(crate) stale_after: Duration,
    pub(crate) last_accessed: Instant,
    pub(crate) in_flight: Option<InFlight>,
    /// Bumped whenever a fetch starts or the entry is invalidated. A fetch
    /// only settles into the entry if the generation it started under is
    /// still current.
    pub(crate) generation: u64,
}

impl CacheEntry {
    pub(crate) fn new(key: QueryKey, now: Instant) -> Self {
        Self {
            key,
            status: EntryStatus::Pending,
            value: None,
            error: None,
            last_fetched_at: None,
            stale_after: Duration::ZERO,
            last_accessed: now,
            in_flight: None,
            generation: 0,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn last_fetched_at(&self) -> Option<Instant> {
        self.last_fetched_at
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub(crate) fn mark_stale(&mut self) {
        self.status = EntryStatus::Stale;
        self.in_flight = None;
        self.generation = self.generation.wrapping_add(1);
    }
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("status", &self.status)
            .field("has_value", &self.value.is_some())
            .field("error", &self.error)
            .field("stale_after", &self.stale_after)
            .field("fetching", &self.in_flight.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}

/// Read-only view of an entry, handed out by `QueryCache::inspect`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySnapshot {
    pub key: QueryKey,
    pub status: EntryStatus,
    pub has_value: bool,
    pub error: Option<ApiError>,
    pub fetching: bool,
    pub stale_after: Duration,
}

impl From<&CacheEntry> for EntrySnapshot {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            key: entry.key.clone(),
            status: entry.status,
            has_value: entry.value.is_some(),
            error: entry.error.clone(),
            fetching: entry.in_flight.is_some(),
            stale_after: entry.stale_after,
        }
    }
}
