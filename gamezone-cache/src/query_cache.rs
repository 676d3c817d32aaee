//! Read-through query cache with request de-duplication.
//!
//! Routes reads based on the caller's [`Freshness`], joins concurrent reads
//! of the same key onto one fetch, and lets mutations mark affected keys
//! stale by prefix.

use futures_util::FutureExt;
use gamezone_core::{ApiError, ApiResult};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::entry::{CacheEntry, CachedValue, EntrySnapshot, EntryStatus};
use crate::freshness::{CacheRead, Freshness, ReadSource};
use crate::key::QueryKey;

/// Configuration for the query cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Entries kept before least-recently-used eviction kicks in.
    pub max_entries: usize,
    /// Window used by [`QueryCache::read_default`].
    pub default_stale_after: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 512,
            default_stale_after: Duration::ZERO,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    pub fn with_default_stale_after(mut self, window: Duration) -> Self {
        self.default_stale_after = window;
        self
    }
}

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from a fresh entry.
    pub hits: u64,
    /// Reads that issued a fetch.
    pub misses: u64,
    /// Reads that joined a fetch already in flight.
    pub joined: u64,
    /// Reads skipped because the key was disabled.
    pub disabled: u64,
    pub mutations: u64,
    /// Entries marked stale by invalidation.
    pub invalidated: u64,
    pub evictions: u64,
    pub entry_count: u64,
}

impl CacheStats {
    /// Share of issued reads that avoided a network call (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.joined;
        if total == 0 {
            0.0
        } else {
            (self.hits + self.joined) as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    joined: AtomicU64,
    disabled: AtomicU64,
    mutations: AtomicU64,
    invalidated: AtomicU64,
    evictions: AtomicU64,
}

struct Inner {
    table: Mutex<HashMap<QueryKey, CacheEntry>>,
    counters: Counters,
    config: CacheConfig,
}

/// Process-wide keyed cache of asynchronous reads.
///
/// Cheap to clone; clones share the same table.
///
/// ```ignore
/// let games = cache
///     .read(&keys::games::list(&params), Freshness::minutes(5), move || {
///         let api = api.clone();
///         async move { api.games().list(&params).await }
///     })
///     .await?;
/// ```
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.inner.config)
            .field("entries", &self.len())
            .finish()
    }
}

enum Plan {
    Hit(CacheRead<CachedValue>),
    Await {
        in_flight: crate::entry::InFlight,
        generation: u64,
        source: ReadSource,
    },
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                table: Mutex::new(HashMap::new()),
                counters: Counters::default(),
                config,
            }),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    fn table(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        // The table is never left half-updated across a panic, so a poisoned
        // lock is still consistent.
        self.inner
            .table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Read `key`, fetching through `fetcher` unless a fresh value is cached.
    ///
    /// - Disabled key (blank id): returns `Ok(None)` without calling `fetcher`.
    /// - Fresh success under `freshness`: returns the cached value, no fetch.
    /// - Fetch already in flight for `key`: joins it, no second fetch.
    /// - Otherwise: issues the fetch and stores the outcome. Failures are
    ///   stored and surfaced as-is; retrying is the HTTP layer's job.
    pub async fn read<T, F, Fut>(
        &self,
        key: &QueryKey,
        freshness: Freshness,
        fetcher: F,
    ) -> ApiResult<Option<CacheRead<T>>>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        if !key.is_enabled() {
            self.inner.counters.disabled.fetch_add(1, Ordering::Relaxed);
            debug!(%key, "query disabled");
            return Ok(None);
        }

        let plan = self.plan_read(key, freshness, fetcher);
        let (in_flight, generation, source) = match plan {
            Plan::Hit(read) => {
                let fetched_at = read.fetched_at();
                let value = downcast::<T>(key, read.into_value())?;
                return Ok(Some(CacheRead::new(value, fetched_at, ReadSource::Cache)));
            }
            Plan::Await {
                in_flight,
                generation,
                source,
            } => (in_flight, generation, source),
        };

        let outcome = in_flight.await;
        let fetched_at = self.settle(key, generation, freshness, &outcome);

        let value = outcome?;
        Ok(Some(CacheRead::new(downcast::<T>(key, value)?, fetched_at, source)))
    }

    /// [`QueryCache::read`] with the configured default staleness window.
    pub async fn read_default<T, F, Fut>(
        &self,
        key: &QueryKey,
        fetcher: F,
    ) -> ApiResult<Option<CacheRead<T>>>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let freshness = Freshness::stale_after(self.inner.config.default_stale_after);
        self.read(key, freshness, fetcher).await
    }

    fn plan_read<T, F, Fut>(&self, key: &QueryKey, freshness: Freshness, fetcher: F) -> Plan
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let mut table = self.table();
        let now = Instant::now();
        let inserted = !table.contains_key(key);
        let entry = table
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::new(key.clone(), now));
        entry.last_accessed = now;

        if let Some(in_flight) = &entry.in_flight {
            self.inner.counters.joined.fetch_add(1, Ordering::Relaxed);
            debug!(%key, "joining in-flight query");
            return Plan::Await {
                in_flight: in_flight.clone(),
                generation: entry.generation,
                source: ReadSource::Joined,
            };
        }

        if entry.status == EntryStatus::Success {
            if let (Some(value), Some(fetched_at)) = (&entry.value, entry.last_fetched_at) {
                if freshness.admits(fetched_at, now) && value.is::<T>() {
                    self.inner.counters.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(%key, "query cache hit");
                    return Plan::Hit(CacheRead::new(value.clone(), fetched_at, ReadSource::Cache));
                }
            }
        }

        self.inner.counters.misses.fetch_add(1, Ordering::Relaxed);
        debug!(%key, status = ?entry.status, "query cache miss, fetching");

        let in_flight = fetcher()
            .map(|result| result.map(|value| Arc::new(value) as CachedValue))
            .boxed()
            .shared();
        entry.generation = entry.generation.wrapping_add(1);
        entry.in_flight = Some(in_flight.clone());
        entry.status = EntryStatus::Pending;
        let generation = entry.generation;

        if inserted {
            self.evict_over_capacity(&mut table);
        }

        Plan::Await {
            in_flight,
            generation,
            source: ReadSource::Fetch,
        }
    }

    /// Store a finished fetch, unless the entry was invalidated or refetched
    /// meanwhile. Returns the timestamp to report for the value.
    fn settle(
        &self,
        key: &QueryKey,
        generation: u64,
        freshness: Freshness,
        outcome: &Result<CachedValue, ApiError>,
    ) -> Instant {
        let now = Instant::now();
        let mut table = self.table();
        let Some(entry) = table.get_mut(key) else {
            return now;
        };
        if entry.generation != generation || entry.in_flight.is_none() {
            return entry.last_fetched_at.unwrap_or(now);
        }

        entry.in_flight = None;
        match outcome {
            Ok(value) => {
                entry.status = EntryStatus::Success;
                entry.value = Some(value.clone());
                entry.error = None;
                entry.last_fetched_at = Some(now);
                entry.stale_after = freshness.window();
            }
            Err(err) => {
                debug!(%key, error = %err, "query failed");
                entry.status = EntryStatus::Error;
                entry.error = Some(err.clone());
            }
        }
        now
    }

    /// Drop least-recently-used entries until the table fits. Entries with a
    /// fetch in flight are kept so joined callers still settle.
    fn evict_over_capacity(&self, table: &mut HashMap<QueryKey, CacheEntry>) {
        let max = self.inner.config.max_entries.max(1);
        while table.len() > max {
            let victim = table
                .values()
                .filter(|entry| entry.in_flight.is_none())
                .min_by_key(|entry| entry.last_accessed)
                .map(|entry| entry.key.clone());
            let Some(victim) = victim else {
                break;
            };
            table.remove(&victim);
            self.inner.counters.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(key = %victim, "evicted query");
        }
    }

    /// Run a mutation. Never consults or fills the cache.
    pub async fn mutate<T, F, Fut>(&self, mutation: F) -> ApiResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        self.inner.counters.mutations.fetch_add(1, Ordering::Relaxed);
        mutation().await
    }

    /// Run a mutation and, only if it succeeded, invalidate `affected`.
    pub async fn mutate_and_invalidate<T, F, Fut>(
        &self,
        affected: &[QueryKey],
        mutation: F,
    ) -> ApiResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let value = self.mutate(mutation).await?;
        self.invalidate_all(affected);
        Ok(value)
    }

    /// Mark every entry under `prefix` stale. No fetch is issued; the next
    /// read of a matching key behaves as a miss. Returns the number of
    /// entries marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut table = self.table();
        let mut count = 0;
        for entry in table.values_mut().filter(|e| e.key.starts_with(prefix)) {
            entry.mark_stale();
            count += 1;
        }
        self.inner
            .counters
            .invalidated
            .fetch_add(count as u64, Ordering::Relaxed);
        debug!(%prefix, count, "invalidated queries");
        count
    }

    pub fn invalidate_all(&self, prefixes: &[QueryKey]) -> usize {
        prefixes.iter().map(|prefix| self.invalidate(prefix)).sum()
    }

    /// Remove every entry under `prefix` outright.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let mut table = self.table();
        let before = table.len();
        table.retain(|key, _| !key.starts_with(prefix));
        before - table.len()
    }

    pub fn clear(&self) {
        self.table().clear();
    }

    /// The last stored value for `key`, fresh or not.
    pub fn peek<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let table = self.table();
        let value = table.get(key)?.value.clone()?;
        value.downcast::<T>().ok().map(|typed| (*typed).clone())
    }

    pub fn status(&self, key: &QueryKey) -> Option<EntryStatus> {
        self.table().get(key).map(CacheEntry::status)
    }

    pub fn inspect(&self, key: &QueryKey) -> Option<EntrySnapshot> {
        self.table().get(key).map(EntrySnapshot::from)
    }

    /// True while any entry under `prefix` has a fetch in flight.
    pub fn is_fetching(&self, prefix: &QueryKey) -> bool {
        self.table()
            .values()
            .any(|entry| entry.key.starts_with(prefix) && entry.is_fetching())
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let counters = &self.inner.counters;
        CacheStats {
            hits: counters.hits.load(Ordering::Relaxed),
            misses: counters.misses.load(Ordering::Relaxed),
            joined: counters.joined.load(Ordering::Relaxed),
            disabled: counters.disabled.load(Ordering::Relaxed),
            mutations: counters.mutations.load(Ordering::Relaxed),
            invalidated: counters.invalidated.load(Ordering::Relaxed),
            evictions: counters.evictions.load(Ordering::Relaxed),
            entry_count: self.len() as u64,
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn downcast<T>(key: &QueryKey, value: CachedValue) -> ApiResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    value
        .downcast::<T>()
        .map(|typed| (*typed).clone())
        .map_err(|_| ApiError::InvalidRequest {
            reason: format!("cached value for {} has a different type", key),
        })
}
