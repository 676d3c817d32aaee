//! Freshness contracts for cache reads.
//!
//! Callers state how old a cached value may be before it must be refetched,
//! and every read comes back wrapped in a [`CacheRead`] that says whether the
//! value came from the cache, from a fresh fetch, or from a fetch another
//! caller had already started.

use std::time::Duration;
use tokio::time::Instant;

/// Staleness tolerance for a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Serve a cached success younger than the window; otherwise refetch.
    StaleAfter(Duration),

    /// Always fetch, but still join an in-flight fetch for the same key.
    Always,
}

impl Default for Freshness {
    fn default() -> Self {
        Self::Always
    }
}

impl Freshness {
    pub fn stale_after(window: Duration) -> Self {
        if window.is_zero() {
            Self::Always
        } else {
            Self::StaleAfter(window)
        }
    }

    pub fn minutes(minutes: u64) -> Self {
        Self::stale_after(Duration::from_secs(minutes * 60))
    }

    /// The staleness window; zero for [`Freshness::Always`].
    pub fn window(&self) -> Duration {
        match self {
            Self::StaleAfter(window) => *window,
            Self::Always => Duration::ZERO,
        }
    }

    /// Whether a value fetched at `fetched_at` may still be served at `now`.
    pub fn admits(&self, fetched_at: Instant, now: Instant) -> bool {
        match self {
            Self::StaleAfter(window) => now.saturating_duration_since(fetched_at) < *window,
            Self::Always => false,
        }
    }
}

/// How a [`CacheRead`] was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    /// Served from a fresh entry without a fetch.
    Cache,
    /// This caller issued the fetch.
    Fetch,
    /// This caller joined a fetch another caller had already issued.
    Joined,
}

/// Result of a cache read, carrying staleness metadata.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    value: T,
    fetched_at: Instant,
    source: ReadSource,
}

impl<T> CacheRead<T> {
    pub fn new(value: T, fetched_at: Instant, source: ReadSource) -> Self {
        Self {
            value,
            fetched_at,
            source,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn source(&self) -> ReadSource {
        self.source
    }

    pub fn was_cache_hit(&self) -> bool {
        self.source == ReadSource::Cache
    }

    /// Fetched by this caller or joined; either way the network was hit.
    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit()
    }

    pub fn fetched_at(&self) -> Instant {
        self.fetched_at
    }

    /// Time since the value was fetched.
    pub fn staleness(&self) -> Duration {
        Instant::now().saturating_duration_since(self.fetched_at)
    }

    pub fn map<U, F>(self, f: F) -> CacheRead<U>
    where
        F: FnOnce(T) -> U,
    {
        CacheRead {
            value: f(self.value),
            fetched_at: self.fetched_at,
            source: self.source,
        }
    }
}

impl<T> AsRef<T> for CacheRead<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_window_is_always() {
        assert_eq!(Freshness::stale_after(Duration::ZERO), Freshness::Always);
        assert_eq!(Freshness::minutes(5).window(), Duration::from_secs(300));
        assert_eq!(Freshness::default(), Freshness::Always);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admits_within_window_only() {
        let freshness = Freshness::stale_after(Duration::from_secs(60));
        let fetched_at = Instant::now();
        assert!(freshness.admits(fetched_at, Instant::now()));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(!freshness.admits(fetched_at, Instant::now()));
        assert!(!Freshness::Always.admits(fetched_at, fetched_at));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_read_staleness_and_map() {
        let read = CacheRead::new(42i32, Instant::now(), ReadSource::Fetch);
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(read.staleness(), Duration::from_secs(5));
        assert!(read.was_cache_miss());

        let mapped = read.map(|v| v.to_string());
        assert_eq!(mapped.into_value(), "42");
    }
}
