//! Query cache with explicit staleness contracts.
//!
//! Reads are keyed by structured [`QueryKey`]s partitioned by resource kind.
//! Callers state their staleness tolerance with [`Freshness`] and get back a
//! [`CacheRead<T>`] saying how the read was satisfied. Concurrent reads of
//! one key share a single fetch; mutations mark affected keys stale by
//! prefix instead of refetching eagerly.
//!
//! # Example
//!
//! ```ignore
//! let key = QueryKey::new("games").push("detail").push(id.as_str());
//! let game = cache
//!     .read(&key, Freshness::Always, move || async move { api.games().get(&id).await })
//!     .await?;
//!
//! // After a purchase:
//! cache.invalidate(&QueryKey::new("transactions"));
//! ```

pub mod entry;
pub mod freshness;
pub mod key;
pub mod query_cache;

pub use entry::{CacheEntry, CachedValue, EntrySnapshot, EntryStatus};
pub use freshness::{CacheRead, Freshness, ReadSource};
pub use key::{KeySegment, QueryKey};
pub use query_cache::{CacheConfig, CacheStats, QueryCache};
