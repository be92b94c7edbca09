//! # vigil-cache
//!
//! In-memory query cache keyed by a normalized query + filter digest.
//!
//! ## Architecture
//!
//! ```text
//! QueryCache<V>
//! ├── entries   (key → value, created_at, last_accessed)
//! ├── recency   (access tick → key, oldest first)
//! └── stats     (hits, misses, evictions, expirations)
//! ```
//!
//! Expiry is lazy: a stale entry is only noticed, removed and counted as a
//! miss when it is looked up. Eviction is LRU by last access.

pub mod key;
pub mod query_cache;
pub mod stats;

pub use key::{cache_key, normalize_query};
pub use query_cache::QueryCache;
pub use stats::CacheStats;
