//! Bounded TTL + LRU query cache.
//!
//! All bookkeeping (entries, recency index, counters) lives behind a single
//! mutex, so insert, evict and stat updates are atomic with respect to each
//! other. A poisoned lock wipes the cache instead of failing the caller.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use vigil_core::clock::IClock;
use vigil_core::config::CacheConfig;

use crate::stats::CacheStats;

struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    last_accessed: Instant,
    /// Position in the recency index. Strictly increasing per access.
    tick: u64,
}

struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// tick → key; the first entry is the least recently used.
    recency: BTreeMap<u64, String>,
    next_tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

impl<V> CacheState<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            next_tick: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
            expirations: 0,
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn bump_tick(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(&entry.tick);
        Some(entry)
    }

    /// Mark `key` as accessed at `now`. Returns `false` if absent.
    fn touch(&mut self, key: &str, now: Instant) -> bool {
        let tick = self.bump_tick();
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        self.recency.remove(&entry.tick);
        entry.tick = tick;
        entry.last_accessed = now;
        self.recency.insert(tick, key.to_string());
        true
    }

    fn evict_lru(&mut self) -> Option<String> {
        let (_, key) = self.recency.pop_first()?;
        self.entries.remove(&key);
        self.evictions += 1;
        Some(key)
    }
}

/// Lookup result before stats are applied.
enum Lookup<V> {
    Hit(V),
    Expired,
    Absent,
}

/// Query result cache with a capacity bound, time-to-live and LRU eviction.
pub struct QueryCache<V> {
    capacity: usize,
    ttl: Duration,
    clock: Arc<dyn IClock>,
    state: Mutex<CacheState<V>>,
}

impl<V: Clone> QueryCache<V> {
    /// Create a cache holding at most `capacity` entries (minimum 1) for at
    /// most `ttl` after creation.
    pub fn new(capacity: usize, ttl: Duration, clock: Arc<dyn IClock>) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            clock,
            state: Mutex::new(CacheState::new()),
        }
    }

    pub fn from_config(config: &CacheConfig, clock: Arc<dyn IClock>) -> Self {
        Self::new(config.capacity, config.ttl(), clock)
    }

    /// Look up `key`, counting a hit or a miss.
    ///
    /// An entry older than the TTL is removed and counted as a miss. A live
    /// hit refreshes the entry's last-access time.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut state = self.lock();
        match self.lookup(&mut state, key, now) {
            Lookup::Hit(value) => {
                state.hits += 1;
                Some(value)
            }
            Lookup::Expired | Lookup::Absent => {
                state.misses += 1;
                None
            }
        }
    }

    /// Same as [`get`](Self::get) but leaves the hit/miss counters alone.
    ///
    /// Used when a caller re-checks a key it already counted as a miss.
    pub fn peek(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut state = self.lock();
        match self.lookup(&mut state, key, now) {
            Lookup::Hit(value) => Some(value),
            Lookup::Expired | Lookup::Absent => None,
        }
    }

    /// Insert or overwrite `key`.
    ///
    /// A new key at capacity first evicts the least recently used entry.
    /// Overwriting restarts the entry's TTL and never evicts.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now();
        let mut state = self.lock();

        if let Some(entry) = state.entries.get_mut(&key) {
            entry.value = value;
            entry.created_at = now;
            state.touch(&key, now);
            return;
        }

        if state.entries.len() >= self.capacity {
            if let Some(evicted) = state.evict_lru() {
                debug!(key = %evicted, "evicted least recently used cache entry");
            }
        }

        let tick = state.bump_tick();
        state.recency.insert(tick, key.clone());
        state.entries.insert(
            key,
            CacheEntry {
                value,
                created_at: now,
                last_accessed: now,
                tick,
            },
        );
    }

    /// Remove `key` if present. Does not touch the counters.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Drop every entry and reset all counters to zero.
    pub fn clear(&self) {
        self.lock().reset();
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            hit_rate: CacheStats::hit_rate(state.hits, state.misses),
            size: state.entries.len(),
            capacity: self.capacity,
            evictions: state.evictions,
            expirations: state.expirations,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Last-access time of `key`, without counting as an access.
    pub fn last_accessed(&self, key: &str) -> Option<Instant> {
        self.lock().entries.get(key).map(|e| e.last_accessed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lookup(&self, state: &mut CacheState<V>, key: &str, now: Instant) -> Lookup<V> {
        let expired = match state.entries.get(key) {
            None => return Lookup::Absent,
            Some(entry) => now.saturating_duration_since(entry.created_at) > self.ttl,
        };

        if expired {
            state.remove(key);
            state.expirations += 1;
            debug!(key, "cache entry expired");
            return Lookup::Expired;
        }

        state.touch(key, now);
        match state.entries.get(key) {
            Some(entry) => Lookup::Hit(entry.value.clone()),
            None => Lookup::Absent,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<V>> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("query cache lock poisoned, discarding all entries");
                let mut guard = poisoned.into_inner();
                guard.reset();
                self.state.clear_poison();
                guard
            }
        }
    }
}

impl<V> std::fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
