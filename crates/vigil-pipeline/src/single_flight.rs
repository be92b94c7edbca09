//! Per-key async gate that serializes concurrent misses on the same query.
//!
//! The first caller for a key computes; later callers wait on the same lock
//! and re-check the cache once it is released. Entries are removed when the
//! last holder lets go, so the map only ever holds keys with work in flight.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct SingleFlight {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held while a caller owns a key. Releasing it wakes the next waiter.
#[derive(Debug)]
pub struct FlightGuard<'a> {
    owner: &'a SingleFlight,
    key: String,
    _held: OwnedMutexGuard<()>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other caller holds `key`, then hold it.
    pub async fn acquire(&self, key: &str) -> FlightGuard<'_> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let held = lock.lock_owned().await;
        FlightGuard {
            owner: self,
            key: key.to_string(),
            _held: held,
        }
    }

    /// Keys with a holder or waiters.
    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        // One reference in the map, one in this guard: nobody else is waiting.
        self.owner
            .locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) <= 2);
    }
}
