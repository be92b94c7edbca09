use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Query cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of live entries.
    pub capacity: usize,
    /// Entry time-to-live in seconds, measured from creation.
    pub ttl_secs: u64,
    /// Coalesce concurrent misses on the same key into one computation.
    pub single_flight: bool,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::DEFAULT_CACHE_CAPACITY,
            ttl_secs: defaults::DEFAULT_CACHE_TTL_SECS,
            single_flight: defaults::DEFAULT_SINGLE_FLIGHT,
        }
    }
}
