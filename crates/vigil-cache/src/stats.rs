use serde::{Deserialize, Serialize};

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, 0.0 before the first lookup.
    pub hit_rate: f64,
    /// Live entries, including ones that have expired but not been looked up.
    pub size: usize,
    pub capacity: usize,
    pub evictions: u64,
    pub expirations: u64,
}

impl CacheStats {
    pub(crate) fn hit_rate(hits: u64, misses: u64) -> f64 {
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}
