//! Cache key derivation.
//!
//! Queries that differ only in case or whitespace share a key; any difference
//! in filters produces a different key.

use vigil_core::constants::CACHE_KEY_SEPARATOR;
use vigil_core::models::Filters;

/// Case-fold and collapse whitespace runs into single spaces.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stable blake3 hex digest over the normalized query and canonical filters.
pub fn cache_key(query: &str, filters: &Filters) -> String {
    // BTreeMap serializes with sorted keys, so this is canonical.
    let canonical_filters = serde_json::to_string(filters).unwrap_or_default();

    let mut hasher = blake3::Hasher::new();
    hasher.update(normalize_query(query).as_bytes());
    let mut sep = [0u8; 4];
    hasher.update(CACHE_KEY_SEPARATOR.encode_utf8(&mut sep).as_bytes());
    hasher.update(canonical_filters.as_bytes());
    hasher.finalize().to_hex().to_string()
}
