//! Structured log events for key pipeline operations.
//!
//! Each function emits a `tracing` event with an `event` field naming it.

use std::time::Duration;

/// A query was answered from the cache.
pub fn cache_hit(cache_key: &str) {
    tracing::debug!(event = "cache_hit", cache_key = %cache_key, "answer served from cache");
}

/// A single-flight follower reused the leader's answer.
pub fn query_coalesced(cache_key: &str) {
    tracing::debug!(
        event = "query_coalesced",
        cache_key = %cache_key,
        "concurrent miss coalesced onto in-flight query"
    );
}

/// A subsystem fell back to a lower-quality mode.
pub fn degradation_triggered(component: &str, reason: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        reason = %reason,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

/// A circuit breaker changed state. Opening is a warning, everything else info.
pub fn circuit_transition(breaker: &str, from: &str, to: &str, consecutive_failures: u32) {
    if to == "open" {
        tracing::warn!(
            event = "circuit_transition",
            breaker = %breaker,
            from = %from,
            to = %to,
            consecutive_failures,
            "circuit breaker opened"
        );
    } else {
        tracing::info!(
            event = "circuit_transition",
            breaker = %breaker,
            from = %from,
            to = %to,
            "circuit breaker transition"
        );
    }
}

/// A query finished successfully.
pub fn query_completed(documents: usize, cache_hit: bool, degraded: bool, elapsed: Duration) {
    tracing::info!(
        event = "query_completed",
        documents,
        cache_hit,
        degraded,
        elapsed_ms = elapsed.as_millis() as u64,
        "query completed"
    );
}

/// A query failed with a stable reason.
pub fn query_failed(reason: &str, error: &str) {
    tracing::warn!(
        event = "query_failed",
        reason = %reason,
        error = %error,
        "query failed"
    );
}
