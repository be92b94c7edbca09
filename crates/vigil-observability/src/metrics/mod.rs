//! Pipeline counters.
//!
//! [`PipelineMetrics`] is shared by reference across concurrent queries and
//! updated with relaxed atomics; [`MetricsSnapshot`] is the serializable view.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vigil_core::errors::FailureReason;

#[derive(Debug, Default)]
pub struct PipelineMetrics {
    queries: AtomicU64,
    succeeded: AtomicU64,
    cache_hits: AtomicU64,
    coalesced: AtomicU64,
    degraded: AtomicU64,
    total_latency_micros: AtomicU64,
    failures: [AtomicU64; FailureReason::ALL.len()],
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful answer and its end-to-end latency.
    pub fn record_success(&self, cache_hit: bool, degraded: bool, elapsed: Duration) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        if cache_hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        }
        if degraded {
            self.degraded.fetch_add(1, Ordering::Relaxed);
        }
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.total_latency_micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, reason: FailureReason) {
        if let Some(slot) = FailureReason::ALL.iter().position(|r| *r == reason) {
            self.failures[slot].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let succeeded = self.succeeded.load(Ordering::Relaxed);
        let total_latency = self.total_latency_micros.load(Ordering::Relaxed);
        let failures = FailureReason::ALL
            .iter()
            .zip(&self.failures)
            .map(|(reason, count)| (reason.as_str().to_string(), count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();
        MetricsSnapshot {
            queries: self.queries.load(Ordering::Relaxed),
            succeeded,
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
            failures,
            avg_latency_ms: if succeeded == 0 {
                0.0
            } else {
                total_latency as f64 / succeeded as f64 / 1_000.0
            },
        }
    }
}

/// Point-in-time copy of [`PipelineMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub queries: u64,
    pub succeeded: u64,
    pub cache_hits: u64,
    pub coalesced: u64,
    pub degraded: u64,
    /// Failure counts keyed by `FailureReason::as_str`, zero counts omitted.
    pub failures: BTreeMap<String, u64>,
    pub avg_latency_ms: f64,
}

impl MetricsSnapshot {
    pub fn failed(&self) -> u64 {
        self.failures.values().sum()
    }

    pub fn failures_for(&self, reason: FailureReason) -> u64 {
        self.failures.get(reason.as_str()).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_successes_and_failures() {
        let metrics = PipelineMetrics::new();
        metrics.record_query();
        metrics.record_query();
        metrics.record_query();
        metrics.record_success(true, false, Duration::from_millis(2));
        metrics.record_success(false, true, Duration::from_millis(4));
        metrics.record_failure(FailureReason::Timeout);

        let snap = metrics.snapshot();
        assert_eq!(snap.queries, 3);
        assert_eq!(snap.succeeded, 2);
        assert_eq!(snap.cache_hits, 1);
        assert_eq!(snap.degraded, 1);
        assert_eq!(snap.failed(), 1);
        assert_eq!(snap.failures_for(FailureReason::Timeout), 1);
        assert_eq!(snap.failures_for(FailureReason::Rerank), 0);
        assert!((snap.avg_latency_ms - 3.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_serializes_failure_reasons_by_name() {
        let metrics = PipelineMetrics::new();
        metrics.record_failure(FailureReason::Generation);
        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["failures"]["generation"], 1);
    }
}
