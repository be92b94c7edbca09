//! Configuration for every Vigil subsystem.
//!
//! Each section deserializes with `#[serde(default)]`, so a partial TOML file
//! only overrides what it names. Defaults live in [`defaults`].

pub mod cache_config;
pub mod defaults;
pub mod observability_config;
pub mod pipeline_config;
pub mod rerank_config;
pub mod resilience_config;
pub mod retrieval_config;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use cache_config::CacheConfig;
pub use observability_config::ObservabilityConfig;
pub use pipeline_config::PipelineConfig;
pub use rerank_config::RerankConfig;
pub use resilience_config::{CircuitBreakerConfig, RetryConfig};
pub use retrieval_config::{Normalization, RetrievalConfig};

use crate::constants::WEIGHT_SUM_TOLERANCE;
use crate::errors::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VigilConfig {
    pub retrieval: RetrievalConfig,
    pub rerank: RerankConfig,
    pub cache: CacheConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub retry: RetryConfig,
    pub pipeline: PipelineConfig,
    pub observability: ObservabilityConfig,
}

impl VigilConfig {
    /// Parse and validate a TOML document. Missing sections and fields fall
    /// back to their defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&source)
    }

    /// Check cross-field invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.retrieval;
        if !(r.semantic_weight >= 0.0 && r.lexical_weight >= 0.0) {
            return Err(invalid(
                "retrieval.semantic_weight",
                "fusion weights must be non-negative",
            ));
        }
        if ((r.semantic_weight + r.lexical_weight) - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(invalid(
                "retrieval.lexical_weight",
                format!(
                    "fusion weights must sum to 1.0, got {} + {}",
                    r.semantic_weight, r.lexical_weight
                ),
            ));
        }
        if r.top_n == 0 {
            return Err(invalid("retrieval.top_n", "must be at least 1"));
        }
        if r.candidate_pool < r.top_n {
            return Err(invalid(
                "retrieval.candidate_pool",
                format!(
                    "candidate pool {} is smaller than top_n {}",
                    r.candidate_pool, r.top_n
                ),
            ));
        }
        if self.rerank.top_k == 0 {
            return Err(invalid("rerank.top_k", "must be at least 1"));
        }
        if self.cache.capacity == 0 {
            return Err(invalid("cache.capacity", "must be at least 1"));
        }
        let cb = &self.circuit_breaker;
        if cb.failure_threshold == 0 {
            return Err(invalid("circuit_breaker.failure_threshold", "must be at least 1"));
        }
        if cb.success_threshold == 0 {
            return Err(invalid("circuit_breaker.success_threshold", "must be at least 1"));
        }
        if !(cb.reset_timeout_secs.is_finite() && cb.reset_timeout_secs >= 0.0) {
            return Err(invalid(
                "circuit_breaker.reset_timeout_secs",
                "must be a finite, non-negative number of seconds",
            ));
        }
        representable("circuit_breaker.reset_timeout_secs", cb.reset_timeout_secs)?;
        let retry = &self.retry;
        if !(retry.multiplier.is_finite() && retry.multiplier >= 1.0) {
            return Err(invalid("retry.multiplier", "must be finite and >= 1.0"));
        }
        if !(retry.initial_backoff_secs.is_finite() && retry.initial_backoff_secs >= 0.0) {
            return Err(invalid("retry.initial_backoff_secs", "must be finite and >= 0"));
        }
        if !(retry.max_backoff_secs.is_finite()
            && retry.max_backoff_secs >= retry.initial_backoff_secs)
        {
            return Err(invalid(
                "retry.max_backoff_secs",
                "must be finite and >= initial_backoff_secs",
            ));
        }
        representable("retry.initial_backoff_secs", retry.initial_backoff_secs)?;
        representable("retry.max_backoff_secs", retry.max_backoff_secs)?;
        if let Some(deadline) = self.pipeline.default_deadline_secs {
            if !(deadline.is_finite() && deadline > 0.0) {
                return Err(invalid(
                    "pipeline.default_deadline_secs",
                    "must be a positive number of seconds",
                ));
            }
            representable("pipeline.default_deadline_secs", deadline)?;
        }
        Ok(())
    }
}

/// Seconds as a `Duration`, clamped to `[0, Duration::MAX]`. NaN maps to zero.
pub(crate) fn saturating_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

fn representable(field: &str, secs: f64) -> Result<(), ConfigError> {
    Duration::try_from_secs_f64(secs)
        .map(|_| ())
        .map_err(|_| invalid(field, format!("{secs} seconds exceeds the longest duration")))
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}
