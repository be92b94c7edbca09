use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{defaults, saturating_secs};

/// Circuit breaker thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive transient failures that open a closed breaker.
    pub failure_threshold: u32,
    /// Consecutive half-open successes that close the breaker.
    pub success_threshold: u32,
    /// Cooldown before an open breaker admits a trial.
    pub reset_timeout_secs: f64,
}

impl CircuitBreakerConfig {
    pub fn reset_timeout(&self) -> Duration {
        saturating_secs(self.reset_timeout_secs)
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: defaults::DEFAULT_FAILURE_THRESHOLD,
            success_threshold: defaults::DEFAULT_SUCCESS_THRESHOLD,
            reset_timeout_secs: defaults::DEFAULT_RESET_TIMEOUT_SECS,
        }
    }
}

/// Exponential backoff retry parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt (3 means up to 4 attempts).
    pub max_retries: u32,
    pub initial_backoff_secs: f64,
    pub max_backoff_secs: f64,
    pub multiplier: f64,
}

impl RetryConfig {
    pub fn initial_backoff(&self) -> Duration {
        saturating_secs(self.initial_backoff_secs)
    }

    pub fn max_backoff(&self) -> Duration {
        saturating_secs(self.max_backoff_secs)
    }

    /// Wait before the attempt following 0-indexed attempt `attempt`:
    /// `min(initial * multiplier^attempt, max)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay = self.initial_backoff_secs * self.multiplier.powi(exponent);
        saturating_secs(delay.min(self.max_backoff_secs))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            initial_backoff_secs: defaults::DEFAULT_INITIAL_BACKOFF_SECS,
            max_backoff_secs: defaults::DEFAULT_MAX_BACKOFF_SECS,
            multiplier: defaults::DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}
