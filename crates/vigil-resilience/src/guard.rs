use std::future::Future;
use std::sync::Arc;

use vigil_core::clock::IClock;
use vigil_core::config::{CircuitBreakerConfig, RetryConfig};
use vigil_core::errors::{RemoteError, ResilienceError};

use crate::circuit_breaker::CircuitBreaker;
use crate::retry::RetryPolicy;

/// Retry policy wrapped around a circuit breaker.
///
/// Each attempt goes through the breaker, so a breaker that opens mid-retry
/// short-circuits the remaining attempts instead of hammering the dependency.
#[derive(Debug, Clone)]
pub struct ResilienceGuard {
    retry: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
}

impl ResilienceGuard {
    pub fn new(retry: RetryPolicy, breaker: Arc<CircuitBreaker>) -> Self {
        Self { retry, breaker }
    }

    /// Build a guard with a fresh breaker named `name`.
    pub fn from_config(
        name: impl Into<String>,
        breaker: &CircuitBreakerConfig,
        retry: &RetryConfig,
        clock: Arc<dyn IClock>,
    ) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(name, breaker.clone(), clock.clone()));
        Self::new(RetryPolicy::new(retry.clone(), clock), breaker)
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub async fn call<T, F, Fut>(&self, mut op: F) -> Result<T, ResilienceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let breaker = &self.breaker;
        self.retry
            .execute(move || {
                let attempt = op();
                breaker.execute(move || attempt)
            })
            .await
    }
}
