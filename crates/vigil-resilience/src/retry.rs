//! Exponential-backoff retry over transient failures.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use vigil_core::clock::IClock;
use vigil_core::config::RetryConfig;
use vigil_core::errors::ResilienceError;

/// Retries an operation while its error is transient.
///
/// Attempt `k` (0-based) that fails is followed by a wait of
/// `min(initial_backoff * multiplier^k, max_backoff)`. After
/// `max_retries + 1` failed attempts the last error is wrapped in
/// `RetryExhausted`. Non-transient errors propagate unchanged.
///
/// `CircuitOpen` is treated specially: if the breaker's cooldown exceeds
/// `max_backoff` there is no point waiting and the policy gives up at once;
/// otherwise it waits out the cooldown (or the scheduled backoff when the
/// rejection carries no cooldown, i.e. a half-open trial is running).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    clock: Arc<dyn IClock>,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig, clock: Arc<dyn IClock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub async fn execute<T, F, Fut>(&self, mut op: F) -> Result<T, ResilienceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ResilienceError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            let err = match op().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempts = attempt + 1, "operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            let attempts = attempt + 1;
            if attempt >= self.config.max_retries {
                warn!(attempts, error = %err, "retry budget exhausted");
                return Err(exhausted(attempts, err));
            }

            let wait = match self.wait_for(attempt, &err) {
                Some(wait) => wait,
                None => {
                    debug!(attempts, error = %err, "breaker cooldown exceeds max backoff, giving up");
                    return Err(exhausted(attempts, err));
                }
            };

            debug!(
                attempt = attempts,
                wait_ms = wait.as_millis() as u64,
                error = %err,
                "transient failure, backing off"
            );
            self.clock.sleep(wait).await;
            attempt += 1;
        }
    }

    fn wait_for(&self, attempt: u32, err: &ResilienceError) -> Option<Duration> {
        match err {
            ResilienceError::CircuitOpen { retry_after, .. } => {
                if *retry_after > self.config.max_backoff() {
                    None
                } else if retry_after.is_zero() {
                    Some(self.config.backoff_delay(attempt))
                } else {
                    Some(*retry_after)
                }
            }
            _ => Some(self.config.backoff_delay(attempt)),
        }
    }
}

fn exhausted(attempts: u32, last: ResilienceError) -> ResilienceError {
    ResilienceError::RetryExhausted {
        attempts,
        last: Box::new(last),
    }
}
