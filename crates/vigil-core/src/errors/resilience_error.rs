use std::time::Duration;

use super::RemoteError;

/// Outcome of a call made through a circuit breaker and/or retry policy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResilienceError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The breaker rejected the call without invoking the remote function.
    /// `retry_after` is the remaining cooldown; zero means a half-open trial
    /// was already in flight.
    #[error("circuit '{breaker}' is open, retry after {retry_after:?}")]
    CircuitOpen {
        breaker: String,
        retry_after: Duration,
    },

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetryExhausted {
        attempts: u32,
        last: Box<ResilienceError>,
    },
}

impl ResilienceError {
    /// Transient remote failures and open-circuit rejections are retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Remote(e) => e.is_transient(),
            Self::CircuitOpen { .. } => true,
            Self::RetryExhausted { .. } => false,
        }
    }

    /// The innermost cause, unwrapping `RetryExhausted`.
    pub fn root_cause(&self) -> &ResilienceError {
        match self {
            Self::RetryExhausted { last, .. } => last.root_cause(),
            other => other,
        }
    }
}
