//! Failure-rate guard around a single remote dependency.
//!
//! ```text
//!            failure_threshold transient failures
//!   CLOSED ─────────────────────────────────────────▶ OPEN
//!     ▲                                               │  reset_timeout elapsed,
//!     │ success_threshold successes                   │  next call is the trial
//!     │                                               ▼
//!     └─────────────────────────────────────────── HALF_OPEN
//!                  any transient failure ──▶ OPEN (opened_at reset)
//! ```
//!
//! While HALF_OPEN, exactly one trial runs at a time. Concurrent callers are
//! rejected with `CircuitOpen { retry_after: 0 }` rather than queued.
//!
//! Every transition bumps a generation counter. A call remembers the
//! generation it was admitted under, and its outcome is ignored if the
//! breaker has moved on since. This keeps concurrent failures at
//! `threshold - 1` from producing two transitions.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;
use vigil_core::clock::IClock;
use vigil_core::config::CircuitBreakerConfig;
use vigil_core::errors::{RemoteError, ResilienceError};
use vigil_observability::events;

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of a breaker.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    pub opened_at: Option<Instant>,
    pub trial_in_flight: bool,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
    generation: u64,
}

/// How a call's result affects breaker health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    /// Transient remote failure.
    Failure,
    /// Terminal remote failure: says nothing about dependency health.
    Neutral,
}

impl Outcome {
    fn of<T>(result: &Result<T, RemoteError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(e) if e.is_transient() => Self::Failure,
            Err(_) => Self::Neutral,
        }
    }
}

/// Circuit breaker guarding one remote dependency.
///
/// Constructed once per dependency and shared via `Arc`; state changes only
/// through call outcomes.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    clock: Arc<dyn IClock>,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(
        name: impl Into<String>,
        config: CircuitBreakerConfig,
        clock: Arc<dyn IClock>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            clock,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                opened_at: None,
                trial_in_flight: false,
                generation: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state. An OPEN breaker whose cooldown has elapsed still reports
    /// OPEN until the next call attempt.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let s = self.lock();
        BreakerSnapshot {
            name: self.name.clone(),
            state: s.state,
            consecutive_failures: s.consecutive_failures,
            consecutive_successes: s.consecutive_successes,
            opened_at: s.opened_at,
            trial_in_flight: s.trial_in_flight,
        }
    }

    /// Run `op` through the breaker.
    ///
    /// Returns `CircuitOpen` without calling `op` when the breaker is OPEN or a
    /// half-open trial is already running. Never retries.
    pub async fn execute<T, F, Fut>(&self, op: F) -> Result<T, ResilienceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut permit = self.admit()?;
        let result = op().await;
        permit.settle(Outcome::of(&result));
        result.map_err(ResilienceError::from)
    }

    fn admit(&self) -> Result<Permit<'_>, ResilienceError> {
        let now = self.clock.now();
        let mut s = self.lock();
        match s.state {
            CircuitState::Closed => Ok(Permit::new(self, s.generation, false)),
            CircuitState::Open => {
                let opened_at = s.opened_at.unwrap_or(now);
                let elapsed = now.saturating_duration_since(opened_at);
                let reset_timeout = self.config.reset_timeout();
                if elapsed >= reset_timeout {
                    self.transition(&mut s, CircuitState::HalfOpen, now);
                    s.trial_in_flight = true;
                    Ok(Permit::new(self, s.generation, true))
                } else {
                    Err(self.rejection(reset_timeout - elapsed))
                }
            }
            CircuitState::HalfOpen => {
                if s.trial_in_flight {
                    debug!(breaker = %self.name, "half-open trial in flight, rejecting call");
                    Err(self.rejection(Duration::ZERO))
                } else {
                    s.trial_in_flight = true;
                    Ok(Permit::new(self, s.generation, true))
                }
            }
        }
    }

    fn record(&self, generation: u64, outcome: Outcome) {
        let now = self.clock.now();
        let mut s = self.lock();
        if s.generation != generation {
            debug!(
                breaker = %self.name,
                ?outcome,
                "ignoring outcome admitted under a previous state"
            );
            return;
        }

        match (s.state, outcome) {
            (CircuitState::Closed, Outcome::Success) => s.consecutive_failures = 0,
            (CircuitState::Closed, Outcome::Failure) => {
                s.consecutive_failures += 1;
                if s.consecutive_failures >= self.config.failure_threshold {
                    self.transition(&mut s, CircuitState::Open, now);
                }
            }
            (CircuitState::HalfOpen, Outcome::Success) => {
                s.trial_in_flight = false;
                s.consecutive_failures = 0;
                s.consecutive_successes += 1;
                if s.consecutive_successes >= self.config.success_threshold {
                    self.transition(&mut s, CircuitState::Closed, now);
                }
            }
            (CircuitState::HalfOpen, Outcome::Failure) => {
                s.consecutive_failures += 1;
                self.transition(&mut s, CircuitState::Open, now);
            }
            (CircuitState::HalfOpen, Outcome::Neutral) => s.trial_in_flight = false,
            (CircuitState::Closed, Outcome::Neutral) | (CircuitState::Open, _) => {}
        }
    }

    /// A permit dropped without an outcome (cancelled call) frees the trial slot.
    fn abandon(&self, generation: u64) {
        let mut s = self.lock();
        if s.generation == generation && s.state == CircuitState::HalfOpen {
            debug!(breaker = %self.name, "half-open trial cancelled");
            s.trial_in_flight = false;
        }
    }

    fn transition(&self, s: &mut BreakerState, to: CircuitState, now: Instant) {
        let from = s.state;
        s.state = to;
        s.generation += 1;
        s.trial_in_flight = false;
        match to {
            CircuitState::Open => {
                s.opened_at = Some(now);
                s.consecutive_successes = 0;
            }
            CircuitState::HalfOpen => s.consecutive_successes = 0,
            CircuitState::Closed => {
                s.consecutive_failures = 0;
                s.consecutive_successes = 0;
                s.opened_at = None;
            }
        }
        events::circuit_transition(&self.name, from.as_str(), to.as_str(), s.consecutive_failures);
    }

    fn rejection(&self, retry_after: Duration) -> ResilienceError {
        ResilienceError::CircuitOpen {
            breaker: self.name.clone(),
            retry_after,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // State is updated field by field under the lock; a panic elsewhere
        // cannot leave it half-written.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Admission ticket for one call.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    trial: bool,
    settled: bool,
}

impl<'a> Permit<'a> {
    fn new(breaker: &'a CircuitBreaker, generation: u64, trial: bool) -> Self {
        Self {
            breaker,
            generation,
            trial,
            settled: false,
        }
    }

    fn settle(&mut self, outcome: Outcome) {
        self.settled = true;
        self.breaker.record(self.generation, outcome);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            self.breaker.abandon(self.generation);
        }
    }
}
