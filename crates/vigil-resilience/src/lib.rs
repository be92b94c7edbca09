//! # vigil-resilience
//!
//! Fault tolerance for remote calls.
//!
//! ```text
//! ResilienceGuard
//! └── RetryPolicy        (bounded exponential backoff, transient-only)
//!     └── CircuitBreaker (CLOSED → OPEN → HALF_OPEN → CLOSED)
//!         └── remote call
//! ```
//!
//! The breaker never retries; the retry policy never tracks health. The guard
//! composes them and is shared by every guarded collaborator.

pub mod circuit_breaker;
pub mod guard;
pub mod retry;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitState};
pub use guard::ResilienceGuard;
pub use retry::RetryPolicy;
