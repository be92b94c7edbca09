use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why retrieval fell back to lexical-only results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationReason {
    /// The breaker rejected the semantic call.
    CircuitOpen,
    /// Every retry attempt failed transiently.
    RetryExhausted,
    /// The provider reported a non-retryable failure.
    TerminalFailure,
}

impl DegradationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CircuitOpen => "circuit_open",
            Self::RetryExhausted => "retry_exhausted",
            Self::TerminalFailure => "terminal_failure",
        }
    }
}

/// A degradation event when a subsystem falls back to a lower-quality mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationEvent {
    pub component: String,
    pub reason: DegradationReason,
    pub failure: String,
    pub fallback_used: String,
    pub timestamp: DateTime<Utc>,
}
