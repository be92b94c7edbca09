//! Error taxonomy.
//!
//! Subsystem errors convert into [`VigilError`] through `From`, and every
//! `VigilError` maps onto a stable [`FailureReason`] for callers.

mod config_error;
mod remote_error;
mod rerank_error;
mod resilience_error;
mod retrieval_error;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use config_error::ConfigError;
pub use remote_error::{FailureClass, RemoteError};
pub use rerank_error::RerankError;
pub use resilience_error::ResilienceError;
pub use retrieval_error::RetrievalError;

pub type VigilResult<T> = Result<T, VigilError>;

/// Top-level error for a query.
#[derive(Debug, thiserror::Error)]
pub enum VigilError {
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("rerank error: {0}")]
    Rerank(#[from] RerankError),

    #[error("answer generation failed: {0}")]
    Generation(RemoteError),

    #[error("query deadline of {deadline:?} exceeded")]
    Timeout { deadline: Duration },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl VigilError {
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::InvalidQuery { .. } => FailureReason::InvalidQuery,
            Self::Retrieval(_) => FailureReason::LexicalLeg,
            Self::Rerank(_) => FailureReason::Rerank,
            Self::Generation(_) => FailureReason::Generation,
            Self::Timeout { .. } => FailureReason::Timeout,
            Self::Config(_) => FailureReason::Config,
        }
    }
}

/// Stable, enumerable failure reason surfaced with every failed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    InvalidQuery,
    LexicalLeg,
    Rerank,
    Generation,
    Timeout,
    Config,
}

impl FailureReason {
    pub const ALL: [FailureReason; 6] = [
        Self::InvalidQuery,
        Self::LexicalLeg,
        Self::Rerank,
        Self::Generation,
        Self::Timeout,
        Self::Config,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidQuery => "invalid_query",
            Self::LexicalLeg => "lexical_leg",
            Self::Rerank => "rerank",
            Self::Generation => "generation",
            Self::Timeout => "timeout",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
