use serde::{Deserialize, Serialize};

/// Whether a remote failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    Transient,
    Terminal,
}

/// Failures reported by remote collaborators (vector search, relevance model,
/// answer generator).
///
/// This is a closed set: every provider adapter must map its native errors
/// onto one of these variants, and [`RemoteError::class`] decides retryability.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteError {
    #[error("{operation} timed out")]
    Timeout { operation: String },

    #[error("rate limited: {reason}")]
    RateLimited { reason: String },

    #[error("connection failed: {reason}")]
    Connection { reason: String },

    #[error("service unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("malformed request: {reason}")]
    MalformedRequest { reason: String },

    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },
}

impl RemoteError {
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Timeout { .. }
            | Self::RateLimited { .. }
            | Self::Connection { .. }
            | Self::Unavailable { .. } => FailureClass::Transient,
            Self::Unauthorized { .. }
            | Self::MalformedRequest { .. }
            | Self::InvalidResponse { .. } => FailureClass::Terminal,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.class() == FailureClass::Transient
    }
}
