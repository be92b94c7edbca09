use serde::{Deserialize, Serialize};
use vigil_core::models::{Citation, DegradationReason, SourceRef};

/// What the cache stores for a query: everything needed to rebuild a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub sources: Vec<SourceRef>,
}

/// The pipeline's answer to one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    /// Empty unless sources were requested.
    pub citations: Vec<Citation>,
    /// Reranked documents the answer was generated from, best first.
    pub sources: Vec<SourceRef>,
    pub cache_hit: bool,
    /// True when the semantic leg was unavailable and lexical-only results were used.
    pub degraded: bool,
    pub degradation_reason: Option<DegradationReason>,
}

impl QueryResponse {
    pub(crate) fn from_answer(
        answer: CachedAnswer,
        cache_hit: bool,
        return_sources: bool,
        degradation_reason: Option<DegradationReason>,
    ) -> Self {
        Self {
            answer: answer.answer,
            citations: if return_sources {
                answer.citations
            } else {
                Vec::new()
            },
            sources: answer.sources,
            cache_hit,
            degraded: degradation_reason.is_some(),
            degradation_reason,
        }
    }
}
