use super::ResilienceError;

/// Reranking errors. Always fatal for the query.
#[derive(Debug, thiserror::Error)]
pub enum RerankError {
    #[error("relevance model failed: {0}")]
    Model(#[from] ResilienceError),

    #[error("relevance model returned {actual} scores for {expected} passages")]
    ScoreCountMismatch { expected: usize, actual: usize },

    #[error("relevance model returned a non-finite score for passage {index}")]
    NonFiniteScore { index: usize },
}
