//! Span definitions per pipeline stage.

/// Span covering one `QueryPipeline::answer` call.
#[macro_export]
macro_rules! query_span {
    ($cache_key:expr) => {
        tracing::info_span!("vigil.query", cache_key = %$cache_key)
    };
}

/// Span covering hybrid retrieval.
#[macro_export]
macro_rules! retrieval_span {
    ($top_n:expr) => {
        tracing::info_span!("vigil.retrieval", top_n = $top_n)
    };
}

/// Span covering pairwise re-ranking.
#[macro_export]
macro_rules! rerank_span {
    ($model:expr, $candidates:expr) => {
        tracing::info_span!("vigil.rerank", model = %$model, candidates = $candidates)
    };
}

/// Span covering answer generation.
#[macro_export]
macro_rules! generation_span {
    ($documents:expr) => {
        tracing::info_span!("vigil.generation", documents = $documents)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const QUERY: &str = "vigil.query";
    pub const RETRIEVAL: &str = "vigil.retrieval";
    pub const RERANK: &str = "vigil.rerank";
    pub const GENERATION: &str = "vigil.generation";
}
