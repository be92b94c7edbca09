/// Retrieval subsystem errors.
///
/// Semantic-leg failures never appear here: they degrade the query to
/// lexical-only results instead.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("lexical search failed: {reason}")]
    LexicalLegFailed { reason: String },

    #[error("lexical index returned unknown document: {id}")]
    UnknownDocument { id: String },
}
