use async_trait::async_trait;

use crate::errors::RemoteError;

/// Pairwise (query, passage) relevance model, e.g. a cross-encoder.
#[async_trait]
pub trait IRelevanceModel: Send + Sync {
    /// Score every passage against `query`. Must return exactly one score per
    /// passage, in input order.
    async fn score(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>, RemoteError>;

    fn name(&self) -> &str;
}
