use async_trait::async_trait;

use crate::errors::RemoteError;
use crate::models::Filters;

/// Remote vector-similarity search (e.g. a hosted vector database).
#[async_trait]
pub trait ISemanticSearchProvider: Send + Sync {
    /// Return up to `top_m` `(document_id, similarity)` pairs, best first.
    async fn search(
        &self,
        query: &str,
        top_m: usize,
        filters: &Filters,
    ) -> Result<Vec<(String, f32)>, RemoteError>;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}
