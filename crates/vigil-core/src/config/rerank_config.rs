use serde::{Deserialize, Serialize};

use super::defaults;

/// Reranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Documents kept after pairwise scoring (K).
    pub top_k: usize,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::DEFAULT_RERANK_TOP_K,
        }
    }
}
