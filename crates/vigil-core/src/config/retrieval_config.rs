use serde::{Deserialize, Serialize};

use super::defaults;

/// How raw leg scores are mapped onto `[0, 1]` before weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Per-query min-max scaling. A zero range maps every score to 1.0.
    #[default]
    MinMax,
    /// Scores are already similarity-like; clamp to `[0, 1]`.
    Native,
}

/// Hybrid retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Weight of the normalized semantic score.
    pub semantic_weight: f64,
    /// Weight of the normalized lexical score.
    pub lexical_weight: f64,
    /// Candidates fetched from each leg before fusion (M).
    pub candidate_pool: usize,
    /// Fused candidates handed to the reranker (N).
    pub top_n: usize,
    /// Per-leg score normalization.
    pub normalization: Normalization,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_weight: defaults::DEFAULT_SEMANTIC_WEIGHT,
            lexical_weight: defaults::DEFAULT_LEXICAL_WEIGHT,
            candidate_pool: defaults::DEFAULT_CANDIDATE_POOL,
            top_n: defaults::DEFAULT_RETRIEVAL_TOP_N,
            normalization: Normalization::default(),
        }
    }
}
