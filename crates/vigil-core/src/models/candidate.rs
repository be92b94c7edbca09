use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Document;

/// A candidate after weighted score fusion. Also carries each leg's raw score.
#[derive(Debug, Clone)]
pub struct FusedCandidate {
    pub document: Arc<Document>,
    /// `w_s * norm(semantic) + w_l * norm(lexical)`.
    pub fused_score: f64,
    pub semantic_score: Option<f32>,
    pub lexical_score: Option<f32>,
    /// Position in the semantic leg's list, used as the fusion tie-break.
    pub semantic_rank: Option<usize>,
    pub lexical_rank: Option<usize>,
}

impl FusedCandidate {
    pub fn id(&self) -> &str {
        &self.document.id
    }
}

/// A candidate scored by the pairwise relevance model.
#[derive(Debug, Clone)]
pub struct RerankedCandidate {
    pub document: Arc<Document>,
    pub relevance_score: f32,
    /// Score the candidate carried into reranking.
    pub fused_score: f64,
}

impl RerankedCandidate {
    pub fn id(&self) -> &str {
        &self.document.id
    }
}

/// Serializable summary of a reranked source, stored in cached answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub document_id: String,
    pub relevance_score: f32,
    pub fused_score: f64,
}

impl From<&RerankedCandidate> for SourceRef {
    fn from(candidate: &RerankedCandidate) -> Self {
        Self {
            document_id: candidate.document.id.clone(),
            relevance_score: candidate.relevance_score,
            fused_score: candidate.fused_score,
        }
    }
}
