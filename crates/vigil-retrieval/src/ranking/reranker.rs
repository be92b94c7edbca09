//! Pairwise re-ranking of fused candidates.
//!
//! Every (query, passage) pair is scored by the relevance model in a single
//! batch, then candidates are stable-sorted by descending relevance so equal
//! scores keep their fused order.

use std::sync::Arc;

use tracing::debug;
use vigil_core::errors::{RerankError, ResilienceError};
use vigil_core::models::{Document, FusedCandidate, RerankedCandidate};
use vigil_core::traits::IRelevanceModel;
use vigil_resilience::ResilienceGuard;

pub struct Reranker {
    model: Arc<dyn IRelevanceModel>,
    guard: Option<ResilienceGuard>,
}

impl Reranker {
    pub fn new(model: Arc<dyn IRelevanceModel>) -> Self {
        Self { model, guard: None }
    }

    /// Route model calls through `guard` (for remote relevance models).
    pub fn with_guard(mut self, guard: ResilienceGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn guard(&self) -> Option<&ResilienceGuard> {
        self.guard.as_ref()
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Top `top_k` candidates by relevance, best first.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: Vec<FusedCandidate>,
        top_k: usize,
    ) -> Result<Vec<RerankedCandidate>, RerankError> {
        let mut ranked = self.score_all(query, candidates).await?;
        ranked.truncate(top_k);
        debug!(model = self.model.name(), kept = ranked.len(), top_k, "rerank complete");
        Ok(ranked)
    }

    /// Same ranking as [`rerank`](Self::rerank), as `(document, relevance)` pairs.
    pub async fn rerank_with_scores(
        &self,
        query: &str,
        candidates: Vec<FusedCandidate>,
        top_k: usize,
    ) -> Result<Vec<(Arc<Document>, f32)>, RerankError> {
        Ok(self
            .rerank(query, candidates, top_k)
            .await?
            .into_iter()
            .map(|c| (c.document, c.relevance_score))
            .collect())
    }

    async fn score_all(
        &self,
        query: &str,
        candidates: Vec<FusedCandidate>,
    ) -> Result<Vec<RerankedCandidate>, RerankError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let passages: Vec<&str> = candidates.iter().map(|c| c.document.text.as_str()).collect();
        let scores = match &self.guard {
            Some(guard) => guard.call(|| self.model.score(query, &passages)).await?,
            None => self
                .model
                .score(query, &passages)
                .await
                .map_err(ResilienceError::from)?,
        };

        if scores.len() != candidates.len() {
            return Err(RerankError::ScoreCountMismatch {
                expected: candidates.len(),
                actual: scores.len(),
            });
        }
        if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
            return Err(RerankError::NonFiniteScore { index });
        }

        let mut ranked: Vec<RerankedCandidate> = candidates
            .into_iter()
            .zip(scores)
            .map(|(c, relevance_score)| RerankedCandidate {
                document: c.document,
                relevance_score,
                fused_score: c.fused_score,
            })
            .collect();
        ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        Ok(ranked)
    }
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("model", &self.model.name())
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}
