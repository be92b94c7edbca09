//! HybridRetriever: concurrent semantic + lexical legs, fused into one ranking.
//!
//! The semantic leg goes through the shared `ResilienceGuard`; when it fails
//! for any reason the query degrades to lexical-only results (lexical weight
//! 1.0) and the outcome is flagged. The lexical leg is in-process, runs on the
//! blocking pool, and its failures are real errors.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use vigil_core::config::RetrievalConfig;
use vigil_core::errors::{ResilienceError, RetrievalError};
use vigil_core::models::{DegradationEvent, DegradationReason, Filters, FusedCandidate};
use vigil_core::traits::{IDocumentStore, ILexicalIndex, ISemanticSearchProvider};
use vigil_observability::events;
use vigil_resilience::ResilienceGuard;

use crate::lexical::tokenize;
use crate::search::{dedup_first, fuse, FusionWeights, LegHits};

/// Component name carried by semantic-leg degradation events.
pub const SEMANTIC_COMPONENT: &str = "semantic_search";
const LEXICAL_FALLBACK: &str = "lexical_only";

/// Result of one retrieval.
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    /// Fused candidates, best first, at most `top_n`.
    pub candidates: Vec<FusedCandidate>,
    /// True when the semantic leg failed and only lexical results were used.
    pub degraded: bool,
    pub degradation: Option<DegradationEvent>,
}

impl RetrievalOutcome {
    pub fn degradation_reason(&self) -> Option<DegradationReason> {
        self.degradation.as_ref().map(|event| event.reason)
    }
}

/// Hybrid retriever over a semantic provider, a lexical index and a document store.
pub struct HybridRetriever {
    semantic: Arc<dyn ISemanticSearchProvider>,
    lexical: Arc<dyn ILexicalIndex>,
    store: Arc<dyn IDocumentStore>,
    guard: ResilienceGuard,
    config: RetrievalConfig,
}

impl HybridRetriever {
    pub fn new(
        semantic: Arc<dyn ISemanticSearchProvider>,
        lexical: Arc<dyn ILexicalIndex>,
        store: Arc<dyn IDocumentStore>,
        guard: ResilienceGuard,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            semantic,
            lexical,
            store,
            guard,
            config,
        }
    }

    pub fn guard(&self) -> &ResilienceGuard {
        &self.guard
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve the best `top_n` fused candidates for `query`.
    ///
    /// `filters` are forwarded to the semantic provider and applied to lexical
    /// hits after resolution.
    pub async fn retrieve(
        &self,
        query: &str,
        top_n: usize,
        filters: &Filters,
    ) -> Result<RetrievalOutcome, RetrievalError> {
        let pool = self.config.candidate_pool.max(top_n);

        let (semantic, lexical) = tokio::join!(
            self.semantic_leg(query, pool, filters),
            self.lexical_leg(query, pool, filters),
        );
        let lexical = lexical?;

        let outcome = match semantic {
            Ok(semantic) => {
                let weights =
                    FusionWeights::new(self.config.semantic_weight, self.config.lexical_weight);
                let candidates = fuse(&semantic, &lexical, weights, self.config.normalization, top_n);
                debug!(
                    semantic_hits = semantic.len(),
                    lexical_hits = lexical.len(),
                    fused = candidates.len(),
                    "hybrid retrieval complete"
                );
                RetrievalOutcome {
                    candidates,
                    degraded: false,
                    degradation: None,
                }
            }
            Err(error) => {
                let event = degradation_event(&error);
                events::degradation_triggered(
                    &event.component,
                    event.reason.as_str(),
                    &event.failure,
                    &event.fallback_used,
                );
                let candidates = fuse(
                    &Vec::new(),
                    &lexical,
                    FusionWeights::lexical_only(),
                    self.config.normalization,
                    top_n,
                );
                RetrievalOutcome {
                    candidates,
                    degraded: true,
                    degradation: Some(event),
                }
            }
        };

        info!(
            candidates = outcome.candidates.len(),
            degraded = outcome.degraded,
            "retrieval complete"
        );
        Ok(outcome)
    }

    async fn semantic_leg(
        &self,
        query: &str,
        pool: usize,
        filters: &Filters,
    ) -> Result<LegHits, ResilienceError> {
        let raw = self
            .guard
            .call(|| self.semantic.search(query, pool, filters))
            .await?;

        let provider = self.semantic.name();
        let mut hits = LegHits::with_capacity(raw.len());
        for (id, score) in dedup_first(raw) {
            if !score.is_finite() {
                warn!(provider, %id, "dropping semantic hit with non-finite score");
                continue;
            }
            match self.store.get(&id) {
                Some(doc) => hits.push((doc, score)),
                None => warn!(provider, %id, "dropping unresolvable semantic hit"),
            }
        }
        hits.truncate(pool);
        Ok(hits)
    }

    async fn lexical_leg(
        &self,
        query: &str,
        pool: usize,
        filters: &Filters,
    ) -> Result<LegHits, RetrievalError> {
        let tokens = tokenize(query);
        let index = Arc::clone(&self.lexical);
        let raw = tokio::task::spawn_blocking(move || index.search(&tokens, pool))
            .await
            .map_err(|e| RetrievalError::LexicalLegFailed {
                reason: e.to_string(),
            })?;

        let mut hits = LegHits::with_capacity(raw.len());
        for (id, score) in dedup_first(raw) {
            if !score.is_finite() {
                warn!(%id, "dropping lexical hit with non-finite score");
                continue;
            }
            let doc = self
                .store
                .get(&id)
                .ok_or_else(|| RetrievalError::UnknownDocument { id: id.clone() })?;
            if doc.matches(filters) {
                hits.push((doc, score));
            }
        }
        Ok(hits)
    }
}

fn degradation_event(error: &ResilienceError) -> DegradationEvent {
    let reason = match error {
        ResilienceError::CircuitOpen { .. } => DegradationReason::CircuitOpen,
        ResilienceError::RetryExhausted { last, .. } => match last.as_ref() {
            ResilienceError::CircuitOpen { .. } => DegradationReason::CircuitOpen,
            _ => DegradationReason::RetryExhausted,
        },
        ResilienceError::Remote(_) => DegradationReason::TerminalFailure,
    };
    DegradationEvent {
        component: SEMANTIC_COMPONENT.to_string(),
        reason,
        failure: error.to_string(),
        fallback_used: LEXICAL_FALLBACK.to_string(),
        timestamp: Utc::now(),
    }
}
