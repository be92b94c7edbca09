//! QueryPipeline: cache → single-flight → retrieve → rerank → generate → cache.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, Instrument};
use vigil_cache::{cache_key, CacheStats, QueryCache};
use vigil_core::config::VigilConfig;
use vigil_core::errors::{VigilError, VigilResult};
use vigil_core::models::{Citation, DegradationReason, Filters, SourceRef};
use vigil_core::traits::IAnswerGenerator;
use vigil_observability::{
    events, generation_span, query_span, rerank_span, retrieval_span, DegradationTracker,
    MetricsSnapshot, PipelineMetrics, TrackedDegradation,
};
use vigil_resilience::BreakerSnapshot;
use vigil_retrieval::engine::SEMANTIC_COMPONENT;
use vigil_retrieval::{HybridRetriever, Reranker};

use crate::request::QueryRequest;
use crate::response::{CachedAnswer, QueryResponse};
use crate::single_flight::SingleFlight;

/// Freshly computed answer plus how it was produced.
struct Computed {
    answer: CachedAnswer,
    degradation: Option<DegradationReason>,
}

pub struct QueryPipeline {
    retriever: HybridRetriever,
    reranker: Reranker,
    generator: Arc<dyn IAnswerGenerator>,
    cache: QueryCache<CachedAnswer>,
    in_flight: SingleFlight,
    metrics: PipelineMetrics,
    degradations: Mutex<DegradationTracker>,
    config: VigilConfig,
}

impl QueryPipeline {
    pub(crate) fn from_parts(
        config: VigilConfig,
        retriever: HybridRetriever,
        reranker: Reranker,
        generator: Arc<dyn IAnswerGenerator>,
        cache: QueryCache<CachedAnswer>,
    ) -> Self {
        Self {
            retriever,
            reranker,
            generator,
            cache,
            in_flight: SingleFlight::new(),
            metrics: PipelineMetrics::new(),
            degradations: Mutex::new(DegradationTracker::new()),
            config,
        }
    }

    /// Answer one request.
    ///
    /// Never fails because of the cache or the semantic leg: those degrade.
    /// Fails on invalid input, lexical/rerank/generation errors, and deadline
    /// expiry. Nothing is cached for a failed or degraded query.
    pub async fn answer(&self, request: QueryRequest) -> VigilResult<QueryResponse> {
        self.metrics.record_query();
        let started = tokio::time::Instant::now();

        let deadline = request
            .deadline
            .or_else(|| self.config.pipeline.default_deadline());
        let result = match deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run(&request))
                .await
                .unwrap_or(Err(VigilError::Timeout { deadline })),
            None => self.run(&request).await,
        };

        match &result {
            Ok(response) => {
                let elapsed = started.elapsed();
                self.metrics
                    .record_success(response.cache_hit, response.degraded, elapsed);
                events::query_completed(
                    response.sources.len(),
                    response.cache_hit,
                    response.degraded,
                    elapsed,
                );
            }
            Err(error) => {
                let reason = error.reason();
                self.metrics.record_failure(reason);
                events::query_failed(reason.as_str(), &error.to_string());
            }
        }
        result
    }

    async fn run(&self, request: &QueryRequest) -> VigilResult<QueryResponse> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(VigilError::InvalidQuery {
                reason: "query is empty".to_string(),
            });
        }
        let return_sources = request
            .return_sources
            .unwrap_or(self.config.pipeline.return_sources);
        let key = cache_key(query, &request.filters);

        self.lookup_or_compute(query, &request.filters, &key, return_sources)
            .instrument(query_span!(key))
            .await
    }

    async fn lookup_or_compute(
        &self,
        query: &str,
        filters: &Filters,
        key: &str,
        return_sources: bool,
    ) -> VigilResult<QueryResponse> {
        if let Some(hit) = self.cache.get(key) {
            events::cache_hit(key);
            return Ok(QueryResponse::from_answer(hit, true, return_sources, None));
        }

        // Followers wait here, then find the leader's answer in the cache.
        let _flight = if self.config.cache.single_flight {
            let flight = self.in_flight.acquire(key).await;
            if let Some(hit) = self.cache.peek(key) {
                self.metrics.record_coalesced();
                events::query_coalesced(key);
                return Ok(QueryResponse::from_answer(hit, true, return_sources, None));
            }
            Some(flight)
        } else {
            None
        };

        let computed = self.compute(query, filters).await?;
        if computed.degradation.is_none() {
            self.cache.put(key, computed.answer.clone());
        } else {
            debug!(cache_key = %key, "degraded answer not cached");
        }
        Ok(QueryResponse::from_answer(
            computed.answer,
            false,
            return_sources,
            computed.degradation,
        ))
    }

    async fn compute(&self, query: &str, filters: &Filters) -> VigilResult<Computed> {
        let top_n = self.config.retrieval.top_n;
        let retrieval = self
            .retriever
            .retrieve(query, top_n, filters)
            .instrument(retrieval_span!(top_n))
            .await?;

        let degradation = retrieval.degradation_reason();
        {
            let mut tracker = self.tracker();
            match &retrieval.degradation {
                Some(event) => tracker.record(event.clone()),
                None => {
                    tracker.mark_recovered(SEMANTIC_COMPONENT);
                }
            }
        }

        let candidates = retrieval.candidates.len();
        let reranked = self
            .reranker
            .rerank(query, retrieval.candidates, self.config.rerank.top_k)
            .instrument(rerank_span!(self.reranker.model_name(), candidates))
            .await?;

        let generated = self
            .generator
            .generate(query, &reranked)
            .instrument(generation_span!(reranked.len()))
            .await
            .map_err(VigilError::Generation)?;

        let citations = if generated.citations.is_empty() {
            reranked.iter().map(Citation::from_candidate).collect()
        } else {
            generated.citations
        };

        Ok(Computed {
            answer: CachedAnswer {
                answer: generated.text,
                citations,
                sources: reranked.iter().map(SourceRef::from).collect(),
            },
            degradation,
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every cached answer and reset cache counters.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Semantic-leg breaker, plus the relevance-model breaker when guarded.
    pub fn breaker_snapshots(&self) -> Vec<BreakerSnapshot> {
        let mut snapshots = vec![self.retriever.guard().breaker().snapshot()];
        if let Some(guard) = self.reranker.guard() {
            snapshots.push(guard.breaker().snapshot());
        }
        snapshots
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Degradation history, oldest first.
    pub fn degradations(&self) -> Vec<TrackedDegradation> {
        self.tracker().events().iter().cloned().collect()
    }

    pub fn is_degraded(&self) -> bool {
        self.tracker().is_degraded(SEMANTIC_COMPONENT)
    }

    pub fn config(&self) -> &VigilConfig {
        &self.config
    }

    /// Deadline applied to requests that carry none.
    pub fn default_deadline(&self) -> Option<Duration> {
        self.config.pipeline.default_deadline()
    }

    fn tracker(&self) -> MutexGuard<'_, DegradationTracker> {
        self.degradations.lock().unwrap_or_else(|e| e.into_inner())
    }
}
