//! Wires providers, indexes and resilience primitives into a `QueryPipeline`.

use std::sync::Arc;

use tracing::info;
use vigil_cache::QueryCache;
use vigil_core::clock::{IClock, SystemClock};
use vigil_core::config::VigilConfig;
use vigil_core::errors::{ConfigError, VigilResult};
use vigil_core::models::Document;
use vigil_core::traits::{
    IAnswerGenerator, IDocumentStore, ILexicalIndex, IRelevanceModel, ISemanticSearchProvider,
};
use vigil_resilience::ResilienceGuard;
use vigil_retrieval::engine::SEMANTIC_COMPONENT;
use vigil_retrieval::{Bm25Index, HybridRetriever, InMemoryDocumentStore, Reranker, TermOverlapModel};

use crate::pipeline::QueryPipeline;

/// Breaker name used when the relevance model is guarded.
pub const RELEVANCE_COMPONENT: &str = "relevance_model";

pub struct QueryPipelineBuilder {
    config: VigilConfig,
    clock: Arc<dyn IClock>,
    semantic: Option<Arc<dyn ISemanticSearchProvider>>,
    lexical: Option<Arc<dyn ILexicalIndex>>,
    store: Option<Arc<dyn IDocumentStore>>,
    relevance: Option<Arc<dyn IRelevanceModel>>,
    guard_relevance: bool,
    generator: Option<Arc<dyn IAnswerGenerator>>,
}

impl QueryPipelineBuilder {
    pub fn new(config: VigilConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            semantic: None,
            lexical: None,
            store: None,
            relevance: None,
            guard_relevance: false,
            generator: None,
        }
    }

    /// Time source for the cache, breakers and retry backoff.
    pub fn clock(mut self, clock: Arc<dyn IClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn semantic(mut self, provider: Arc<dyn ISemanticSearchProvider>) -> Self {
        self.semantic = Some(provider);
        self
    }

    pub fn lexical_index(mut self, index: Arc<dyn ILexicalIndex>) -> Self {
        self.lexical = Some(index);
        self
    }

    pub fn document_store(mut self, store: Arc<dyn IDocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Index `documents` in memory: an [`InMemoryDocumentStore`] plus a
    /// [`Bm25Index`] over the same set.
    pub fn corpus(self, documents: Vec<Document>) -> Self {
        let store = Arc::new(InMemoryDocumentStore::new(documents));
        let index = Arc::new(Bm25Index::build(store.documents()));
        self.document_store(store).lexical_index(index)
    }

    /// Defaults to [`TermOverlapModel`].
    pub fn relevance_model(mut self, model: Arc<dyn IRelevanceModel>) -> Self {
        self.relevance = Some(model);
        self
    }

    /// Put the relevance model behind its own breaker and retry policy.
    pub fn guard_relevance_model(mut self, guarded: bool) -> Self {
        self.guard_relevance = guarded;
        self
    }

    pub fn generator(mut self, generator: Arc<dyn IAnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn build(self) -> VigilResult<QueryPipeline> {
        self.config.validate()?;

        let semantic = required(self.semantic, "semantic")?;
        let lexical = required(self.lexical, "lexical_index")?;
        let store = required(self.store, "document_store")?;
        let generator = required(self.generator, "generator")?;
        let relevance = self
            .relevance
            .unwrap_or_else(|| Arc::new(TermOverlapModel::new()));

        let semantic_guard = ResilienceGuard::from_config(
            SEMANTIC_COMPONENT,
            &self.config.circuit_breaker,
            &self.config.retry,
            Arc::clone(&self.clock),
        );
        let retriever = HybridRetriever::new(
            semantic,
            lexical,
            store,
            semantic_guard,
            self.config.retrieval.clone(),
        );

        let mut reranker = Reranker::new(relevance);
        if self.guard_relevance {
            reranker = reranker.with_guard(ResilienceGuard::from_config(
                RELEVANCE_COMPONENT,
                &self.config.circuit_breaker,
                &self.config.retry,
                Arc::clone(&self.clock),
            ));
        }

        let cache = QueryCache::from_config(&self.config.cache, Arc::clone(&self.clock));

        info!(
            cache_capacity = self.config.cache.capacity,
            cache_ttl_secs = self.config.cache.ttl_secs,
            single_flight = self.config.cache.single_flight,
            relevance_model = reranker.model_name(),
            relevance_guarded = self.guard_relevance,
            "query pipeline built"
        );
        Ok(QueryPipeline::from_parts(
            self.config,
            retriever,
            reranker,
            generator,
            cache,
        ))
    }
}

fn required<T: ?Sized>(component: Option<Arc<T>>, field: &str) -> Result<Arc<T>, ConfigError> {
    component.ok_or_else(|| ConfigError::Invalid {
        field: field.to_string(),
        reason: "component not provided".to_string(),
    })
}

impl QueryPipeline {
    pub fn builder(config: VigilConfig) -> QueryPipelineBuilder {
        QueryPipelineBuilder::new(config)
    }
}
