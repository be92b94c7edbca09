//! HybridRetriever against the compliance corpus with scripted semantic search.

use std::sync::Arc;

use test_fixtures::{compliance_corpus, filters, terminal, transient, ScriptedSemanticProvider};
use vigil_core::clock::ManualClock;
use vigil_core::config::{CircuitBreakerConfig, RetrievalConfig, RetryConfig};
use vigil_core::errors::{RemoteError, RetrievalError};
use vigil_core::models::{DegradationReason, Document, Filters, FusedCandidate};
use vigil_core::traits::{IDocumentStore, ILexicalIndex};
use vigil_retrieval::{Bm25Index, HybridRetriever, InMemoryDocumentStore};
use vigil_resilience::{CircuitState, ResilienceGuard};

struct Harness {
    retriever: HybridRetriever,
    provider: Arc<ScriptedSemanticProvider>,
}

fn harness(provider: ScriptedSemanticProvider, config: RetrievalConfig) -> Harness {
    let store = Arc::new(InMemoryDocumentStore::new(compliance_corpus()));
    let index = Arc::new(Bm25Index::build(store.documents()));
    let provider = Arc::new(provider);
    let guard = ResilienceGuard::from_config(
        "semantic",
        &CircuitBreakerConfig::default(),
        &RetryConfig::default(),
        Arc::new(ManualClock::new()),
    );
    let retriever = HybridRetriever::new(provider.clone(), index, store, guard, config);
    Harness { retriever, provider }
}

fn semantic_hits() -> ScriptedSemanticProvider {
    ScriptedSemanticProvider::returning(&[
        ("doc_1", 0.92),
        ("doc_3", 0.81),
        ("doc_0", 0.40),
        ("doc_2", 0.35),
    ])
}

fn ids(candidates: &[FusedCandidate]) -> Vec<&str> {
    candidates.iter().map(FusedCandidate::id).collect()
}

#[tokio::test]
async fn fuses_semantic_and_lexical_hits() {
    let h = harness(semantic_hits(), RetrievalConfig::default());
    let outcome = h
        .retriever
        .retrieve("What is GDPR Article 17 right to erasure?", 20, &Filters::new())
        .await
        .unwrap();

    assert!(!outcome.degraded);
    assert!(outcome.degradation.is_none());
    assert_eq!(outcome.candidates[0].id(), "doc_1");
    let top = &outcome.candidates[0];
    assert!(top.semantic_score.is_some());
    assert!(top.lexical_score.is_some());
    assert!(top.fused_score > 0.9);
    assert_eq!(h.provider.calls(), 1);
}

#[tokio::test]
async fn fusion_is_deterministic() {
    let h = harness(semantic_hits(), RetrievalConfig::default());
    let query = "GDPR data protection risk";
    let first = h.retriever.retrieve(query, 20, &Filters::new()).await.unwrap();
    let second = h.retriever.retrieve(query, 20, &Filters::new()).await.unwrap();
    assert_eq!(ids(&first.candidates), ids(&second.candidates));
}

#[tokio::test]
async fn full_semantic_weight_follows_semantic_order() {
    let config = RetrievalConfig {
        semantic_weight: 1.0,
        lexical_weight: 0.0,
        ..RetrievalConfig::default()
    };
    let h = harness(semantic_hits(), config);
    let outcome = h
        .retriever
        .retrieve("AI model monitoring drift", 20, &Filters::new())
        .await
        .unwrap();
    assert_eq!(
        &ids(&outcome.candidates)[..4],
        &["doc_1", "doc_3", "doc_0", "doc_2"]
    );
}

#[tokio::test]
async fn full_lexical_weight_ranks_lexical_matches_first() {
    let config = RetrievalConfig {
        semantic_weight: 0.0,
        lexical_weight: 1.0,
        ..RetrievalConfig::default()
    };
    let h = harness(semantic_hits(), config);
    let outcome = h
        .retriever
        .retrieve("model monitoring drift", 20, &Filters::new())
        .await
        .unwrap();
    // Only doc_4 mentions these terms; semantic scores carry no weight.
    assert_eq!(outcome.candidates[0].id(), "doc_4");
    assert_eq!(outcome.candidates[0].fused_score, 1.0);
}

#[tokio::test]
async fn top_n_truncates() {
    let h = harness(semantic_hits(), RetrievalConfig::default());
    let outcome = h
        .retriever
        .retrieve("gdpr", 2, &Filters::new())
        .await
        .unwrap();
    assert_eq!(outcome.candidates.len(), 2);
}

#[tokio::test]
async fn exhausted_retries_degrade_to_lexical_only() {
    let h = harness(
        ScriptedSemanticProvider::failing(transient("search")),
        RetrievalConfig::default(),
    );
    let outcome = h
        .retriever
        .retrieve("GDPR right to erasure", 20, &Filters::new())
        .await
        .unwrap();

    assert!(outcome.degraded);
    assert_eq!(outcome.degradation_reason(), Some(DegradationReason::RetryExhausted));
    assert_eq!(h.provider.calls(), 4);
    assert!(!outcome.candidates.is_empty());
    assert!(outcome.candidates.iter().all(|c| c.semantic_score.is_none()));
    assert_eq!(outcome.candidates[0].id(), "doc_1");
    assert_eq!(outcome.candidates[0].fused_score, 1.0, "lexical weight is 1.0");
}

#[tokio::test]
async fn open_breaker_degrades_without_calling_provider() {
    let h = harness(semantic_hits(), RetrievalConfig::default());
    let breaker = h.retriever.guard().breaker().clone();
    for _ in 0..5 {
        let _ = breaker
            .execute(|| async { Err::<(), _>(transient("search")) })
            .await;
    }
    assert_eq!(breaker.state(), CircuitState::Open);

    let outcome = h
        .retriever
        .retrieve("GDPR right to erasure", 20, &Filters::new())
        .await
        .unwrap();
    assert!(outcome.degraded);
    assert_eq!(outcome.degradation_reason(), Some(DegradationReason::CircuitOpen));
    assert_eq!(h.provider.calls(), 0);
}

#[tokio::test]
async fn terminal_failure_degrades_after_one_call() {
    let h = harness(
        ScriptedSemanticProvider::failing(terminal("expired key")),
        RetrievalConfig::default(),
    );
    let outcome = h
        .retriever
        .retrieve("erasure", 20, &Filters::new())
        .await
        .unwrap();
    assert!(outcome.degraded);
    assert_eq!(outcome.degradation_reason(), Some(DegradationReason::TerminalFailure));
    assert_eq!(h.provider.calls(), 1);
    let event = outcome.degradation.unwrap();
    assert_eq!(event.component, "semantic_search");
    assert!(event.failure.contains("expired key"));
}

#[tokio::test]
async fn filters_reach_provider_and_restrict_lexical_hits() {
    let h = harness(
        ScriptedSemanticProvider::returning(&[("doc_1", 0.9), ("doc_3", 0.8)]),
        RetrievalConfig::default(),
    );
    let gdpr_only = filters(&[("source", "gdpr.pdf")]);
    let outcome = h
        .retriever
        .retrieve("AI risk data protection", 20, &gdpr_only)
        .await
        .unwrap();

    assert_eq!(h.provider.last_filters(), Some(gdpr_only));
    assert!(outcome
        .candidates
        .iter()
        .all(|c| c.document.metadata["source"].to_string() == "gdpr.pdf"));
}

#[tokio::test]
async fn unresolvable_and_duplicate_semantic_hits_are_cleaned() {
    let h = harness(
        ScriptedSemanticProvider::returning(&[
            ("doc_9", 0.99),
            ("doc_1", 0.90),
            ("doc_1", 0.10),
        ]),
        RetrievalConfig::default(),
    );
    let outcome = h
        .retriever
        .retrieve("blockchain", 20, &Filters::new())
        .await
        .unwrap();
    assert_eq!(ids(&outcome.candidates), vec!["doc_1"]);
    assert_eq!(outcome.candidates[0].semantic_score, Some(0.90));
}

#[tokio::test]
async fn lexical_hit_missing_from_store_is_an_error() {
    let corpus = compliance_corpus();
    let indexed: Vec<Arc<Document>> = corpus.iter().cloned().map(Arc::new).collect();
    let index = Arc::new(Bm25Index::build(&indexed));
    // Store is missing doc_1.
    let store = Arc::new(InMemoryDocumentStore::new(
        corpus.into_iter().filter(|d| d.id != "doc_1"),
    ));
    assert_eq!(store.len(), 4);
    let guard = ResilienceGuard::from_config(
        "semantic",
        &CircuitBreakerConfig::default(),
        &RetryConfig::default(),
        Arc::new(ManualClock::new()),
    );
    let retriever = HybridRetriever::new(
        Arc::new(ScriptedSemanticProvider::returning(&[])),
        index,
        store,
        guard,
        RetrievalConfig::default(),
    );

    let err = retriever
        .retrieve("right to erasure", 20, &Filters::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::UnknownDocument { id } if id == "doc_1"));
}

#[tokio::test]
async fn semantic_recovery_after_transient_blip() {
    let h = harness(
        semantic_hits().then(Err(RemoteError::RateLimited {
            reason: "429".into(),
        })),
        RetrievalConfig::default(),
    );
    let outcome = h
        .retriever
        .retrieve("gdpr", 20, &Filters::new())
        .await
        .unwrap();
    assert!(!outcome.degraded);
    assert_eq!(h.provider.calls(), 2);
}

/// Lexical index that returns a fixed hit list regardless of the query.
struct FixedLexicalIndex(Vec<(String, f32)>);

impl ILexicalIndex for FixedLexicalIndex {
    fn search(&self, _tokens: &[String], top_m: usize) -> Vec<(String, f32)> {
        self.0.iter().take(top_m).cloned().collect()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

#[tokio::test]
async fn non_finite_lexical_scores_are_dropped() {
    let store = Arc::new(InMemoryDocumentStore::new(compliance_corpus()));
    let index = Arc::new(FixedLexicalIndex(vec![
        ("doc_2".to_string(), f32::NAN),
        ("doc_0".to_string(), f32::INFINITY),
        ("doc_1".to_string(), 3.5),
        ("doc_3".to_string(), 1.0),
    ]));
    let guard = ResilienceGuard::from_config(
        "semantic",
        &CircuitBreakerConfig::default(),
        &RetryConfig::default(),
        Arc::new(ManualClock::new()),
    );
    let retriever = HybridRetriever::new(
        Arc::new(ScriptedSemanticProvider::failing(terminal("offline"))),
        index,
        store,
        guard,
        RetrievalConfig::default(),
    );

    let outcome = retriever
        .retrieve("anything", 20, &Filters::new())
        .await
        .unwrap();
    assert!(outcome.degraded);
    assert_eq!(ids(&outcome.candidates), vec!["doc_1", "doc_3"]);
    assert!(outcome
        .candidates
        .iter()
        .all(|c| c.fused_score.is_finite()));
}
