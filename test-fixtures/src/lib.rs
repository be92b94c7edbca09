//! Test fixtures for Vigil: the compliance corpus, a fixture loader, and
//! scripted doubles for every remote collaborator.
//!
//! The doubles count their calls and can be scripted to fail, stall, or
//! return canned results, so pipeline tests can drive each failure path
//! deterministically.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use vigil_core::errors::RemoteError;
use vigil_core::models::{Citation, Document, Filters, GeneratedAnswer, RerankedCandidate};
use vigil_core::traits::{IAnswerGenerator, IRelevanceModel, ISemanticSearchProvider};

/// Root directory of the test-fixtures folder.
fn fixtures_root() -> PathBuf {
    // Walk up from whichever crate is running tests until test-fixtures is found.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);
    while !path.join("test-fixtures").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures directory from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// The five-document compliance corpus (`doc_0` .. `doc_4`).
pub fn compliance_corpus() -> Vec<Document> {
    load_fixture("corpus/compliance_docs.json")
}

/// Build a filter map from string pairs.
pub fn filters(pairs: &[(&str, &str)]) -> Filters {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).into()))
        .collect()
}

/// A transient remote failure.
pub fn transient(operation: &str) -> RemoteError {
    RemoteError::Timeout {
        operation: operation.to_string(),
    }
}

/// A terminal remote failure.
pub fn terminal(reason: &str) -> RemoteError {
    RemoteError::Unauthorized {
        reason: reason.to_string(),
    }
}

// ── Semantic search ─────────────────────────────────────────────────────────

type SearchResult = Result<Vec<(String, f32)>, RemoteError>;

/// Semantic search double.
///
/// Scripted responses are consumed in order; once exhausted every call returns
/// the fallback response.
#[derive(Debug)]
pub struct ScriptedSemanticProvider {
    script: Mutex<VecDeque<SearchResult>>,
    fallback: SearchResult,
    delay: Option<Duration>,
    calls: AtomicU32,
    last_filters: Mutex<Option<Filters>>,
}

impl ScriptedSemanticProvider {
    /// Always returns `hits`.
    pub fn returning(hits: &[(&str, f32)]) -> Self {
        Self::with_fallback(Ok(hits
            .iter()
            .map(|(id, score)| ((*id).to_string(), *score))
            .collect()))
    }

    /// Always fails with `error`.
    pub fn failing(error: RemoteError) -> Self {
        Self::with_fallback(Err(error))
    }

    fn with_fallback(fallback: SearchResult) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            delay: None,
            calls: AtomicU32::new(0),
            last_filters: Mutex::new(None),
        }
    }

    /// Queue `result` ahead of the fallback.
    pub fn then(self, result: SearchResult) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
        self
    }

    /// Queue `n` transient failures ahead of the fallback.
    pub fn then_fail_times(mut self, n: usize, error: RemoteError) -> Self {
        for _ in 0..n {
            self = self.then(Err(error.clone()));
        }
        self
    }

    /// Sleep on the tokio clock before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_filters(&self) -> Option<Filters> {
        self.last_filters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ISemanticSearchProvider for ScriptedSemanticProvider {
    async fn search(&self, _query: &str, top_m: usize, filters: &Filters) -> SearchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_filters.lock().unwrap_or_else(|e| e.into_inner()) = Some(filters.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
            .map(|mut hits| {
                hits.truncate(top_m);
                hits
            })
    }

    fn name(&self) -> &str {
        "scripted-semantic"
    }
}

// ── Relevance model ─────────────────────────────────────────────────────────

type Scorer = Box<dyn Fn(&str, &str) -> f32 + Send + Sync>;

/// Relevance model double.
pub struct ScriptedRelevanceModel {
    mode: RelevanceMode,
    calls: AtomicU32,
}

enum RelevanceMode {
    Score(Scorer),
    Fixed(Result<Vec<f32>, RemoteError>),
}

impl ScriptedRelevanceModel {
    /// Score each passage with `f(query, passage)`.
    pub fn scoring(f: impl Fn(&str, &str) -> f32 + Send + Sync + 'static) -> Self {
        Self {
            mode: RelevanceMode::Score(Box::new(f)),
            calls: AtomicU32::new(0),
        }
    }

    /// Score passages by how many query words they contain.
    pub fn keyword_overlap() -> Self {
        Self::scoring(|query, passage| {
            let passage = passage.to_lowercase();
            query
                .to_lowercase()
                .split_whitespace()
                .filter(|word| passage.contains(word))
                .count() as f32
        })
    }

    /// Return exactly `response` regardless of input.
    pub fn fixed(response: Result<Vec<f32>, RemoteError>) -> Self {
        Self {
            mode: RelevanceMode::Fixed(response),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ScriptedRelevanceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedRelevanceModel")
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IRelevanceModel for ScriptedRelevanceModel {
    async fn score(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            RelevanceMode::Score(f) => Ok(passages.iter().map(|p| f(query, p)).collect()),
            RelevanceMode::Fixed(response) => response.clone(),
        }
    }

    fn name(&self) -> &str {
        "scripted-relevance"
    }
}

// ── Answer generator ────────────────────────────────────────────────────────

/// Generator double: answers with the query and the ids it was given.
#[derive(Debug)]
pub struct EchoGenerator {
    failure: Option<RemoteError>,
    delay: Option<Duration>,
    calls: AtomicU32,
}

impl EchoGenerator {
    pub fn new() -> Self {
        Self {
            failure: None,
            delay: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing(error: RemoteError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new()
        }
    }

    /// Sleep on the tokio clock before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for EchoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IAnswerGenerator for EchoGenerator {
    async fn generate(
        &self,
        query: &str,
        documents: &[RerankedCandidate],
    ) -> Result<GeneratedAnswer, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let ids: Vec<&str> = documents.iter().map(|d| d.document.id.as_str()).collect();
        Ok(GeneratedAnswer {
            text: format!("{query} => [{}]", ids.join(", ")),
            citations: documents.iter().map(Citation::from_candidate).collect(),
        })
    }
}
