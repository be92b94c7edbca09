//! # vigil-retrieval
//!
//! Two-stage retrieval over a compliance corpus.
//!
//! Stage 1 ([`HybridRetriever`]): the guarded semantic leg and the in-process
//! BM25 leg run concurrently, each leg's scores are normalized per query and
//! combined by weighted sum. A failing semantic leg degrades the query to
//! lexical-only results instead of failing it.
//!
//! Stage 2 ([`Reranker`]): a pairwise relevance model scores every fused
//! candidate against the query and the top-K survive.

pub mod engine;
pub mod lexical;
pub mod ranking;
pub mod search;
pub mod store;

pub use engine::{HybridRetriever, RetrievalOutcome};
pub use lexical::{tokenize, Bm25Index};
pub use ranking::{Reranker, TermOverlapModel};
pub use store::InMemoryDocumentStore;
