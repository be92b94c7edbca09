//! # vigil-pipeline
//!
//! The query orchestrator.
//!
//! ```text
//! QueryRequest
//!   → validate → cache key → QueryCache::get
//!   → (miss) single-flight gate → HybridRetriever → Reranker → IAnswerGenerator
//!   → QueryCache::put (non-degraded only)
//!   → QueryResponse
//! ```
//!
//! The whole sequence runs under the request deadline; expiry drops the
//! in-flight future, cancelling retries, backoff sleeps and both retrieval legs.

pub mod builder;
pub mod pipeline;
pub mod prompt;
pub mod request;
pub mod response;
pub mod single_flight;

pub use builder::QueryPipelineBuilder;
pub use pipeline::QueryPipeline;
pub use prompt::{build_prompt, PromptGenerator};
pub use request::QueryRequest;
pub use response::{CachedAnswer, QueryResponse};
pub use single_flight::SingleFlight;
