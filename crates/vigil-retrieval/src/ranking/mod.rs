//! Second-stage ranking: pairwise relevance scoring of fused candidates.

pub mod reranker;
pub mod term_overlap;

pub use reranker::Reranker;
pub use term_overlap::TermOverlapModel;
