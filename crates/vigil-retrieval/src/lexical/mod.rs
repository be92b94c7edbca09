//! In-process lexical search: tokenizer and BM25 Okapi index.

pub mod bm25;
pub mod tokenizer;

pub use bm25::Bm25Index;
pub use tokenizer::tokenize;
