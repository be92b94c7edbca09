//! In-process relevance model: fraction of distinct query terms present in
//! the passage. Deterministic and dependency-free, usable when no external
//! cross-encoder is configured.

use std::collections::HashSet;

use async_trait::async_trait;
use rayon::prelude::*;
use vigil_core::errors::RemoteError;
use vigil_core::traits::IRelevanceModel;

use crate::lexical::tokenize;

#[derive(Debug, Default, Clone, Copy)]
pub struct TermOverlapModel;

impl TermOverlapModel {
    pub fn new() -> Self {
        Self
    }

    /// Score one passage against pre-tokenized query terms.
    pub fn score_passage(query_terms: &HashSet<String>, passage: &str) -> f32 {
        if query_terms.is_empty() {
            return 0.0;
        }
        let passage_terms: HashSet<String> = tokenize(passage).into_iter().collect();
        let shared = query_terms.intersection(&passage_terms).count();
        shared as f32 / query_terms.len() as f32
    }
}

#[async_trait]
impl IRelevanceModel for TermOverlapModel {
    async fn score(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>, RemoteError> {
        let query_terms: HashSet<String> = tokenize(query).into_iter().collect();
        Ok(passages
            .par_iter()
            .map(|passage| Self::score_passage(&query_terms, passage))
            .collect())
    }

    fn name(&self) -> &str {
        "term-overlap"
    }
}
