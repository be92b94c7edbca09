//! BM25 Okapi index over an immutable corpus.
//!
//! Built once from the document store; searches are read-only, so a single
//! index is shared across queries behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;
use vigil_core::models::Document;
use vigil_core::traits::ILexicalIndex;

use super::tokenizer::tokenize;

/// Term-frequency saturation.
pub const BM25_K1: f32 = 1.5;
/// Document-length normalization.
pub const BM25_B: f32 = 0.75;

#[derive(Debug, Clone, Copy)]
struct Posting {
    doc: u32,
    term_frequency: u32,
}

/// Inverted index with BM25 scoring.
#[derive(Debug, Default)]
pub struct Bm25Index {
    postings: HashMap<String, Vec<Posting>>,
    doc_ids: Vec<String>,
    doc_lengths: Vec<u32>,
    total_length: u64,
}

impl Bm25Index {
    /// Index `documents`. Tokenization runs in parallel; internal ids follow
    /// input order, which is also the tie-break for equal scores.
    pub fn build(documents: &[Arc<Document>]) -> Self {
        let term_counts: Vec<(usize, HashMap<String, u32>)> = documents
            .par_iter()
            .map(|doc| {
                let tokens = tokenize(&doc.text);
                let mut tf: HashMap<String, u32> = HashMap::new();
                for token in &tokens {
                    *tf.entry(token.clone()).or_insert(0) += 1;
                }
                (tokens.len(), tf)
            })
            .collect();

        let mut index = Self::default();
        for (doc, (length, tf)) in documents.iter().zip(term_counts) {
            let internal = index.doc_ids.len() as u32;
            index.doc_ids.push(doc.id.clone());
            index.doc_lengths.push(length as u32);
            index.total_length += length as u64;
            for (term, term_frequency) in tf {
                index.postings.entry(term).or_default().push(Posting {
                    doc: internal,
                    term_frequency,
                });
            }
        }

        debug!(
            documents = index.doc_ids.len(),
            terms = index.postings.len(),
            "bm25 index built"
        );
        index
    }

    fn average_length(&self) -> f32 {
        if self.doc_ids.is_empty() {
            0.0
        } else {
            self.total_length as f32 / self.doc_ids.len() as f32
        }
    }
}

impl ILexicalIndex for Bm25Index {
    fn search(&self, tokens: &[String], top_m: usize) -> Vec<(String, f32)> {
        if tokens.is_empty() || self.doc_ids.is_empty() || top_m == 0 {
            return Vec::new();
        }

        let n = self.doc_ids.len() as f32;
        let avgdl = self.average_length().max(f32::EPSILON);
        let mut scores: HashMap<u32, f32> = HashMap::new();

        for token in tokens {
            let Some(postings) = self.postings.get(token) else {
                continue;
            };
            let df = postings.len() as f32;
            // IDF: ln((N - df + 0.5) / (df + 0.5) + 1), always positive.
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
            for posting in postings {
                let dl = self.doc_lengths[posting.doc as usize] as f32;
                let tf = posting.term_frequency as f32;
                let tf_norm =
                    (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * (1.0 - BM25_B + BM25_B * dl / avgdl));
                *scores.entry(posting.doc).or_insert(0.0) += idf * tf_norm;
            }
        }

        let mut ranked: Vec<(u32, f32)> = scores.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(top_m);
        ranked
            .into_iter()
            .map(|(doc, score)| (self.doc_ids[doc as usize].clone(), score))
            .collect()
    }

    fn len(&self) -> usize {
        self.doc_ids.len()
    }
}
