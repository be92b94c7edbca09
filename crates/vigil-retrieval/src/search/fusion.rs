//! Weighted score fusion: `fused = w_s * norm(semantic) + w_l * norm(lexical)`.
//!
//! Each leg is normalized independently per query, the union of both legs is
//! scored (a missing leg contributes 0), and the result is sorted descending
//! with a total, deterministic tie-break:
//! semantic rank (absent sorts last) → lexical rank (absent sorts last) → id.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use vigil_core::config::Normalization;
use vigil_core::models::{Document, FusedCandidate};

/// Fusion weights. Validated by config to be non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub semantic: f64,
    pub lexical: f64,
}

impl FusionWeights {
    pub fn new(semantic: f64, lexical: f64) -> Self {
        Self { semantic, lexical }
    }

    /// Weights used when the semantic leg is unavailable.
    pub fn lexical_only() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// One leg's resolved hits, in the leg's own rank order.
pub type LegHits = Vec<(Arc<Document>, f32)>;

/// Map raw scores onto `[0, 1]`.
///
/// `MinMax`: `(s - min) / (max - min)`, every score maps to 1.0 when the range
/// is zero (including a single hit). `Native`: clamp.
pub fn normalize(scores: &[f32], mode: Normalization) -> Vec<f64> {
    match mode {
        Normalization::Native => scores
            .iter()
            .map(|&s| f64::from(s).clamp(0.0, 1.0))
            .collect(),
        Normalization::MinMax => {
            let (min, max) = scores.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
                let s = f64::from(s);
                (lo.min(s), hi.max(s))
            });
            let range = max - min;
            if range.is_nan() || range <= 0.0 {
                return vec![1.0; scores.len()];
            }
            scores.iter().map(|&s| (f64::from(s) - min) / range).collect()
        }
    }
}

/// Keep the first occurrence of each id.
pub fn dedup_first<T>(hits: Vec<(String, T)>) -> Vec<(String, T)> {
    let mut seen = std::collections::HashSet::with_capacity(hits.len());
    hits.into_iter().filter(|(id, _)| seen.insert(id.clone())).collect()
}

/// Fuse both legs and return the best `top_n` candidates.
///
/// Legs must already be deduplicated.
pub fn fuse(
    semantic: &LegHits,
    lexical: &LegHits,
    weights: FusionWeights,
    normalization: Normalization,
    top_n: usize,
) -> Vec<FusedCandidate> {
    let sem_norm = normalize(&scores(semantic), normalization);
    let lex_norm = normalize(&scores(lexical), normalization);

    let mut slots: HashMap<&str, usize> = HashMap::with_capacity(semantic.len() + lexical.len());
    let mut fused: Vec<FusedCandidate> = Vec::with_capacity(semantic.len() + lexical.len());

    for (rank, ((doc, raw), norm)) in semantic.iter().zip(&sem_norm).enumerate() {
        slots.insert(doc.id.as_str(), fused.len());
        fused.push(FusedCandidate {
            document: Arc::clone(doc),
            fused_score: weights.semantic * norm,
            semantic_score: Some(*raw),
            lexical_score: None,
            semantic_rank: Some(rank),
            lexical_rank: None,
        });
    }

    for (rank, ((doc, raw), norm)) in lexical.iter().zip(&lex_norm).enumerate() {
        let contribution = weights.lexical * norm;
        match slots.get(doc.id.as_str()) {
            Some(&slot) => {
                let candidate = &mut fused[slot];
                candidate.fused_score += contribution;
                candidate.lexical_score = Some(*raw);
                candidate.lexical_rank = Some(rank);
            }
            None => {
                slots.insert(doc.id.as_str(), fused.len());
                fused.push(FusedCandidate {
                    document: Arc::clone(doc),
                    fused_score: contribution,
                    semantic_score: None,
                    lexical_score: Some(*raw),
                    semantic_rank: None,
                    lexical_rank: Some(rank),
                });
            }
        }
    }

    fused.sort_by(compare);
    fused.truncate(top_n);
    fused
}

fn scores(hits: &LegHits) -> Vec<f32> {
    hits.iter().map(|(_, s)| *s).collect()
}

fn compare(a: &FusedCandidate, b: &FusedCandidate) -> Ordering {
    b.fused_score
        .total_cmp(&a.fused_score)
        .then_with(|| present_first(a.semantic_rank, b.semantic_rank))
        .then_with(|| present_first(a.lexical_rank, b.lexical_rank))
        .then_with(|| a.id().cmp(b.id()))
}

fn present_first(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
