use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use vigil_core::config::Normalization;
use vigil_core::models::{Document, FusedCandidate};
use vigil_retrieval::search::{dedup_first, fuse, normalize, FusionWeights, LegHits};

fn arb_leg() -> impl Strategy<Value = LegHits> {
    prop::collection::vec((0u8..30, -5.0f32..50.0), 0..25).prop_map(|raw| {
        let raw: Vec<(String, f32)> = raw
            .into_iter()
            .map(|(id, score)| (format!("doc_{id}"), score))
            .collect();
        dedup_first(raw)
            .into_iter()
            .map(|(id, score)| (Arc::new(Document::new(id, "")), score))
            .collect()
    })
}

fn arb_normalization() -> impl Strategy<Value = Normalization> {
    prop_oneof![Just(Normalization::MinMax), Just(Normalization::Native)]
}

fn ids(candidates: &[FusedCandidate]) -> Vec<String> {
    candidates.iter().map(|c| c.id().to_string()).collect()
}

proptest! {
    #[test]
    fn normalized_scores_stay_in_unit_interval(
        scores in prop::collection::vec(-100.0f32..100.0, 0..50),
        mode in arb_normalization(),
    ) {
        let normalized = normalize(&scores, mode);
        prop_assert_eq!(normalized.len(), scores.len());
        prop_assert!(normalized.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn fused_output_is_sorted_bounded_and_complete(
        semantic in arb_leg(),
        lexical in arb_leg(),
        w in 0.0f64..=1.0,
        mode in arb_normalization(),
        top_n in 1usize..40,
    ) {
        let fused = fuse(&semantic, &lexical, FusionWeights::new(w, 1.0 - w), mode, top_n);

        let union: HashSet<&str> = semantic
            .iter()
            .chain(lexical.iter())
            .map(|(d, _)| d.id.as_str())
            .collect();
        prop_assert_eq!(fused.len(), union.len().min(top_n));

        let unique: HashSet<&str> = fused.iter().map(|c| c.id()).collect();
        prop_assert_eq!(unique.len(), fused.len());

        for pair in fused.windows(2) {
            prop_assert!(pair[0].fused_score >= pair[1].fused_score);
        }
        prop_assert!(fused.iter().all(|c| c.fused_score >= 0.0 && c.fused_score <= 1.0 + 1e-9));
    }

    #[test]
    fn fusion_is_deterministic(
        semantic in arb_leg(),
        lexical in arb_leg(),
        mode in arb_normalization(),
    ) {
        let weights = FusionWeights::new(0.9, 0.1);
        let a = fuse(&semantic, &lexical, weights, mode, 20);
        let b = fuse(&semantic, &lexical, weights, mode, 20);
        prop_assert_eq!(ids(&a), ids(&b));
    }

    /// With all weight on the semantic leg the output starts with the semantic
    /// leg in its own order (provider order is descending by score).
    #[test]
    fn full_semantic_weight_preserves_semantic_order(
        semantic in arb_leg(),
        lexical in arb_leg(),
    ) {
        let mut semantic = semantic;
        semantic.sort_by(|a, b| b.1.total_cmp(&a.1));

        let fused = fuse(
            &semantic,
            &lexical,
            FusionWeights::new(1.0, 0.0),
            Normalization::MinMax,
            usize::MAX,
        );
        let expected: Vec<String> = semantic.iter().map(|(d, _)| d.id.clone()).collect();
        let got = ids(&fused);
        prop_assert_eq!(&got[..expected.len()], &expected[..]);
    }
}
