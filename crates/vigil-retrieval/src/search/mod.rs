//! Score normalization and weighted fusion of the semantic and lexical legs.

pub mod fusion;

pub use fusion::{dedup_first, fuse, normalize, FusionWeights, LegHits};
