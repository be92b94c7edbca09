//! # vigil-core
//!
//! Foundation crate for the Vigil retrieval pipeline.
//! Defines the data model, error taxonomy, configuration, clock abstraction,
//! and the collaborator traits every other crate in the workspace builds on.

pub mod clock;
pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use clock::{IClock, ManualClock, SystemClock};
pub use config::VigilConfig;
pub use errors::{FailureReason, VigilError, VigilResult};
pub use models::{Document, FusedCandidate, MetadataValue, RerankedCandidate};
