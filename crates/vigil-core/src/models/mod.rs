pub mod answer;
pub mod candidate;
pub mod degradation_event;
pub mod document;

pub use answer::{Citation, GeneratedAnswer};
pub use candidate::{FusedCandidate, RerankedCandidate, SourceRef};
pub use degradation_event::{DegradationEvent, DegradationReason};
pub use document::{Document, Filters, Metadata, MetadataValue};
