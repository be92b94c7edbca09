//! # vigil-observability
//!
//! Structured tracing setup, span macros, event helpers, pipeline metrics and
//! degradation tracking.

pub mod degradation;
pub mod metrics;
pub mod tracing_setup;

pub use degradation::{DegradationTracker, RecoveryStatus, TrackedDegradation};
pub use metrics::{MetricsSnapshot, PipelineMetrics};
pub use tracing_setup::events;
pub use tracing_setup::{init_tracing, init_tracing_from_config, init_tracing_with_filter};
