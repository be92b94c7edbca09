//! Degradation tracking: which components are running in fallback mode.

pub mod tracker;

pub use tracker::{DegradationTracker, RecoveryStatus, TrackedDegradation};
