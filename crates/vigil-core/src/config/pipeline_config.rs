use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{defaults, saturating_secs};

/// Orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Deadline applied to requests that do not carry their own.
    pub default_deadline_secs: Option<f64>,
    /// Whether responses carry citations unless the request says otherwise.
    pub return_sources: bool,
}

impl PipelineConfig {
    pub fn default_deadline(&self) -> Option<Duration> {
        self.default_deadline_secs.map(saturating_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_deadline_secs: defaults::DEFAULT_DEADLINE_SECS,
            return_sources: defaults::DEFAULT_RETURN_SOURCES,
        }
    }
}
