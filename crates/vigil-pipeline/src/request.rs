use std::time::Duration;

use serde::{Deserialize, Serialize};
use vigil_core::models::{Filters, MetadataValue};

/// A question for the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Metadata constraints; every pair must match a document's metadata.
    #[serde(default)]
    pub filters: Filters,
    /// Overrides `pipeline.default_deadline_secs`.
    #[serde(default)]
    pub deadline: Option<Duration>,
    /// Overrides `pipeline.return_sources`.
    #[serde(default)]
    pub return_sources: Option<bool>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: Filters::new(),
            deadline: None,
            return_sources: None,
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_sources(mut self, return_sources: bool) -> Self {
        self.return_sources = Some(return_sources);
        self
    }
}
