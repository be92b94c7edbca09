use std::sync::Arc;

use crate::models::Document;

/// Read-only corpus lookup.
pub trait IDocumentStore: Send + Sync {
    fn get(&self, id: &str) -> Option<Arc<Document>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
