use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;
use vigil_core::models::Document;
use vigil_core::traits::IDocumentStore;

/// Read-only corpus held in memory, keyed by document id.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: Vec<Arc<Document>>,
    by_id: HashMap<String, usize>,
}

impl InMemoryDocumentStore {
    /// Load `documents`. A repeated id keeps the first copy.
    pub fn new(documents: impl IntoIterator<Item = Document>) -> Self {
        let mut store = Self::default();
        for doc in documents {
            if store.by_id.contains_key(&doc.id) {
                warn!(id = %doc.id, "duplicate document id, keeping first");
                continue;
            }
            store.by_id.insert(doc.id.clone(), store.documents.len());
            store.documents.push(Arc::new(doc));
        }
        store
    }

    /// Documents in load order.
    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }
}

impl IDocumentStore for InMemoryDocumentStore {
    fn get(&self, id: &str) -> Option<Arc<Document>> {
        self.by_id.get(id).map(|&i| Arc::clone(&self.documents[i]))
    }

    fn len(&self) -> usize {
        self.documents.len()
    }
}
