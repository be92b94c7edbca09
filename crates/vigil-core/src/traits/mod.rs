//! Collaborator boundaries. Implementations live outside the core.

mod document_store;
mod generator;
mod lexical;
mod relevance;
mod semantic;

pub use document_store::IDocumentStore;
pub use generator::{IAnswerGenerator, ICompletionModel};
pub use lexical::ILexicalIndex;
pub use relevance::IRelevanceModel;
pub use semantic::ISemanticSearchProvider;
