//! Prompt assembly and a generator that drives a plain completion model.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use vigil_core::errors::RemoteError;
use vigil_core::models::{Citation, GeneratedAnswer, RerankedCandidate};
use vigil_core::traits::{IAnswerGenerator, ICompletionModel};

const PREAMBLE: &str = "Answer the question based on the following context from compliance documents.\n\
                        Provide accurate information and cite your sources.";

/// Assemble the grounded-answer prompt. Passages appear in the given order,
/// separated by blank lines.
pub fn build_prompt(query: &str, documents: &[RerankedCandidate]) -> String {
    let context = documents
        .iter()
        .map(|d| d.document.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{PREAMBLE}\n\nContext:\n{context}\n\nQuestion: {query}\n\nAnswer:")
}

/// [`IAnswerGenerator`] over an [`ICompletionModel`]: builds the prompt,
/// completes it, and cites every passage it was given.
pub struct PromptGenerator {
    model: Arc<dyn ICompletionModel>,
}

impl PromptGenerator {
    pub fn new(model: Arc<dyn ICompletionModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl IAnswerGenerator for PromptGenerator {
    async fn generate(
        &self,
        query: &str,
        documents: &[RerankedCandidate],
    ) -> Result<GeneratedAnswer, RemoteError> {
        let prompt = build_prompt(query, documents);
        debug!(model = self.model.name(), prompt_chars = prompt.len(), "completing prompt");
        let text = self.model.complete(&prompt).await?;
        Ok(GeneratedAnswer {
            text: text.trim().to_string(),
            citations: documents.iter().map(Citation::from_candidate).collect(),
        })
    }
}
