use async_trait::async_trait;

use crate::errors::RemoteError;
use crate::models::{GeneratedAnswer, RerankedCandidate};

/// Answer synthesis from the reranked passages (an LLM call).
#[async_trait]
pub trait IAnswerGenerator: Send + Sync {
    /// `documents` are ordered best first and contain no duplicates.
    async fn generate(
        &self,
        query: &str,
        documents: &[RerankedCandidate],
    ) -> Result<GeneratedAnswer, RemoteError>;
}

/// Raw text completion (a chat/completions endpoint behind a prompt).
#[async_trait]
pub trait ICompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, RemoteError>;

    fn name(&self) -> &str;
}
