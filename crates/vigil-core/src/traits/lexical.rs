/// In-process term-matching index (BM25-style).
///
/// Assumed always available: it has no error channel. A panicking
/// implementation fails the query.
pub trait ILexicalIndex: Send + Sync {
    /// Return up to `top_m` `(document_id, relevance)` pairs, best first.
    fn search(&self, tokens: &[String], top_m: usize) -> Vec<(String, f32)>;

    /// Number of indexed documents.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
