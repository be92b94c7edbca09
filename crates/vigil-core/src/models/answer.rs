use serde::{Deserialize, Serialize};

use crate::constants::{CITATION_ELLIPSIS, CITATION_SNIPPET_CHARS, UNKNOWN_PAGE, UNKNOWN_SOURCE};

use super::{Document, RerankedCandidate};

/// A source citation attached to an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub document_id: String,
    pub source: String,
    pub page: String,
    /// Leading text of the passage, truncated for display.
    pub snippet: String,
    pub relevance_score: Option<f32>,
}

impl Citation {
    pub fn from_document(document: &Document) -> Self {
        let source = document
            .metadata
            .get("source")
            .map(ToString::to_string)
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
        let page = document
            .metadata
            .get("page")
            .map(ToString::to_string)
            .unwrap_or_else(|| UNKNOWN_PAGE.to_string());
        Self {
            document_id: document.id.clone(),
            source,
            page,
            snippet: snippet(&document.text, CITATION_SNIPPET_CHARS),
            relevance_score: None,
        }
    }

    pub fn from_candidate(candidate: &RerankedCandidate) -> Self {
        Self {
            relevance_score: Some(candidate.relevance_score),
            ..Self::from_document(&candidate.document)
        }
    }
}

/// First `max_chars` characters of `text`, with an ellipsis when truncated.
pub fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], CITATION_ELLIPSIS),
        None => text.to_string(),
    }
}

/// Output of the external answer generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    pub text: String,
    pub citations: Vec<Citation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_not_truncated() {
        assert_eq!(snippet("GDPR Article 17", 200), "GDPR Article 17");
    }

    #[test]
    fn long_text_is_truncated_with_ellipsis() {
        let text = "a".repeat(250);
        let s = snippet(&text, 200);
        assert_eq!(s.len(), 203);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(201);
        let s = snippet(&text, 200);
        assert_eq!(s.chars().count(), 203);
    }

    #[test]
    fn citation_defaults_missing_metadata() {
        let doc = Document::new("doc_9", "text");
        let citation = Citation::from_document(&doc);
        assert_eq!(citation.source, "unknown");
        assert_eq!(citation.page, "N/A");
    }

    #[test]
    fn citation_renders_page_number() {
        let doc = Document::new("doc_1", "text")
            .with_metadata("source", "gdpr.pdf")
            .with_metadata("page", 17i64);
        let citation = Citation::from_document(&doc);
        assert_eq!(citation.source, "gdpr.pdf");
        assert_eq!(citation.page, "17");
    }
}
