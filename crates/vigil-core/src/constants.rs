/// Characters of document text kept in a citation snippet.
pub const CITATION_SNIPPET_CHARS: usize = 200;

/// Suffix appended to truncated citation snippets.
pub const CITATION_ELLIPSIS: &str = "...";

/// Citation source used when a document carries no `source` metadata.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Citation page used when a document carries no `page` metadata.
pub const UNKNOWN_PAGE: &str = "N/A";

/// Separator between the normalized query and the filter block in cache keys.
pub const CACHE_KEY_SEPARATOR: char = '\u{1f}';

/// Tolerance for the `semantic_weight + lexical_weight == 1` check.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;
