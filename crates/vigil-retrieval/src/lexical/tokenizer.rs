use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").ok());

/// Split text into lowercase word tokens (runs of letters and digits).
///
/// Used for both indexing and querying so the two always agree.
pub fn tokenize(text: &str) -> Vec<String> {
    match WORD.as_ref() {
        Some(re) => re
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect(),
        None => text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect(),
    }
}
