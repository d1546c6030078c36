//! Text normalization, keyword extraction and lexical similarity

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{0000}-\u{001F}\u{007F}-\u{009F}]").unwrap());
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").unwrap());

/// Words too common to carry relevance signal.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "with",
];

/// Minimum token length considered a keyword.
const MIN_KEYWORD_LEN: usize = 3;

/// Strips control characters and collapses whitespace runs to single spaces.
pub fn sanitize(text: &str) -> String {
    let stripped = CONTROL_CHARS.replace_all(text, "");
    WHITESPACE_RUNS.replace_all(&stripped, " ").trim().to_string()
}

/// Sanitizes and bounds text to `max_chars`, appending an ellipsis when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    truncate_chars(&sanitize(text), max_chars)
}

/// Bounds text to `max_chars` characters without normalizing it.
///
/// Truncation counts `char`s, so a cut never lands inside a multi-byte
/// UTF-8 sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    // Caps too small to hold the ellipsis get a bare prefix.
    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }

    let mut out: String = text.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}

/// Lowercased word set of `text`, excluding stopwords and short tokens.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    let normalized = sanitize(text).to_lowercase();

    NON_WORD
        .split(&normalized)
        .filter(|word| word.len() >= MIN_KEYWORD_LEN && !STOPWORDS.contains(word))
        .map(|word| word.to_string())
        .collect()
}

/// Jaccard similarity over the keyword sets of two texts.
///
/// Returns 0.0 when either keyword set is empty.
pub fn jaccard_similarity(text1: &str, text2: &str) -> f64 {
    let words1 = extract_keywords(text1);
    let words2 = extract_keywords(text2);

    if words1.is_empty() || words2.is_empty() {
        return 0.0;
    }

    let intersection = words1.intersection(&words2).count();
    let union = words1.union(&words2).count();

    intersection as f64 / union as f64
}
