//! Tokenization shared by indexing and querying.
//!
//! Text is NFKC-normalized, split on non-alphanumeric boundaries and
//! lower-cased. Tokens shorter than [`MIN_TOKEN_CHARS`] characters and
//! stopwords are dropped.

use unicode_normalization::UnicodeNormalization;

/// Minimum token length in characters.
pub const MIN_TOKEN_CHARS: usize = 2;

/// Small English stopword set. Kept short on purpose: words such as "no" or
/// "not" carry meaning in error messages.
pub const STOPWORDS: &[&str] = &[
    "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "in", "is", "it", "its",
    "of", "on", "or", "that", "the", "this", "to", "was", "with",
];

/// Whether `token` is a stopword (expects a lower-cased token).
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Tokenize text into index terms, preserving order and duplicates.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text.nfkc().collect();
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|raw| raw.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_lowercase)
        .filter(|token| !is_stopword(token))
        .collect()
}

/// Normalize text for phrase matching.
///
/// Produces lower-cased alphanumeric runs joined by single spaces and padded
/// with a leading and trailing space, so a phrase normalized the same way can
/// be located with a plain substring search on word boundaries.
pub fn phrase_text(text: &str) -> String {
    let normalized: String = text.nfkc().collect();
    let mut out = String::with_capacity(normalized.len() + 2);
    out.push(' ');
    for word in normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        out.push_str(&word.to_lowercase());
        out.push(' ');
    }
    out
}

/// Whether `haystack` (from [`phrase_text`]) contains `phrase` on word boundaries.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let needle = phrase_text(phrase);
    if needle.trim().is_empty() {
        return false;
    }
    haystack.contains(&needle)
}
