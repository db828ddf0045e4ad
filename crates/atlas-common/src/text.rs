/// Text normalization helpers shared by the parser, the denoiser and the matcher.
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-]").expect("valid regex"));

/// Words too common to count as term components.
pub const STOP_WORDS: &[&str] = &[
    "of", "the", "and", "or", "in", "on", "at", "to", "for", "with", "by",
];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Collapse every whitespace run (including newlines) into a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cap `text` at `max_chars` characters, ending in "..." when it was cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Cap `text` at `max_chars` characters without a marker.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Decompose and drop combining marks: "Ångström" -> "Angstrom".
pub fn strip_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Matching form of a term or caption: accent-stripped, lowercase, punctuation
/// replaced by spaces (hyphens kept), whitespace collapsed.
pub fn normalize_text(text: &str) -> String {
    let lowered = strip_accents(text).to_lowercase();
    let spaced = NON_WORD.replace_all(lowered.trim(), " ");
    collapse_whitespace(&spaced)
}

/// Whole words of normalized text, splitting on spaces and hyphens.
pub fn words(normalized: &str) -> Vec<&str> {
    normalized
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| !w.is_empty())
        .collect()
}

/// True when `phrase` occurs in `haystack` on word boundaries (both normalized).
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let padded_haystack = format!(" {} ", haystack.replace('-', " "));
    let padded_phrase = format!(" {} ", phrase.replace('-', " "));
    padded_haystack.contains(&padded_phrase)
}
