// Text Processing Service
// Input normalization and the simple display statistics the aggregator
// reports. Word counting here is deliberately whitespace-based, distinct from
// token counting.

use regex::Regex;

/// Minimum whitespace-delimited words for a statistically reliable verdict.
/// Enforced at the caller boundary, before tokenization.
pub const MIN_DETECTION_WORDS: usize = 100;

/// Normalize punctuation and whitespace in pasted text. Opt-in preprocessing
/// at the boundary; the tokenizer itself only lowercases and splits.
pub fn normalize_punctuation(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut s = text.to_string();

    // Replace smart quotes
    s = s
        .replace('\u{201c}', "\"")
        .replace('\u{201d}', "\"")
        .replace('\u{2018}', "'")
        .replace('\u{2019}', "'");

    // Replace em dash
    s = s.replace('\u{2014}', "-");

    // Replace ideographic space and non-breaking space
    let space_re = Regex::new(r"[\u{3000}\u{00A0}]").unwrap();
    s = space_re.replace_all(&s, " ").to_string();

    // Normalize line endings
    s = s.replace("\r\n", "\n").replace('\r', "\n");

    // Collapse horizontal whitespace
    let ws_re = Regex::new(r"[ \t\x0C\x0B]+").unwrap();
    s = ws_re.replace_all(&s, " ").to_string();

    // Strip each line
    s = s
        .lines()
        .map(|ln| ln.trim())
        .collect::<Vec<_>>()
        .join("\n");

    s.trim().to_string()
}

/// Count of maximal non-whitespace runs.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Length in Unicode scalar values, not bytes.
pub fn character_count(text: &str) -> usize {
    text.chars().count()
}

/// True when the text is too short for the detection boundary to accept.
pub fn below_minimum_words(text: &str) -> bool {
    word_count(text) < MIN_DETECTION_WORDS
}
