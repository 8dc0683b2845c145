// WordPiece Tokenizer
// Greedy longest-match subword tokenization against the shared vocabulary:
// lowercase, split on whitespace and punctuation into word units, then cover
// each unit with the fewest pieces via longest-prefix lookup. Non-initial
// pieces carry the ## continuation prefix. A unit that cannot be covered at
// some position collapses to a single [UNK]; matching never backtracks across
// an [UNK] emission.
//
// Pure and deterministic; the vocabulary is passed by reference and never
// mutated.

use crate::services::vocab::{Vocabulary, UNK_TOKEN};

/// Continuation prefix for non-initial pieces of a word unit. Presentational
/// only; the ID comes from the prefixed vocabulary entry.
pub const CONTINUATION_PREFIX: &str = "##";

/// Upper bound on candidate subword length during greedy matching.
pub const MAX_SUBWORD_CHARS: usize = 100;

/// One subword: surface string (with ## for continuations) plus vocabulary ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub id: u32,
}

/// Tokenize raw text into the full, unbounded token sequence, without special
/// tokens. Empty or whitespace-only input yields an empty sequence; callers
/// must reject that before windowing.
pub fn tokenize(vocab: &Vocabulary, text: &str) -> Vec<Token> {
    let normalized = text.to_lowercase();
    let mut tokens = Vec::new();

    for unit in pretokenize(&normalized) {
        match wordpiece_unit(vocab, &unit) {
            Some(pieces) => tokens.extend(pieces),
            // Whole unit is out of vocabulary: exactly one [UNK] per unit.
            None => tokens.push(Token {
                text: UNK_TOKEN.to_string(),
                id: vocab.unk_id(),
            }),
        }
    }

    tokens
}

/// Reconstruct display text from token IDs: specials and padding are dropped,
/// ## continuations merge into their preceding piece.
pub fn detokenize(vocab: &Vocabulary, ids: &[u32]) -> String {
    let mut words: Vec<String> = Vec::new();

    for &id in ids {
        if id == vocab.cls_id() || id == vocab.sep_id() || id == vocab.pad_id() {
            continue;
        }
        let Some(token) = vocab.token_of(id) else {
            continue;
        };
        match token.strip_prefix(CONTINUATION_PREFIX) {
            Some(suffix) => match words.last_mut() {
                Some(last) => last.push_str(suffix),
                None => words.push(suffix.to_string()),
            },
            None => words.push(token.to_string()),
        }
    }

    words.join(" ")
}

/// Split normalized text into coarse word units: whitespace separates units,
/// punctuation characters stand alone.
fn pretokenize(text: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !current.is_empty() {
                units.push(std::mem::take(&mut current));
            }
        } else if is_punctuation(ch) {
            if !current.is_empty() {
                units.push(std::mem::take(&mut current));
            }
            units.push(ch.to_string());
        } else {
            current.push(ch);
        }
    }

    if !current.is_empty() {
        units.push(current);
    }

    units
}

/// Cover one word unit with greedy longest-prefix matches. Returns None when
/// some position has no vocabulary match, including the ##-prefixed case.
fn wordpiece_unit(vocab: &Vocabulary, unit: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = unit.chars().collect();
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + MAX_SUBWORD_CHARS).min(chars.len());
        let mut matched = None;

        while end > start {
            let candidate: String = if start == 0 {
                chars[start..end].iter().collect()
            } else {
                let mut s = String::from(CONTINUATION_PREFIX);
                s.extend(&chars[start..end]);
                s
            };

            if let Some(id) = vocab.id_of(&candidate) {
                matched = Some((candidate, id, end));
                break;
            }
            end -= 1;
        }

        match matched {
            Some((text, id, next)) => {
                pieces.push(Token { text, id });
                start = next;
            }
            None => return None,
        }
    }

    Some(pieces)
}

/// ASCII punctuation plus the common Unicode punctuation blocks. Word units
/// break on these so "hello,world" tokenizes as three units.
fn is_punctuation(ch: char) -> bool {
    if ch.is_ascii() {
        return ch.is_ascii_punctuation();
    }
    let cp = ch as u32;
    (0x00A1..=0x00BF).contains(&cp)       // Latin-1 punctuation
        || (0x2000..=0x206F).contains(&cp) // General Punctuation
        || (0x2E00..=0x2E7F).contains(&cp) // Supplemental Punctuation
        || (0x3000..=0x303F).contains(&cp) // CJK Symbols and Punctuation
        || (0xFE30..=0xFE4F).contains(&cp) // CJK Compatibility Forms
        || (0xFE50..=0xFE6F).contains(&cp) // Small Form Variants
        || (0xFF01..=0xFF0F).contains(&cp) // Fullwidth forms
        || (0xFF1A..=0xFF20).contains(&cp)
        || (0xFF3B..=0xFF40).contains(&cp)
        || (0xFF5B..=0xFF65).contains(&cp)
}
