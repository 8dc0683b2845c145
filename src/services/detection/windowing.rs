// Window Splitter
// Partitions an unbounded token ID sequence into fixed-size, overlapping
// windows consumable by the fixed-context classifier. Every window is exactly
// max_len positions: [CLS] + content + [SEP], padded with [PAD], with a
// same-length attention mask (1 = real/special, 0 = padding).
//
// Coverage invariant: every content position of the input appears in at least
// one window. The final window is anchored backward from the end of the
// sequence, so a short remainder widens the last overlap instead of dropping
// trailing tokens.

use crate::error::DetectError;
use crate::services::vocab::Vocabulary;

/// Model context size, including the two special-token slots.
pub const DEFAULT_MAX_LEN: usize = 256;
/// Content tokens shared between consecutive windows.
pub const DEFAULT_OVERLAP: usize = 128;

/// A fixed-length, padded slice of the token sequence plus its attention mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub ids: Vec<u32>,
    pub mask: Vec<u32>,
}

impl Window {
    /// Number of real content tokens (mask total minus [CLS] and [SEP]).
    pub fn content_len(&self) -> usize {
        self.mask.iter().filter(|&&m| m == 1).count() - 2
    }

    /// The content token IDs, without specials or padding.
    pub fn content_ids(&self) -> &[u32] {
        &self.ids[1..1 + self.content_len()]
    }
}

/// Split a token ID sequence into overlapping windows.
///
/// Requires `overlap < max_len - 2`; the two reserved slots hold [CLS] and
/// [SEP]. Fails eagerly rather than producing degenerate output: bad geometry
/// is `InvalidConfiguration`, an empty sequence is `EmptyInput`.
pub fn split_windows(
    vocab: &Vocabulary,
    tokens: &[u32],
    max_len: usize,
    overlap: usize,
) -> Result<Vec<Window>, DetectError> {
    if max_len <= 2 {
        return Err(DetectError::InvalidConfiguration(format!(
            "max_len {} leaves no room for content after [CLS]/[SEP]",
            max_len
        )));
    }
    let capacity = max_len - 2;
    if overlap >= capacity {
        return Err(DetectError::InvalidConfiguration(format!(
            "overlap {} must be less than max_len - 2 ({})",
            overlap, capacity
        )));
    }
    if tokens.is_empty() {
        return Err(DetectError::EmptyInput(
            "cannot build windows from an empty token sequence".to_string(),
        ));
    }

    if tokens.len() <= capacity {
        return Ok(vec![build_window(vocab, tokens, max_len)]);
    }

    let stride = capacity - overlap;
    let mut windows = Vec::new();
    let mut start = 0;

    loop {
        if start + capacity >= tokens.len() {
            // Final window: take a full slice ending at the last token, even
            // if that overlaps its predecessor by more than `overlap`.
            let tail = tokens.len() - capacity;
            windows.push(build_window(vocab, &tokens[tail..], max_len));
            break;
        }
        windows.push(build_window(vocab, &tokens[start..start + capacity], max_len));
        start += stride;
    }

    Ok(windows)
}

fn build_window(vocab: &Vocabulary, content: &[u32], max_len: usize) -> Window {
    let mut ids = Vec::with_capacity(max_len);
    let mut mask = Vec::with_capacity(max_len);

    ids.push(vocab.cls_id());
    ids.extend_from_slice(content);
    ids.push(vocab.sep_id());
    mask.resize(ids.len(), 1);

    ids.resize(max_len, vocab.pad_id());
    mask.resize(max_len, 0);

    Window { ids, mask }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::vocab::{CLS_TOKEN, PAD_TOKEN, SEP_TOKEN, UNK_TOKEN};
    use std::collections::BTreeSet;

    fn test_vocab() -> Vocabulary {
        let tokens = [PAD_TOKEN, UNK_TOKEN, CLS_TOKEN, SEP_TOKEN];
        Vocabulary::from_tokens(tokens.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    /// Synthetic content IDs outside the special range, so a window's content
    /// maps straight back to sequence positions.
    fn synthetic_ids(len: usize) -> Vec<u32> {
        (0..len as u32).map(|i| 1000 + i).collect()
    }

    fn covered_positions(windows: &[Window]) -> BTreeSet<u32> {
        windows
            .iter()
            .flat_map(|w| w.content_ids().iter().map(|id| id - 1000))
            .collect()
    }

    #[test]
    fn test_short_input_single_padded_window() {
        let vocab = test_vocab();
        let tokens = synthetic_ids(5);
        let windows = split_windows(&vocab, &tokens, 12, 3).unwrap();

        assert_eq!(windows.len(), 1);
        let w = &windows[0];
        assert_eq!(w.ids.len(), 12);
        assert_eq!(w.mask.len(), 12);
        assert_eq!(w.ids[0], vocab.cls_id());
        assert_eq!(w.ids[6], vocab.sep_id());
        assert_eq!(&w.ids[1..6], tokens.as_slice());
        assert!(w.ids[7..].iter().all(|&id| id == vocab.pad_id()));
        assert_eq!(w.mask, vec![1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0]);
        assert_eq!(w.content_ids(), tokens.as_slice());
    }

    #[test]
    fn test_exact_capacity_single_window_no_padding() {
        let vocab = test_vocab();
        let tokens = synthetic_ids(254);
        let windows = split_windows(&vocab, &tokens, 256, 128).unwrap();

        assert_eq!(windows.len(), 1);
        assert!(windows[0].mask.iter().all(|&m| m == 1));
        assert_eq!(windows[0].content_len(), 254);
    }

    #[test]
    fn test_capacity_plus_one_splits() {
        let vocab = test_vocab();
        let tokens = synthetic_ids(255);
        let windows = split_windows(&vocab, &tokens, 256, 128).unwrap();
        assert_eq!(windows.len(), 2);
    }

    #[test]
    fn test_consecutive_windows_share_exact_overlap() {
        let vocab = test_vocab();
        // capacity 6, overlap 2, stride 4; 10 tokens -> [0..6) and [4..10).
        let tokens = synthetic_ids(10);
        let windows = split_windows(&vocab, &tokens, 8, 2).unwrap();

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].content_ids(), &tokens[0..6]);
        assert_eq!(windows[1].content_ids(), &tokens[4..10]);
    }

    #[test]
    fn test_final_window_anchored_backward() {
        let vocab = test_vocab();
        // capacity 6, stride 4; 11 tokens -> [0..6), [4..10), then the
        // 1-token remainder forces a final full window [5..11) overlapping
        // its predecessor by 5 (> configured 2).
        let tokens = synthetic_ids(11);
        let windows = split_windows(&vocab, &tokens, 8, 2).unwrap();

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[2].content_ids(), &tokens[5..11]);
        // Every window in the multi-window case is full width.
        for w in &windows {
            assert_eq!(w.content_len(), 6);
            assert!(w.mask.iter().all(|&m| m == 1));
        }
    }

    #[test]
    fn test_coverage_law_default_geometry() {
        let vocab = test_vocab();
        for len in [255, 300, 509, 510, 511, 1000, 2048] {
            let tokens = synthetic_ids(len);
            let windows =
                split_windows(&vocab, &tokens, DEFAULT_MAX_LEN, DEFAULT_OVERLAP).unwrap();

            let covered = covered_positions(&windows);
            let expected: BTreeSet<u32> = (0..len as u32).collect();
            assert_eq!(covered, expected, "gap in coverage for len {}", len);

            for w in &windows {
                assert_eq!(w.ids.len(), DEFAULT_MAX_LEN);
                assert_eq!(w.mask.len(), DEFAULT_MAX_LEN);
            }
        }
    }

    #[test]
    fn test_windows_preserve_order() {
        let vocab = test_vocab();
        let tokens = synthetic_ids(600);
        let windows = split_windows(&vocab, &tokens, 256, 128).unwrap();

        let mut last_first = None;
        for w in &windows {
            let first = w.content_ids()[0];
            if let Some(prev) = last_first {
                assert!(first > prev);
            }
            last_first = Some(first);
        }
    }

    #[test]
    fn test_overlap_equal_to_capacity_rejected() {
        let vocab = test_vocab();
        let tokens = synthetic_ids(10);
        let err = split_windows(&vocab, &tokens, 256, 254).unwrap_err();
        assert_eq!(err.kind(), "invalid_configuration");

        let err = split_windows(&vocab, &tokens, 256, 256).unwrap_err();
        assert_eq!(err.kind(), "invalid_configuration");
    }

    #[test]
    fn test_degenerate_max_len_rejected() {
        let vocab = test_vocab();
        let tokens = synthetic_ids(10);
        let err = split_windows(&vocab, &tokens, 2, 0).unwrap_err();
        assert_eq!(err.kind(), "invalid_configuration");
    }

    #[test]
    fn test_empty_tokens_rejected() {
        let vocab = test_vocab();
        let err = split_windows(&vocab, &[], 256, 128).unwrap_err();
        assert_eq!(err.kind(), "empty_input");
    }

    #[test]
    fn test_zero_overlap_allowed() {
        let vocab = test_vocab();
        let tokens = synthetic_ids(12);
        // capacity 6, overlap 0, stride 6: two disjoint windows.
        let windows = split_windows(&vocab, &tokens, 8, 0).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].content_ids(), &tokens[0..6]);
        assert_eq!(windows[1].content_ids(), &tokens[6..12]);
    }
}
