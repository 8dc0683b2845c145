// Aggregation Logic
// Combines ordered per-window probabilities into one document-level result.
// The policy is an unweighted arithmetic mean across windows, including the
// possibly-wider final overlap window; no length or position weighting.

use crate::error::DetectError;
use crate::services::text_processor::{character_count, word_count};
use serde::{Deserialize, Serialize};

/// Document-level outcome of one analysis. `final_probability` is kept at
/// full precision; rounding is display-only and happens at the response
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    pub final_probability: f64,
    pub per_window_probabilities: Vec<f64>,
    pub word_count: usize,
    pub character_count: usize,
}

/// Aggregate per-window probabilities with document display stats.
///
/// `word_count` counts maximal non-whitespace runs of the original text (not
/// tokens); `character_count` counts Unicode scalar values. An empty
/// probability list is unreachable given the splitter's invariants but is
/// defended with `EmptyWindowSet`.
pub fn aggregate(
    probabilities: Vec<f64>,
    original_text: &str,
) -> Result<AggregateResult, DetectError> {
    if probabilities.is_empty() {
        return Err(DetectError::EmptyWindowSet);
    }

    let final_probability = probabilities.iter().sum::<f64>() / probabilities.len() as f64;

    Ok(AggregateResult {
        final_probability,
        word_count: word_count(original_text),
        character_count: character_count(original_text),
        per_window_probabilities: probabilities,
    })
}
