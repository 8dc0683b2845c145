// Confidence Categorizer
// Maps the aggregate AI-percentage onto five mutually exclusive, collectively
// exhaustive buckets for presentation. Boundaries are inclusive on the lower
// end; a value sitting exactly on a shared boundary belongs to the higher
// bucket. Only the final bucket includes its upper bound.

use crate::error::DetectError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ConfidenceBucket {
    #[serde(rename = "Definitely Human")]
    DefinitelyHuman,
    #[serde(rename = "Likely Human")]
    LikelyHuman,
    #[serde(rename = "Uncertain")]
    Uncertain,
    #[serde(rename = "Likely AI")]
    LikelyAi,
    #[serde(rename = "Definitely AI")]
    DefinitelyAi,
}

impl ConfidenceBucket {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DefinitelyHuman => "Definitely Human",
            Self::LikelyHuman => "Likely Human",
            Self::Uncertain => "Uncertain",
            Self::LikelyAi => "Likely AI",
            Self::DefinitelyAi => "Definitely AI",
        }
    }
}

impl fmt::Display for ConfidenceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Categorize an AI-percentage in `[0, 100]`.
///
/// | Bucket           | Range (%)  |
/// |------------------|------------|
/// | Definitely Human | [0, 20)    |
/// | Likely Human     | [20, 40)   |
/// | Uncertain        | [40, 60)   |
/// | Likely AI        | [60, 80)   |
/// | Definitely AI    | [80, 100]  |
///
/// NaN and out-of-range input fail with `InvalidProbability`.
pub fn categorize(ai_percentage: f64) -> Result<ConfidenceBucket, DetectError> {
    if ai_percentage.is_nan() || !(0.0..=100.0).contains(&ai_percentage) {
        return Err(DetectError::InvalidProbability(format!(
            "ai percentage {} is outside [0, 100]",
            ai_percentage
        )));
    }

    let bucket = if ai_percentage < 20.0 {
        ConfidenceBucket::DefinitelyHuman
    } else if ai_percentage < 40.0 {
        ConfidenceBucket::LikelyHuman
    } else if ai_percentage < 60.0 {
        ConfidenceBucket::Uncertain
    } else if ai_percentage < 80.0 {
        ConfidenceBucket::LikelyAi
    } else {
        ConfidenceBucket::DefinitelyAi
    };

    Ok(bucket)
}
