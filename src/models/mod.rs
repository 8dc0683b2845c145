// Veritext Data Models
// Wire contracts for the analysis and tokenization-inspection boundaries.
// Field names are the snake_case JSON keys consumed by transport layers.

use crate::services::detection::confidence::ConfidenceBucket;
use serde::{Deserialize, Serialize};

/// Binary decision boundary on the aggregate AI-probability.
pub const DECISION_THRESHOLD: f64 = 0.5;

// ============ Analysis Request ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectRequest {
    pub text: String,
}

// ============ Analysis Response ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "AI-generated")]
    AiGenerated,
    #[serde(rename = "human-written")]
    HumanWritten,
}

impl Verdict {
    /// p >= 0.5 labels the document AI-generated.
    pub fn from_probability(p: f64) -> Self {
        if p >= DECISION_THRESHOLD {
            Self::AiGenerated
        } else {
            Self::HumanWritten
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AiGenerated => "AI-generated",
            Self::HumanWritten => "human-written",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStats {
    pub word_count: usize,
    pub character_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub result: Verdict,
    /// Unrounded aggregate probability in [0, 1].
    pub ai_probability: f64,
    /// Display percentage, rounded to two decimals.
    pub ai_percentage: f64,
    pub confidence: ConfidenceBucket,
    pub stats: TextStats,
}

// ============ Tokenization Inspection ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizeRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenStats {
    pub token_count: usize,
    pub word_count: usize,
}

/// Intermediate tokenizer/windowing state exposed for diagnostic and
/// visualization consumers. `full_*` fields carry the [CLS]/[SEP]-bracketed
/// form; the mask is all ones because the inspection view is unpadded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizeResponse {
    pub tokens: Vec<String>,
    pub token_ids: Vec<u32>,
    pub full_tokens: Vec<String>,
    pub full_token_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub stats: TokenStats,
}
