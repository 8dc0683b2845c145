// Detection error taxonomy
// Every failure carries a stable machine-readable kind plus a human-readable
// message. The core never retries; retry policy belongs to the transport layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    /// No text or windows to process.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Bad window/overlap parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Categorizer input outside [0, 100] (or NaN).
    #[error("invalid probability: {0}")]
    InvalidProbability(String),

    /// External classifier unreachable, errored, or timed out.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Aggregation over zero windows. Unreachable given the splitter's
    /// invariants, defended anyway.
    #[error("empty window set: aggregation requires at least one window probability")]
    EmptyWindowSet,
}

impl DetectError {
    /// Stable identifier for callers that match on error kinds rather than
    /// display text.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput(_) => "empty_input",
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::InvalidProbability(_) => "invalid_probability",
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::EmptyWindowSet => "empty_window_set",
        }
    }
}
