// Detection Module
// Document-classification pipeline organized into specialized submodules:
// - windowing: overlapping fixed-size window segmentation
// - classifier: external model boundary (trait + HTTP adapter + softmax)
// - dispatcher: concurrent per-window inference, order-preserving
// - aggregation: flat mean of window probabilities + document stats
// - confidence: five-bucket verdict categorization
// - analysis: end-to-end orchestration and inspection views

pub mod aggregation;
pub mod analysis;
pub mod classifier;
pub mod confidence;
pub mod dispatcher;
pub mod windowing;

// Re-export commonly used items
pub use aggregation::{aggregate, AggregateResult};
pub use analysis::{analyze_document, analyze_text, summarize, tokenize_text, AnalysisOptions};
pub use classifier::{Classifier, Logits, RemoteClassifier};
pub use confidence::{categorize, ConfidenceBucket};
pub use dispatcher::classify_windows;
pub use windowing::{split_windows, Window, DEFAULT_MAX_LEN, DEFAULT_OVERLAP};
