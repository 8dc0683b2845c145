// Analysis Orchestration
// End-to-end document classification: tokenize -> window -> dispatch ->
// aggregate -> categorize. Each request is an independent unit of work; the
// only shared state is the read-only vocabulary passed in by reference.

use crate::error::DetectError;
use crate::models::{DetectResponse, TextStats, TokenStats, TokenizeResponse, Verdict};
use crate::services::detection::aggregation::{aggregate, AggregateResult};
use crate::services::detection::classifier::Classifier;
use crate::services::detection::confidence::categorize;
use crate::services::detection::dispatcher::classify_windows;
use crate::services::detection::windowing::{split_windows, DEFAULT_MAX_LEN, DEFAULT_OVERLAP};
use crate::services::text_processor::word_count;
use crate::services::tokenizer::tokenize;
use crate::services::vocab::{Vocabulary, CLS_TOKEN, SEP_TOKEN};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Window geometry for one analysis. Validated by the splitter.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub max_len: usize,
    pub overlap: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

/// Run the core pipeline and return the full aggregate, including per-window
/// probabilities.
pub async fn analyze_document<C>(
    vocab: &Vocabulary,
    classifier: Arc<C>,
    text: &str,
    options: &AnalysisOptions,
) -> Result<AggregateResult, DetectError>
where
    C: Classifier + 'static,
{
    let analysis_id = Uuid::new_v4();
    let started = Instant::now();

    let tokens = tokenize(vocab, text);
    if tokens.is_empty() {
        return Err(DetectError::EmptyInput(
            "text produced no tokens".to_string(),
        ));
    }

    let ids: Vec<u32> = tokens.iter().map(|t| t.id).collect();
    let windows = split_windows(vocab, &ids, options.max_len, options.overlap)?;
    info!(
        analysis_id = %analysis_id,
        tokens = ids.len(),
        windows = windows.len(),
        max_len = options.max_len,
        overlap = options.overlap,
        "analysis.windows_built"
    );

    let probabilities = classify_windows(classifier, &windows).await?;
    let result = aggregate(probabilities, text)?;

    info!(
        analysis_id = %analysis_id,
        final_probability = result.final_probability,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "analysis.complete"
    );
    Ok(result)
}

/// Package an aggregate into the boundary response: verdict at the 0.5
/// decision boundary, display rounding, confidence bucket.
pub fn summarize(result: &AggregateResult) -> Result<DetectResponse, DetectError> {
    let p = result.final_probability;
    // Categorization uses the unrounded percentage; rounding is display-only.
    let confidence = categorize(p * 100.0)?;

    Ok(DetectResponse {
        result: Verdict::from_probability(p),
        ai_probability: p,
        ai_percentage: round2(p * 100.0),
        confidence,
        stats: TextStats {
            word_count: result.word_count,
            character_count: result.character_count,
        },
    })
}

/// Classify a document and return the boundary response.
pub async fn analyze_text<C>(
    vocab: &Vocabulary,
    classifier: Arc<C>,
    text: &str,
    options: &AnalysisOptions,
) -> Result<DetectResponse, DetectError>
where
    C: Classifier + 'static,
{
    let result = analyze_document(vocab, classifier, text, options).await?;
    summarize(&result)
}

/// Expose the tokenizer's intermediate state for diagnostic consumers. The
/// full_* view brackets the sequence with [CLS]/[SEP], unpadded, mask all
/// ones.
pub fn tokenize_text(vocab: &Vocabulary, text: &str) -> Result<TokenizeResponse, DetectError> {
    let tokens = tokenize(vocab, text);
    if tokens.is_empty() {
        return Err(DetectError::EmptyInput(
            "text produced no tokens".to_string(),
        ));
    }

    let token_count = tokens.len();
    let mut full_tokens = Vec::with_capacity(token_count + 2);
    let mut full_token_ids = Vec::with_capacity(token_count + 2);
    full_tokens.push(CLS_TOKEN.to_string());
    full_token_ids.push(vocab.cls_id());

    let mut token_strings = Vec::with_capacity(token_count);
    let mut token_ids = Vec::with_capacity(token_count);
    for token in tokens {
        token_strings.push(token.text.clone());
        token_ids.push(token.id);
        full_tokens.push(token.text);
        full_token_ids.push(token.id);
    }

    full_tokens.push(SEP_TOKEN.to_string());
    full_token_ids.push(vocab.sep_id());
    let attention_mask = vec![1u32; full_token_ids.len()];

    Ok(TokenizeResponse {
        tokens: token_strings,
        token_ids,
        full_tokens,
        full_token_ids,
        attention_mask,
        stats: TokenStats {
            token_count,
            word_count: word_count(text),
        },
    })
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::detection::classifier::Logits;
    use crate::services::detection::confidence::ConfidenceBucket;
    use crate::services::vocab::{PAD_TOKEN, UNK_TOKEN};
    use std::future::Future;

    fn test_vocab() -> Vocabulary {
        let tokens = [
            PAD_TOKEN, UNK_TOKEN, CLS_TOKEN, SEP_TOKEN, "ai", "detection", "is", "important",
        ];
        Vocabulary::from_tokens(tokens.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    /// Always returns the same AI-probability, expressed as a logit pair.
    struct ConstClassifier {
        p: f64,
    }

    impl Classifier for ConstClassifier {
        fn infer(
            &self,
            _token_ids: &[u32],
            _attention_mask: &[u32],
        ) -> impl Future<Output = Result<Logits, DetectError>> + Send {
            let logit_ai = (self.p / (1.0 - self.p)).ln();
            async move {
                Ok(Logits {
                    logit_human: 0.0,
                    logit_ai,
                })
            }
        }
    }

    #[tokio::test]
    async fn test_analyze_text_single_window() {
        let vocab = test_vocab();
        let classifier = Arc::new(ConstClassifier { p: 0.8 });
        let response = analyze_text(
            &vocab,
            classifier,
            "AI detection is important",
            &AnalysisOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(response.result, Verdict::AiGenerated);
        assert!((response.ai_probability - 0.8).abs() < 1e-9);
        assert!((response.ai_percentage - 80.0).abs() < 0.01);
        assert_eq!(response.confidence, ConfidenceBucket::DefinitelyAi);
        assert_eq!(response.stats.word_count, 4);
        assert_eq!(response.stats.character_count, 25);
    }

    #[tokio::test]
    async fn test_analyze_document_multiple_windows() {
        let vocab = test_vocab();
        let classifier = Arc::new(ConstClassifier { p: 0.3 });
        // 12 tokens against capacity 6: multiple windows, constant
        // per-window probability, so the mean equals it.
        let text = "ai detection is important ai detection is important ai detection is important";
        let options = AnalysisOptions {
            max_len: 8,
            overlap: 2,
        };

        let result = analyze_document(&vocab, classifier, text, &options)
            .await
            .unwrap();
        assert!(result.per_window_probabilities.len() > 1);
        assert!((result.final_probability - 0.3).abs() < 1e-9);
        assert_eq!(result.word_count, 12);
    }

    #[tokio::test]
    async fn test_decision_boundary_is_ai() {
        let vocab = test_vocab();
        let classifier = Arc::new(ConstClassifier { p: 0.5 });
        let response = analyze_text(
            &vocab,
            classifier,
            "ai detection is important",
            &AnalysisOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(response.result, Verdict::AiGenerated);
        assert_eq!(response.confidence, ConfidenceBucket::Uncertain);
    }

    #[tokio::test]
    async fn test_display_rounding() {
        let vocab = test_vocab();
        let classifier = Arc::new(ConstClassifier { p: 1.0 / 3.0 });
        let response = analyze_text(
            &vocab,
            classifier,
            "ai detection is important",
            &AnalysisOptions::default(),
        )
        .await
        .unwrap();

        assert!((response.ai_percentage - 33.33).abs() < 1e-9);
        // The probability itself stays unrounded.
        assert!((response.ai_probability - 1.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let vocab = test_vocab();
        let classifier = Arc::new(ConstClassifier { p: 0.5 });
        let err = analyze_text(&vocab, classifier, "   ", &AnalysisOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "empty_input");
    }

    #[tokio::test]
    async fn test_invalid_geometry_propagates() {
        let vocab = test_vocab();
        let classifier = Arc::new(ConstClassifier { p: 0.5 });
        let options = AnalysisOptions {
            max_len: 256,
            overlap: 256,
        };
        let err = analyze_text(&vocab, classifier, "ai detection", &options)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_configuration");
    }

    #[test]
    fn test_tokenize_text_full_view() {
        let vocab = test_vocab();
        let response = tokenize_text(&vocab, "AI detection is important").unwrap();

        assert_eq!(
            response.full_tokens,
            vec!["[CLS]", "ai", "detection", "is", "important", "[SEP]"]
        );
        assert_eq!(response.full_token_ids.len(), 6);
        assert_eq!(response.full_token_ids[0], vocab.cls_id());
        assert_eq!(*response.full_token_ids.last().unwrap(), vocab.sep_id());
        assert_eq!(response.tokens, vec!["ai", "detection", "is", "important"]);
        assert_eq!(response.token_ids, vec![4, 5, 6, 7]);
        assert_eq!(response.attention_mask, vec![1; 6]);
        assert_eq!(response.stats.token_count, 4);
        assert_eq!(response.stats.word_count, 4);
    }

    #[test]
    fn test_tokenize_text_empty_rejected() {
        let vocab = test_vocab();
        let err = tokenize_text(&vocab, "").unwrap_err();
        assert_eq!(err.kind(), "empty_input");
    }

    #[test]
    fn test_summarize_verdict_and_bucket_consistency() {
        let result = AggregateResult {
            final_probability: 0.199999,
            per_window_probabilities: vec![0.199999],
            word_count: 1,
            character_count: 4,
        };
        let response = summarize(&result).unwrap();
        // 19.9999% categorizes on the unrounded value even though the display
        // percentage rounds up to 20.0.
        assert_eq!(response.confidence, ConfidenceBucket::DefinitelyHuman);
        assert!((response.ai_percentage - 20.0).abs() < 1e-9);
        assert_eq!(response.result, Verdict::HumanWritten);
    }
}
