// Inference Dispatcher
// Fans per-window inference out to the external classifier with bounded
// concurrency and realigns results to input order. Pure pass-through: no
// aggregation, no numeric transformation beyond the caller-side softmax.
//
// A request either yields one probability per window or fails whole; a mean
// over a subset of windows would silently misrepresent confidence, so the
// first window failure aborts the remaining in-flight inferences.

use crate::error::DetectError;
use crate::services::detection::classifier::Classifier;
use crate::services::detection::windowing::Window;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

const MAX_CONCURRENT_INFERENCES: usize = 4;
const INFERENCE_TIMEOUT_SECS: u64 = 60;

/// Classify every window, returning AI-probabilities 1:1 with the input
/// order. Windows are dispatched concurrently; completion order is irrelevant
/// because results are slotted back by index.
pub async fn classify_windows<C>(
    classifier: Arc<C>,
    windows: &[Window],
) -> Result<Vec<f64>, DetectError>
where
    C: Classifier + 'static,
{
    if windows.is_empty() {
        return Err(DetectError::EmptyInput(
            "no windows to classify".to_string(),
        ));
    }

    let started = Instant::now();
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_INFERENCES));
    let mut join_set: JoinSet<(usize, Result<f64, DetectError>)> = JoinSet::new();

    for (index, window) in windows.iter().enumerate() {
        let classifier = classifier.clone();
        let semaphore = semaphore.clone();
        let window = window.clone();

        join_set.spawn(async move {
            let result = infer_window(classifier.as_ref(), &semaphore, &window, index).await;
            (index, result)
        });
    }

    let mut probabilities: Vec<Option<f64>> = vec![None; windows.len()];
    while let Some(joined) = join_set.join_next().await {
        let (index, result) = joined.map_err(|e| {
            DetectError::ModelUnavailable(format!("inference task failed: {}", e))
        })?;

        match result {
            Ok(p) => probabilities[index] = Some(p),
            Err(e) => {
                warn!(window = index, error = %e, "inference.window_failed");
                // Dropping the JoinSet aborts the remaining in-flight calls;
                // partial results are never surfaced.
                return Err(e);
            }
        }
    }

    info!(
        windows = windows.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "inference.complete"
    );

    let collected: Option<Vec<f64>> = probabilities.into_iter().collect();
    collected.ok_or_else(|| {
        DetectError::ModelUnavailable("a window finished without reporting a result".to_string())
    })
}

async fn infer_window<C: Classifier>(
    classifier: &C,
    semaphore: &Semaphore,
    window: &Window,
    index: usize,
) -> Result<f64, DetectError> {
    // Permit bounds concurrent in-flight model calls.
    let _permit = semaphore
        .acquire()
        .await
        .map_err(|_| DetectError::ModelUnavailable("dispatcher semaphore closed".to_string()))?;

    let fut = classifier.infer(&window.ids, &window.mask);
    match tokio::time::timeout(Duration::from_secs(INFERENCE_TIMEOUT_SECS), fut).await {
        Ok(Ok(logits)) => Ok(logits.ai_probability()),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(DetectError::ModelUnavailable(format!(
            "window {} inference timed out after {}s",
            index, INFERENCE_TIMEOUT_SECS
        ))),
    }
}
