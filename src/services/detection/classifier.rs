// Classifier Boundary
// The trained sequence classifier is an external collaborator consumed as an
// injected capability: one window in, two logits out. Softmax normalization
// happens on this side of the boundary. Keeping the capability behind a trait
// leaves the splitter and aggregator pure and unit-testable without a live
// model.

use crate::error::DetectError;
use serde::{Deserialize, Serialize};
use std::env;
use std::future::Future;
use std::time::Duration;

const DEFAULT_INFER_URL: &str = "http://127.0.0.1:5000/api/infer";
const REQUEST_TIMEOUT_SECS: u64 = 80;

/// Raw two-class output of the external model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Logits {
    pub logit_human: f64,
    pub logit_ai: f64,
}

impl Logits {
    /// Caller-side softmax: p = exp(ai) / (exp(human) + exp(ai)), computed
    /// against the max logit so large magnitudes cannot overflow.
    pub fn ai_probability(&self) -> f64 {
        let m = self.logit_human.max(self.logit_ai);
        let eh = (self.logit_human - m).exp();
        let ea = (self.logit_ai - m).exp();
        ea / (eh + ea)
    }
}

/// External classifier capability. Implementations are treated as
/// deterministic pure functions with bounded latency; unavailability must be
/// reported, never defaulted.
pub trait Classifier: Send + Sync {
    fn infer(
        &self,
        token_ids: &[u32],
        attention_mask: &[u32],
    ) -> impl Future<Output = Result<Logits, DetectError>> + Send;
}

#[derive(Serialize)]
struct InferRequest<'a> {
    token_ids: &'a [u32],
    attention_mask: &'a [u32],
}

#[derive(Deserialize)]
struct InferResponse {
    logit_human: f64,
    logit_ai: f64,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

/// HTTP adapter for a remote inference endpoint. The endpoint defaults to the
/// local model server and honors the VERITEXT_INFER_URL override.
pub struct RemoteClassifier {
    client: reqwest::Client,
    infer_url: String,
}

impl Default for RemoteClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteClassifier {
    pub fn new() -> Self {
        let url = env::var("VERITEXT_INFER_URL").unwrap_or_else(|_| DEFAULT_INFER_URL.to_string());
        Self::with_endpoint(&url)
    }

    pub fn with_endpoint(url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            infer_url: url.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.infer_url
    }

    /// Sibling health route of the inference endpoint
    /// (".../api/infer" -> ".../api/health").
    fn health_url(&self) -> String {
        match self.infer_url.rsplit_once('/') {
            Some((base, _)) => format!("{}/health", base),
            None => self.infer_url.clone(),
        }
    }

    /// Probe the model server before dispatching a whole window set, so the
    /// caller can fail fast with `ModelUnavailable`.
    pub async fn health(&self) -> Result<(), DetectError> {
        let url = self.health_url();
        let response = self.client.get(&url).send().await.map_err(|e| {
            DetectError::ModelUnavailable(format!("health check failed for {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(DetectError::ModelUnavailable(format!(
                "health check returned HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body: HealthResponse = response.json().await.map_err(|e| {
            DetectError::ModelUnavailable(format!("health response malformed: {}", e))
        })?;
        if body.status != "ok" {
            return Err(DetectError::ModelUnavailable(format!(
                "model server reports status {:?}",
                body.status
            )));
        }
        Ok(())
    }
}

impl Classifier for RemoteClassifier {
    fn infer(
        &self,
        token_ids: &[u32],
        attention_mask: &[u32],
    ) -> impl Future<Output = Result<Logits, DetectError>> + Send {
        let request = self
            .client
            .post(&self.infer_url)
            .json(&InferRequest {
                token_ids,
                attention_mask,
            })
            .send();
        let url = self.infer_url.clone();

        async move {
            let response = request.await.map_err(|e| {
                DetectError::ModelUnavailable(format!("classifier request to {} failed: {}", url, e))
            })?;

            if !response.status().is_success() {
                return Err(DetectError::ModelUnavailable(format!(
                    "classifier returned HTTP {} from {}",
                    response.status(),
                    url
                )));
            }

            let body: InferResponse = response.json().await.map_err(|e| {
                DetectError::ModelUnavailable(format!("classifier response malformed: {}", e))
            })?;

            Ok(Logits {
                logit_human: body.logit_human,
                logit_ai: body.logit_ai,
            })
        }
    }
}
