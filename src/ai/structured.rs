//! Structured-Generation Client
//!
//! The single seam between pipeline stages and the text-generation service.
//! Stages hand in a prompt and a temperature and get back either prose or a
//! typed record. Failures come back as one of two kinds:
//!
//! - `ServiceUnavailable`: the call itself failed (network, quota, timeout)
//! - `MalformedOutput`: the text did not coerce into the expected record
//!
//! There is no retry here. Each stage owns its own retry/fallback policy.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::ai::metrics::{SharedMetrics, create_shared_metrics};
use crate::ai::provider::{GenerationRequest, SharedProvider};
use crate::ai::timeout::with_timeout;
use crate::ai::validation::extract_json_with_repair_status;
use crate::constants::network;
use crate::types::{DeckError, ErrorCategory, LlmError, Result};

/// Typed access to the text-generation capability
#[derive(Clone)]
pub struct StructuredClient {
    provider: SharedProvider,
    timeout: Duration,
    max_tokens: usize,
    metrics: SharedMetrics,
}

impl StructuredClient {
    pub fn new(provider: SharedProvider) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(network::DEFAULT_TIMEOUT_SECS),
            max_tokens: network::DEFAULT_MAX_TOKENS,
            metrics: create_shared_metrics(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &SharedMetrics {
        &self.metrics
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Prose-mode call: returns the raw completion text
    pub async fn generate_text(&self, stage: &str, prompt: &str, temperature: f32) -> Result<String> {
        let request = GenerationRequest::text(prompt, temperature).with_max_tokens(self.max_tokens);
        let text = self.call(stage, &request).await?;

        if text.trim().is_empty() {
            return Err(DeckError::malformed(stage, "empty completion"));
        }
        Ok(text)
    }

    /// Schema-mode call: returns the extracted JSON object
    pub async fn generate_value(&self, stage: &str, prompt: &str, temperature: f32) -> Result<Value> {
        let request = GenerationRequest::json(prompt, temperature).with_max_tokens(self.max_tokens);
        let text = self.call(stage, &request).await?;

        let (value, repaired) = extract_json_with_repair_status(&text, stage)?;
        if repaired {
            debug!("{}: generation output needed JSON repair", stage);
        }
        Ok(value)
    }

    /// Schema-mode call coerced into a typed record
    pub async fn generate_structured<T: DeserializeOwned>(
        &self,
        stage: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<T> {
        let value = self.generate_value(stage, prompt, temperature).await?;
        serde_json::from_value(value).map_err(|e| DeckError::malformed(stage, e.to_string()))
    }

    async fn call(&self, stage: &str, request: &GenerationRequest) -> Result<String> {
        let operation = format!("{} generation", stage);
        let result = with_timeout(self.timeout, self.provider.generate(request), &operation).await;

        match result {
            Ok(response) => {
                self.metrics.record_response(stage, &response);
                Ok(response.content)
            }
            Err(err) => {
                self.metrics.record_failure(stage);
                warn!("{}: generation call failed: {}", stage, err);
                Err(self.as_service_error(err))
            }
        }
    }

    fn as_service_error(&self, err: DeckError) -> DeckError {
        match err {
            DeckError::Llm(e) => DeckError::ServiceUnavailable(e),
            DeckError::Timeout { .. } => DeckError::ServiceUnavailable(
                LlmError::with_provider(ErrorCategory::Network, err.to_string(), self.provider.name()),
            ),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Deserialize)]
    struct Classification {
        problem_type: String,
        complexity_score: u8,
    }

    #[tokio::test]
    async fn test_structured_from_prose_wrapped_json() {
        let provider = ScriptedProvider::always(
            "Sure! {\"problem_type\": \"market_entry\", \"complexity_score\": 7} Hope that helps.",
        );
        let client = StructuredClient::new(Arc::new(provider));

        let parsed: Classification = client
            .generate_structured("analysis", "classify", 0.2)
            .await
            .unwrap();
        assert_eq!(parsed.problem_type, "market_entry");
        assert_eq!(parsed.complexity_score, 7);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_malformed() {
        let provider = ScriptedProvider::always("{\"unexpected\": true}");
        let client = StructuredClient::new(Arc::new(provider));

        let err = client
            .generate_structured::<Classification>("analysis", "classify", 0.2)
            .await
            .unwrap_err();
        assert!(matches!(err, DeckError::MalformedOutput { .. }));
    }

    #[tokio::test]
    async fn test_provider_failure_is_service_unavailable() {
        let provider = ScriptedProvider::failing(ErrorCategory::RateLimit);
        let client = StructuredClient::new(Arc::new(provider));

        let err = client.generate_text("queries", "list", 0.6).await.unwrap_err();
        match err {
            DeckError::ServiceUnavailable(e) => assert_eq!(e.category, ErrorCategory::RateLimit),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(client.metrics().snapshot().failed_calls, 1);
    }

    #[tokio::test]
    async fn test_timeout_is_service_unavailable() {
        let provider = ScriptedProvider::always("{}").with_delay(Duration::from_millis(200));
        let client =
            StructuredClient::new(Arc::new(provider)).with_timeout(Duration::from_millis(10));

        let err = client.generate_value("analysis", "classify", 0.2).await.unwrap_err();
        assert!(matches!(err, DeckError::ServiceUnavailable(ref e) if e.category == ErrorCategory::Network));
    }

    #[tokio::test]
    async fn test_no_retry_at_this_layer() {
        let provider = Arc::new(ScriptedProvider::failing(ErrorCategory::Transient));
        let client = StructuredClient::new(provider.clone());

        let _ = client.generate_value("analysis", "classify", 0.2).await;
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_is_malformed() {
        let client = StructuredClient::new(Arc::new(ScriptedProvider::always("   ")));
        let err = client.generate_text("queries", "list", 0.6).await.unwrap_err();
        assert!(matches!(err, DeckError::MalformedOutput { .. }));
    }
}
