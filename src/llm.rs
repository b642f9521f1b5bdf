//! LLM provider abstraction
//!
//! Provides a common interface for the chat completion endpoint used by the
//! content and game pipelines.

mod error;
mod fallback;
mod openai;
mod registry;
mod retry;
mod types;

#[cfg(test)]
pub mod testing;

pub use error::{LlmError, LlmErrorKind};
pub use fallback::FallbackService;
pub(crate) use openai::endpoint_url;
pub use openai::OpenAIService;
pub use registry::{
    fallback_chain, LlmConfig, ModelRegistry, DEFAULT_CONTENT_MODEL, DEFAULT_GAME_MODEL,
    FALLBACK_MODELS,
};
pub use retry::{RetryPolicy, RetryingService};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockLlmService;
    use super::*;

    #[tokio::test]
    async fn test_logging_service_passes_through() {
        let mock = Arc::new(MockLlmService::new("gpt-4o"));
        mock.queue_text("hello");
        mock.queue_error(LlmError::auth("nope"));

        let service = LoggingService::new(mock);
        assert_eq!(service.model_id(), "gpt-4o");

        let request = LlmRequest::prompt("s", "u");
        assert_eq!(service.complete(&request).await.unwrap().text, "hello");
        assert_eq!(
            service.complete(&request).await.unwrap_err().kind,
            LlmErrorKind::Auth
        );
    }
}
