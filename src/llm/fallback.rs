//! Model fallback chain
//!
//! Tries the primary model and moves down the chain only when the provider
//! reports the model itself as unavailable. Other errors surface unchanged.

use super::{LlmError, LlmErrorKind, LlmRequest, LlmResponse, LlmService};
use async_trait::async_trait;
use std::sync::Arc;

pub struct FallbackService {
    chain: Vec<Arc<dyn LlmService>>,
    model_id: String,
}

impl FallbackService {
    /// `chain[0]` is the primary model; the chain must not be empty.
    pub fn new(chain: Vec<Arc<dyn LlmService>>) -> Option<Self> {
        let model_id = chain.first()?.model_id().to_string();
        Some(Self { chain, model_id })
    }
}

#[async_trait]
impl LlmService for FallbackService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut last_err = None;
        for service in &self.chain {
            match service.complete(request).await {
                Ok(mut response) => {
                    // Report the chain entry, not the provider's dated snapshot name
                    response.model = Some(service.model_id().to_string());
                    return Ok(response);
                }
                Err(e) if e.kind == LlmErrorKind::ModelUnavailable => {
                    tracing::warn!(
                        model = %service.model_id(),
                        error = %e.message,
                        "Model not available, trying fallback"
                    );
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| LlmError::model_unavailable("No models in fallback chain")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
