//! Model registry: builds wrapped LLM services for the content and game pipelines

use super::{FallbackService, LlmError, LlmService, LoggingService, OpenAIService, RetryPolicy, RetryingService};
use crate::config::ConfigError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_CONTENT_MODEL: &str = "gpt-4o";
pub const DEFAULT_GAME_MODEL: &str = "o3";

/// Tried in order when the game model is not enabled for the key
pub const FALLBACK_MODELS: &[&str] = &["gpt-4o", "gpt-4-turbo-preview"];

/// Configuration for the LLM provider
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// Gateway or proxy root (e.g., `http://localhost:4000`)
    pub base_url: Option<String>,
    pub content_model: Option<String>,
    pub game_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: std::env::var("OPENAI_BASE_URL").ok(),
            content_model: std::env::var("CONTENT_AGENT_MODEL").ok(),
            game_model: std::env::var("GAME_AGENT_MODEL").ok(),
        }
    }

    /// The API key, rejecting unset and blank values
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingEnv("OPENAI_API_KEY")),
        }
    }

    pub fn content_model(&self) -> &str {
        self.content_model.as_deref().unwrap_or(DEFAULT_CONTENT_MODEL)
    }

    pub fn game_model(&self) -> &str {
        self.game_model.as_deref().unwrap_or(DEFAULT_GAME_MODEL)
    }
}

/// Factory for provider services, each wrapped with logging and retries
pub struct ModelRegistry {
    api_key: String,
    config: LlmConfig,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl ModelRegistry {
    /// Fails when no API key is configured
    pub fn new(config: LlmConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self {
            api_key,
            config,
            retry: RetryPolicy::default(),
            cancel: CancellationToken::new(),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Token shared by every service this registry builds
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Service for one model: provider -> logging -> retries
    pub fn service(&self, model: &str) -> Result<Arc<dyn LlmService>, LlmError> {
        let provider: Arc<dyn LlmService> = Arc::new(OpenAIService::new(
            self.api_key.clone(),
            model,
            self.config.base_url.as_deref(),
        )?);
        let logged: Arc<dyn LlmService> = Arc::new(LoggingService::new(provider));
        Ok(Arc::new(
            RetryingService::new(logged, self.retry).with_cancellation(self.cancel.clone()),
        ))
    }

    /// Service for the content pipeline
    pub fn content_service(&self) -> Result<Arc<dyn LlmService>, LlmError> {
        self.service(self.config.content_model())
    }

    /// Service for the game pipeline, falling back when the model is unavailable
    pub fn game_service(&self, model: Option<&str>) -> Result<Arc<dyn LlmService>, LlmError> {
        let primary = model.unwrap_or_else(|| self.config.game_model());
        let mut chain = vec![self.service(primary)?];
        for fallback in fallback_chain(primary) {
            chain.push(self.service(fallback)?);
        }
        FallbackService::new(chain)
            .map(|s| Arc::new(s) as Arc<dyn LlmService>)
            .ok_or_else(|| LlmError::model_unavailable("No models configured"))
    }
}

/// Fallback models for `primary`, excluding the primary itself
pub fn fallback_chain(primary: &str) -> Vec<&'static str> {
    FALLBACK_MODELS
        .iter()
        .copied()
        .filter(|m| *m != primary)
        .collect()
}
