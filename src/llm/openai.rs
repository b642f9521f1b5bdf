//! `OpenAI` and `OpenAI`-compatible chat completions provider

use super::types::{LlmRequest, LlmResponse, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default public endpoint root
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Chat completions service for a single named model
pub struct OpenAIService {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAIService {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: Option<&str>,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            url: chat_url(base_url),
        })
    }

    fn translate_request(&self, request: &LlmRequest) -> OpenAIRequest {
        let mut messages = Vec::new();

        if !request.system.is_empty() {
            let system_text = request
                .system
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");

            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: Some(system_text),
            });
        }

        for msg in &request.messages {
            messages.push(OpenAIMessage {
                role: msg.role.as_str().to_string(),
                content: Some(msg.text.clone()),
            });
        }

        // Reasoning models take max_completion_tokens and reject temperature
        let reasoning = uses_max_completion_tokens(&self.model);
        let (max_tokens, max_completion_tokens) = if reasoning {
            (None, request.max_tokens)
        } else {
            (request.max_tokens, None)
        };

        OpenAIRequest {
            model: self.model.clone(),
            messages,
            max_tokens,
            max_completion_tokens,
            temperature: if reasoning { None } else { request.temperature },
            stream: false,
        }
    }

    pub(crate) fn normalize_response(resp: OpenAIResponse) -> Result<LlmResponse, LlmError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::unknown("No choices in response"))?;

        let text = choice.message.content.unwrap_or_default();
        if text.is_empty() {
            return Err(LlmError::unknown("Empty completion in response"));
        }

        let end_turn = choice.finish_reason.as_deref() == Some("stop");

        Ok(LlmResponse {
            text,
            model: resp.model,
            end_turn,
            usage: resp
                .usage
                .map(|u| Usage {
                    input_tokens: u64::from(u.prompt_tokens),
                    output_tokens: u64::from(u.completion_tokens),
                })
                .unwrap_or_default(),
        })
    }
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let openai_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<f64>().ok())
            .map(Duration::from_secs_f64);
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let err = classify_error(status.as_u16(), &body);
            return Err(match retry_after {
                Some(delay) => err.with_retry_after(delay),
                None => err,
            });
        }

        let openai_response: OpenAIResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(openai_response)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Build the chat completions URL from an optional gateway/base URL
fn chat_url(base_url: Option<&str>) -> String {
    endpoint_url(base_url, "chat/completions")
}

/// `<base>/v1/<path>`, tolerating a base that already ends in `/v1`
pub(crate) fn endpoint_url(base_url: Option<&str>, path: &str) -> String {
    let base = base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{base}/{path}")
    } else {
        format!("{base}/v1/{path}")
    }
}

/// o-series and GPT-5 models use `max_completion_tokens` instead of `max_tokens`
fn uses_max_completion_tokens(model: &str) -> bool {
    let mut chars = model.chars();
    let o_series = chars.next() == Some('o') && chars.next().is_some_and(|c| c.is_ascii_digit());
    o_series || model.starts_with("gpt-5")
}

/// Map an HTTP error status and body to a classified error
pub(crate) fn classify_error(status: u16, body: &str) -> LlmError {
    let Ok(error_resp) = serde_json::from_str::<OpenAIErrorResponse>(body) else {
        return match status {
            404 => LlmError::model_unavailable(format!("HTTP {status} error: {body}")),
            500..=599 => LlmError::server_error(format!("HTTP {status} error: {body}")),
            _ => LlmError::unknown(format!("HTTP {status} error: {body}")),
        };
    };

    let message = error_resp.error.message;
    // Unverified organizations get a 403 for gated models rather than a 404
    let gated = status == 403 && {
        let lower = message.to_lowercase();
        lower.contains("must be verified") || lower.contains("does not have access to model")
    };
    if error_resp.error.code.as_deref() == Some("model_not_found") || gated {
        return LlmError::model_unavailable(format!("Model unavailable: {message}"));
    }

    match status {
        401 | 403 => LlmError::auth(format!("Authentication failed: {message}")),
        404 => LlmError::model_unavailable(format!("Model unavailable: {message}")),
        429 => LlmError::rate_limit(format!("Rate limit exceeded: {message}")),
        400 => LlmError::invalid_request(format!("Invalid request: {message}")),
        500..=599 => LlmError::server_error(format!("Server error: {message}")),
        _ => LlmError::unknown(format!("HTTP {status}: {message}")),
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
pub(crate) struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmErrorKind;

    fn service(model: &str) -> OpenAIService {
        OpenAIService::new("test-key", model, None).unwrap()
    }

    #[test]
    fn test_chat_url_variants() {
        assert_eq!(chat_url(None), "https://api.openai.com/v1/chat/completions");
        assert_eq!(
            chat_url(Some("http://gateway.local/openai/")),
            "http://gateway.local/openai/v1/chat/completions"
        );
        assert_eq!(
            chat_url(Some("http://gateway.local/v1")),
            "http://gateway.local/v1/chat/completions"
        );
    }

    #[test]
    fn test_reasoning_models_use_max_completion_tokens() {
        assert!(uses_max_completion_tokens("o3"));
        assert!(uses_max_completion_tokens("o4-mini"));
        assert!(uses_max_completion_tokens("gpt-5-mini"));
        assert!(!uses_max_completion_tokens("gpt-4o"));
        assert!(!uses_max_completion_tokens("omni"));
    }

    #[test]
    fn test_translate_request_chat_model() {
        let request = LlmRequest::prompt("be brief", "hello")
            .with_max_tokens(4000)
            .with_temperature(0.7);
        let wire = serde_json::to_value(service("gpt-4o").translate_request(&request)).unwrap();

        assert_eq!(wire["model"], "gpt-4o");
        assert_eq!(wire["messages"][0]["role"], "system");
        assert_eq!(wire["messages"][0]["content"], "be brief");
        assert_eq!(wire["messages"][1]["role"], "user");
        assert_eq!(wire["max_tokens"], 4000);
        assert!(wire.get("max_completion_tokens").is_none());
        assert!(wire["temperature"].is_number());
    }

    #[test]
    fn test_translate_request_reasoning_model() {
        let request = LlmRequest::prompt("sys", "hi")
            .with_max_tokens(4000)
            .with_temperature(0.7);
        let wire = serde_json::to_value(service("o3").translate_request(&request)).unwrap();

        assert!(wire.get("max_tokens").is_none());
        assert_eq!(wire["max_completion_tokens"], 4000);
        assert!(wire.get("temperature").is_none());
    }

    #[test]
    fn test_normalize_response() {
        let resp: OpenAIResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"hi there"},"finish_reason":"stop"}],
                "usage":{"prompt_tokens":12,"completion_tokens":3,"total_tokens":15}}"#,
        )
        .unwrap();
        let normalized = OpenAIService::normalize_response(resp).unwrap();
        assert_eq!(normalized.text, "hi there");
        assert!(normalized.end_turn);
        assert_eq!(normalized.usage.input_tokens, 12);
        assert_eq!(normalized.usage.output_tokens, 3);
    }

    #[test]
    fn test_normalize_rejects_empty() {
        let resp: OpenAIResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(OpenAIService::normalize_response(resp).is_err());

        let resp: OpenAIResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":""},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert!(OpenAIService::normalize_response(resp).is_err());
    }

    #[test]
    fn test_classify_error() {
        let body = r#"{"error":{"message":"The model `o3` does not exist","code":"model_not_found"}}"#;
        assert_eq!(classify_error(400, body).kind, LlmErrorKind::ModelUnavailable);
        assert_eq!(classify_error(404, "nope").kind, LlmErrorKind::ModelUnavailable);
        let gated = r#"{"error":{"message":"Your organization must be verified to use the model `o3`.","type":"invalid_request_error"}}"#;
        assert_eq!(classify_error(403, gated).kind, LlmErrorKind::ModelUnavailable);

        let body = r#"{"error":{"message":"bad key"}}"#;
        assert_eq!(classify_error(401, body).kind, LlmErrorKind::Auth);
        assert_eq!(classify_error(429, body).kind, LlmErrorKind::RateLimit);
        assert_eq!(classify_error(503, body).kind, LlmErrorKind::ServerError);
        assert_eq!(classify_error(400, body).kind, LlmErrorKind::InvalidRequest);
        assert_eq!(classify_error(502, "<html>").kind, LlmErrorKind::ServerError);
    }
}
