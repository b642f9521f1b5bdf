//! `OpenAI` speech endpoint client

use super::{AudioStream, SpeechRequest, SpeechSynthesizer, TtsError};
use crate::llm::endpoint_url;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_TTS_MODEL: &str = "gpt-4o-mini-tts";

pub struct OpenAISpeechService {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAISpeechService {
    pub fn new(
        api_key: impl Into<String>,
        model: Option<&str>,
        base_url: Option<&str>,
    ) -> Result<Self, TtsError> {
        // Only the connect phase is bounded; long audio streams for a while
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TtsError::Request(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.unwrap_or(DEFAULT_TTS_MODEL).to_string(),
            url: endpoint_url(base_url, "audio/speech"),
        })
    }

    fn translate_request<'a>(&'a self, request: &'a SpeechRequest) -> SpeechBody<'a> {
        SpeechBody {
            model: &self.model,
            voice: request.voice.as_str(),
            input: &request.input,
            instructions: &request.instructions,
            response_format: "mp3",
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAISpeechService {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioStream, TtsError> {
        tracing::debug!(
            model = %self.model,
            voice = %request.voice,
            chars = request.input.chars().count(),
            "Starting speech synthesis"
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.translate_request(request))
            .send()
            .await
            .map_err(|e| TtsError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TtsError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TtsError::Stream(e.to_string())))
            .boxed())
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    instructions: &'a str,
    response_format: &'a str,
}
