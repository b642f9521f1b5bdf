//! Text-to-speech synthesis

mod openai;

#[cfg(test)]
pub mod testing;

pub use openai::{OpenAISpeechService, DEFAULT_TTS_MODEL};

use crate::voice::{StepResolution, Voice};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;

/// MP3 chunks as they arrive from the synthesis provider
pub type AudioStream = BoxStream<'static, Result<Bytes, TtsError>>;

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("speech request failed: {0}")]
    Request(String),
    #[error("speech provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("audio stream interrupted: {0}")]
    Stream(String),
}

/// One synthesis call
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub input: String,
    pub instructions: String,
    pub voice: Voice,
}

impl From<&StepResolution> for SpeechRequest {
    fn from(resolution: &StepResolution) -> Self {
        Self {
            input: resolution.input.clone(),
            instructions: resolution.instructions.clone(),
            voice: resolution.voice,
        }
    }
}

/// Streaming speech synthesis backend
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Start synthesis. Errors before the first byte are returned here;
    /// later failures surface as stream items.
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioStream, TtsError>;

    fn model_id(&self) -> &str;
}
