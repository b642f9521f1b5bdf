//! Mock speech synthesizer for tests

use super::{AudioStream, SpeechRequest, SpeechSynthesizer, TtsError};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::sync::Mutex;

/// Returns fixed chunks, or fails every call
pub struct MockSynthesizer {
    chunks: Vec<Bytes>,
    fail: bool,
    requests: Mutex<Vec<SpeechRequest>>,
}

impl MockSynthesizer {
    pub fn with_chunks(chunks: &[&'static [u8]]) -> Self {
        Self {
            chunks: chunks.iter().copied().map(Bytes::from_static).collect(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            chunks: Vec::new(),
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioStream, TtsError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(TtsError::Status {
                status: 401,
                message: "invalid api key".to_string(),
            });
        }
        let chunks: Vec<Result<Bytes, TtsError>> = self.chunks.iter().cloned().map(Ok).collect();
        Ok(futures::stream::iter(chunks).boxed())
    }

    fn model_id(&self) -> &'static str {
        "mock-tts"
    }
}
