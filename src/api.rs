//! HTTP API for the audio server

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::tts::SpeechSynthesizer;
use crate::voice::VoiceRegistry;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<VoiceRegistry>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl AppState {
    pub fn new(registry: VoiceRegistry, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            registry: Arc::new(registry),
            synthesizer,
        }
    }
}
