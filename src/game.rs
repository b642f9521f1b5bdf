//! Game generation: onboarding documents to Phaser.js scenes

mod extract;
mod kinds;
mod pipeline;
mod prompts;
mod sections;

pub use extract::{ConfigReply, EnhancementReply, MiniGameReply, SceneReply};
pub use kinds::{Difficulty, EnhancementType, MiniGameType, SceneType};
pub use pipeline::{
    enhanced_path, mini_game_name, title_case, EnhancementOutcome, GamePipeline, GameSummary,
    GeneratedScene, MiniGameOutcome, OutputPaths, SceneSummary, GAME_FEATURES,
};
pub use sections::{is_header, split_sections, DocumentSection};

use crate::llm::{LlmConfig, LlmError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("failed to read {path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid name {0:?}: must be a single path component")]
    InvalidName(String),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("failed to serialize game summary: {0}")]
    Summary(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Settings for one game-agent run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Directory the `frontend/...` output tree is created under
    pub output_root: PathBuf,
    pub model: String,
}

impl GameConfig {
    /// Command-line values win over the environment
    pub fn resolve(output_root: Option<PathBuf>, model: Option<String>, llm: &LlmConfig) -> Self {
        Self {
            output_root: output_root.unwrap_or_else(|| PathBuf::from(".")),
            model: model.unwrap_or_else(|| llm.game_model().to_string()),
        }
    }

    pub fn paths(&self) -> OutputPaths {
        OutputPaths::under(&self.output_root)
    }
}
