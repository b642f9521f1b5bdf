//! Voice agent data model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Synthesis voice id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Ash,
    Ballad,
    Coral,
    Echo,
    Fable,
    Onyx,
    Nova,
    Sage,
    Shimmer,
    Verse,
}

impl Voice {
    pub fn as_str(self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Ash => "ash",
            Voice::Ballad => "ballad",
            Voice::Coral => "coral",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Sage => "sage",
            Voice::Shimmer => "shimmer",
            Voice::Verse => "verse",
        }
    }

    /// Agents whose directory name mentions a coach get the upbeat voice
    pub fn for_agent(name: &str) -> Self {
        if is_coach(name) {
            Voice::Coral
        } else {
            Voice::Onyx
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dialogue label that marks an agent's spoken lines in a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Speaker {
    #[serde(rename = "Coach Blaze")]
    CoachBlaze,
    #[serde(rename = "Dr. Red Tape")]
    DrRedTape,
}

impl Speaker {
    pub const ALL: [Speaker; 2] = [Speaker::CoachBlaze, Speaker::DrRedTape];

    pub fn label(self) -> &'static str {
        match self {
            Speaker::CoachBlaze => "Coach Blaze",
            Speaker::DrRedTape => "Dr. Red Tape",
        }
    }

    pub fn for_agent(name: &str) -> Self {
        if is_coach(name) {
            Speaker::CoachBlaze
        } else {
            Speaker::DrRedTape
        }
    }
}

fn is_coach(name: &str) -> bool {
    name.to_lowercase().contains("coach")
}

/// One node of an agent's talking points, as written by the content pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    /// `<ordinal>_<slug>`, e.g. `2_policy`
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub transitions: Vec<String>,
}

impl ConversationState {
    /// Text before the first underscore of the id
    pub fn ordinal(&self) -> &str {
        self.id.split_once('_').map_or(self.id.as_str(), |(ordinal, _)| ordinal)
    }
}

/// Everything needed to voice one agent. Built at startup, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceAgentConfig {
    pub name: String,
    pub default_input: String,
    pub instructions: String,
    pub voice: Voice,
    pub speaker: Speaker,
    pub states: Option<Vec<ConversationState>>,
    pub script_content: Option<String>,
}

impl VoiceAgentConfig {
    pub fn has_script(&self) -> bool {
        self.script_content.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn has_states(&self) -> bool {
        self.states.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Ordinal prefixes of the state ids in file order, when states exist
    pub fn available_steps(&self) -> Option<Vec<String>> {
        let states = self.states.as_ref().filter(|s| !s.is_empty())?;
        Some(states.iter().map(|s| s.ordinal().to_string()).collect())
    }
}

/// Where resolved text came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionSource {
    /// No step was requested
    Default,
    /// Dialogue lines under `Section <section>:`
    ScriptSection { section: i64 },
    /// Description and examples of a conversation state
    ConversationState { id: String },
    /// A step was requested but nothing matched it
    Fallback,
}

/// Text and voice settings for one synthesis request
#[derive(Debug, Clone, PartialEq)]
pub struct StepResolution {
    pub input: String,
    pub instructions: String,
    pub voice: Voice,
    pub source: ResolutionSource,
}
