//! Startup scan of the voice agent content directory

use super::types::{ConversationState, Speaker, Voice, VoiceAgentConfig};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SCRIPT_FILE: &str = "script.txt";
pub const INSTRUCTOR_FILE: &str = "instructor.txt";
pub const STATES_FILE: &str = "conversation_states.json";

/// Spoken when a script has no recognizable dialogue
pub const FALLBACK_SAMPLE: &str = "Welcome to ACME Corporation!";

const DEFAULT_SAMPLE_LINES: usize = 3;

pub const BUILTIN_COACH: &str = "coach";

const COACH_SAMPLE: &str = "Alright, team, let's bring the energy! Time to move, sweat, and feel amazing!

We're starting with a dynamic warm-up, so roll those shoulders, stretch it out, and get that body ready! Now, into our first round: squats, lunges, and high knees. Keep that core tight, push through, you got this!

Halfway there, stay strong. Breathe, focus, and keep that momentum going! Last ten seconds, give me everything you've got!

And... done! Take a deep breath, shake it out. You crushed it! Stay hydrated, stay moving, and I'll see you next time!";

const COACH_INSTRUCTIONS: &str = "Voice: High-energy, upbeat, and encouraging, projecting enthusiasm and motivation.

Punctuation: Short, punchy sentences with strategic pauses to maintain excitement and clarity.

Delivery: Fast-paced and dynamic, with rising intonation to build momentum and keep engagement high.

Phrasing: Action-oriented and direct, using motivational cues to push participants forward.

Tone: Positive, energetic, and empowering, creating an atmosphere of encouragement and achievement.";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid conversation states in {path}: {source}")]
    States {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Immutable snapshot of every loadable voice agent, keyed by name
#[derive(Debug, Clone, Default)]
pub struct VoiceRegistry {
    agents: BTreeMap<String, VoiceAgentConfig>,
}

impl VoiceRegistry {
    /// Scan `root` for agent directories. Unloadable agents are logged and skipped.
    pub fn load(root: &Path) -> Self {
        let mut registry = Self::default();

        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "Voice agent directory not readable");
                return registry;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                tracing::warn!(path = %path.display(), "Skipping agent directory with non UTF-8 name");
                continue;
            };

            match load_agent(&path, &name) {
                Ok(Some(config)) => {
                    tracing::info!(
                        agent = %name,
                        voice = %config.voice,
                        states = config.states.as_ref().map_or(0, Vec::len),
                        "Loaded voice agent"
                    );
                    registry.insert(config);
                }
                Ok(None) => {
                    tracing::debug!(agent = %name, "Skipping directory without script and instructor files");
                }
                Err(e) => {
                    tracing::warn!(agent = %name, error = %e, "Failed to load voice agent");
                }
            }
        }

        registry
    }

    /// Add the demo coach unless an agent of that name was loaded from disk
    #[must_use]
    pub fn with_builtin_coach(mut self) -> Self {
        self.agents
            .entry(BUILTIN_COACH.to_string())
            .or_insert_with(builtin_coach);
        self
    }

    pub fn insert(&mut self, config: VoiceAgentConfig) {
        self.agents.insert(config.name.clone(), config);
    }

    pub fn get(&self, name: &str) -> Option<&VoiceAgentConfig> {
        self.agents.get(name)
    }

    /// Agents in name order
    pub fn iter(&self) -> impl Iterator<Item = &VoiceAgentConfig> {
        self.agents.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Load one agent directory. `Ok(None)` when a required file is missing.
pub fn load_agent(dir: &Path, name: &str) -> Result<Option<VoiceAgentConfig>, RegistryError> {
    let script_path = dir.join(SCRIPT_FILE);
    let instructor_path = dir.join(INSTRUCTOR_FILE);
    if !script_path.is_file() || !instructor_path.is_file() {
        return Ok(None);
    }

    let states_path = dir.join(STATES_FILE);
    let states = if states_path.is_file() {
        let raw = read(&states_path)?;
        let states: Vec<ConversationState> =
            serde_json::from_str(&raw).map_err(|source| RegistryError::States {
                path: states_path.clone(),
                source,
            })?;
        Some(states)
    } else {
        None
    };

    let script_content = read(&script_path)?;
    let instructions = read(&instructor_path)?;

    Ok(Some(VoiceAgentConfig {
        name: name.to_string(),
        default_input: default_sample(&script_content),
        instructions,
        voice: Voice::for_agent(name),
        speaker: Speaker::for_agent(name),
        states,
        script_content: Some(script_content),
    }))
}

fn read(path: &Path) -> Result<String, RegistryError> {
    std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// First few lines spoken by any known speaker, joined by spaces
pub fn default_sample(script: &str) -> String {
    let lines: Vec<String> = script
        .lines()
        .filter_map(|line| {
            Speaker::ALL
                .iter()
                .find_map(|speaker| dialogue_line(line, *speaker))
        })
        .take(DEFAULT_SAMPLE_LINES)
        .collect();

    if lines.is_empty() {
        FALLBACK_SAMPLE.to_string()
    } else {
        lines.join(" ")
    }
}

/// Dialogue text when `line` is spoken by `speaker`, with surrounding quotes removed
pub(crate) fn dialogue_line(line: &str, speaker: Speaker) -> Option<String> {
    let rest = line
        .trim()
        .strip_prefix(speaker.label())?
        .strip_prefix(':')?
        .trim();
    Some(unquote(rest).to_string())
}

fn unquote(text: &str) -> &str {
    if text == "\"" {
        return "";
    }
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

fn builtin_coach() -> VoiceAgentConfig {
    VoiceAgentConfig {
        name: BUILTIN_COACH.to_string(),
        default_input: COACH_SAMPLE.to_string(),
        instructions: COACH_INSTRUCTIONS.to_string(),
        voice: Voice::Coral,
        speaker: Speaker::CoachBlaze,
        states: None,
        script_content: None,
    }
}
