//! Document to voice agent content: instructor, script, conversation states

use super::prompts;
use super::store::AgentContentStore;
use crate::llm::{LlmError, LlmRequest, LlmService};
use crate::voice::{dialogue_line, ConversationState, Speaker};
use regex::Regex;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use thiserror::Error;

const TEMPERATURE: f32 = 0.7;
const INSTRUCTOR_MAX_TOKENS: u32 = 2000;
const SCRIPT_MAX_TOKENS: u32 = 8000;
const STATES_MAX_TOKENS: u32 = 6000;

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Section (\d+):").unwrap());

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read source document {path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid agent name {0:?}")]
    InvalidAgentName(String),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("conversation states reply is not a valid JSON array: {source}")]
    StatesParse {
        #[source]
        source: serde_json::Error,
        reply: String,
    },
    #[error("failed to write {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One agent to generate; also the shape of a batch file entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentRequest {
    pub source_document: PathBuf,
    pub agent_name: String,
    pub personality: String,
}

/// Files written for one agent
#[derive(Debug, Clone)]
pub struct ContentOutcome {
    pub agent_name: String,
    pub agent_dir: PathBuf,
    pub instructor_path: PathBuf,
    pub script_path: PathBuf,
    pub states_path: PathBuf,
    pub state_count: usize,
    /// Script format problems; the content is still written
    pub warnings: Vec<String>,
}

pub struct ContentPipeline {
    llm: Arc<dyn LlmService>,
    store: AgentContentStore,
}

impl ContentPipeline {
    pub fn new(llm: Arc<dyn LlmService>, store: AgentContentStore) -> Self {
        Self { llm, store }
    }

    pub fn model_id(&self) -> &str {
        self.llm.model_id()
    }

    pub fn store(&self) -> &AgentContentStore {
        &self.store
    }

    /// Run the three role prompts in order, saving each artifact as it arrives
    pub async fn generate(&self, request: &ContentRequest) -> Result<ContentOutcome, ContentError> {
        let agent = request.agent_name.as_str();
        validate_agent_name(agent)?;

        let document = std::fs::read_to_string(&request.source_document).map_err(|source| {
            ContentError::Document {
                path: request.source_document.clone(),
                source,
            }
        })?;
        let speaker = Speaker::for_agent(agent);

        tracing::info!(
            agent,
            document = %request.source_document.display(),
            model = %self.llm.model_id(),
            "Generating voice agent content"
        );

        let instructions = self
            .ask(
                prompts::INSTRUCTOR_PROMPT,
                prompts::instructor_request(&document, agent, &request.personality),
                INSTRUCTOR_MAX_TOKENS,
            )
            .await?;
        let instructor_path = self.save(agent, "instructor", &instructions)?;

        let script = self
            .ask(
                prompts::SCRIPT_PROMPT,
                prompts::script_request(
                    &document,
                    agent,
                    &request.personality,
                    speaker,
                    &instructions,
                ),
                SCRIPT_MAX_TOKENS,
            )
            .await?;
        let script_path = self.save(agent, "script.txt", &script)?;

        let warnings = check_script(&script, speaker);
        for warning in &warnings {
            tracing::warn!(agent, %warning, "Script format");
        }

        let reply = self
            .ask(
                prompts::STATES_PROMPT,
                prompts::states_request(agent, &script),
                STATES_MAX_TOKENS,
            )
            .await?;
        let states = parse_states(&reply)?;
        let states_path =
            self.store
                .save_states(agent, &states)
                .map_err(|source| ContentError::Store {
                    path: self.store.agent_dir(agent),
                    source,
                })?;

        tracing::info!(agent, states = states.len(), "Voice agent content written");

        Ok(ContentOutcome {
            agent_name: agent.to_string(),
            agent_dir: self.store.agent_dir(agent),
            instructor_path,
            script_path,
            states_path,
            state_count: states.len(),
            warnings,
        })
    }

    async fn ask(&self, system: &str, user: String, max_tokens: u32) -> Result<String, LlmError> {
        let request = LlmRequest::prompt(system, user)
            .with_max_tokens(max_tokens)
            .with_temperature(TEMPERATURE);
        let response = self.llm.complete(&request).await?;
        Ok(response.text.trim().to_string())
    }

    fn save(&self, agent: &str, content_type: &str, content: &str) -> Result<PathBuf, ContentError> {
        self.store
            .save_content(agent, content_type, content)
            .map_err(|source| ContentError::Store {
                path: self.store.agent_dir(agent),
                source,
            })
    }
}

/// Parse a states reply, tolerating a surrounding code fence
pub fn parse_states(reply: &str) -> Result<Vec<ConversationState>, ContentError> {
    serde_json::from_str(&crate::markdown::unfence(reply)).map_err(|source| {
        ContentError::StatesParse {
            source,
            reply: reply.to_string(),
        }
    })
}

/// Format problems that would keep the server from finding script sections
pub fn check_script(script: &str, speaker: Speaker) -> Vec<String> {
    let mut warnings = Vec::new();

    let numbers: Vec<u64> = SECTION_HEADER
        .captures_iter(script)
        .filter_map(|c| c.get(1)?.as_str().parse().ok())
        .collect();
    match numbers.first() {
        None => warnings.push("Script has no `Section <n>:` headers".to_string()),
        Some(&first) if first != 0 => {
            warnings.push(format!("First section is numbered {first}, expected 0"));
        }
        Some(_) => {}
    }
    if numbers.windows(2).any(|w| w[1] != w[0] + 1) {
        warnings.push("Section numbers are not consecutive".to_string());
    }

    if !script
        .lines()
        .any(|line| dialogue_line(line, speaker).is_some())
    {
        warnings.push(format!("Script has no lines for speaker '{}'", speaker.label()));
    }

    warnings
}

/// Folder name as typed by a user: lower-cased, spaces become underscores
pub fn normalize_agent_name(input: &str) -> String {
    input.trim().to_lowercase().replace(' ', "_")
}

fn validate_agent_name(name: &str) -> Result<(), ContentError> {
    let path = Path::new(name);
    let single_component = path.components().count() == 1 && path.file_name().is_some();
    if name.trim().is_empty() || !single_component {
        return Err(ContentError::InvalidAgentName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::MockLlmService;
    use crate::voice::{resolve_step, VoiceRegistry};
    use tempfile::TempDir;

    const SCRIPT: &str = "Section 0: Welcome\n\
        Dr. Red Tape: \"Welcome to ACME.\"\n\
        Section 1: Benefits\n\
        Dr. Red Tape: \"Form 401 covers your 401(k).\"\n";

    const STATES: &str = r#"```json
[
  {"id": "1_welcome", "description": "Welcome", "instructions": [], "examples": ["Hi"], "transitions": []},
  {"id": "2_benefits", "description": "Benefits", "examples": ["401(k)"]}
]
```"#;

    struct Fixture {
        _tmp: TempDir,
        docs: PathBuf,
        out: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let docs = tmp.path().join("handbook.txt");
        std::fs::write(&docs, "ACME Employee Handbook\nBenefits: 401(k)").unwrap();
        let out = tmp.path().join("voice_agent");
        Fixture {
            docs,
            out,
            _tmp: tmp,
        }
    }

    fn request(fx: &Fixture, agent: &str) -> ContentRequest {
        ContentRequest {
            source_document: fx.docs.clone(),
            agent_name: agent.to_string(),
            personality: "Dry bureaucrat".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_writes_all_artifacts() {
        let fx = fixture();
        let mock = Arc::new(MockLlmService::new("gpt-4o"));
        mock.queue_text("Identity: a stickler\n");
        mock.queue_text(SCRIPT);
        mock.queue_text(STATES);

        let pipeline = ContentPipeline::new(mock.clone(), AgentContentStore::new(&fx.out));
        let outcome = pipeline.generate(&request(&fx, "red_tape")).await.unwrap();

        assert_eq!(outcome.state_count, 2);
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
        assert_eq!(
            std::fs::read_to_string(&outcome.instructor_path).unwrap(),
            "Identity: a stickler"
        );

        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 3);
        assert!(mock.user_text(0).contains("ACME Employee Handbook"));
        assert!(mock.user_text(1).contains("Speaker label: Dr. Red Tape"));
        assert!(mock.user_text(1).contains("Identity: a stickler"));
        assert!(mock.user_text(2).contains("Section 1: Benefits"));

        // Served back by the audio server
        let registry = VoiceRegistry::load(&fx.out);
        let agent = registry.get("red_tape").unwrap();
        assert_eq!(
            resolve_step(agent, Some("2")).input,
            "Form 401 covers your 401(k)."
        );
        assert_eq!(agent.available_steps().unwrap(), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_invalid_states_keep_earlier_files() {
        let fx = fixture();
        let mock = Arc::new(MockLlmService::new("gpt-4o"));
        mock.queue_text("Identity");
        mock.queue_text(SCRIPT);
        mock.queue_text("Here are the states: none");

        let pipeline = ContentPipeline::new(mock, AgentContentStore::new(&fx.out));
        let err = pipeline.generate(&request(&fx, "red_tape")).await.unwrap_err();

        match err {
            ContentError::StatesParse { reply, .. } => assert!(reply.contains("none")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(fx.out.join("red_tape").join("script.txt").exists());
        assert!(!fx.out.join("red_tape").join("conversation_states.json").exists());
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let fx = fixture();
        let mock = Arc::new(MockLlmService::new("gpt-4o"));
        mock.queue_error(LlmError::auth("bad key"));

        let pipeline = ContentPipeline::new(mock, AgentContentStore::new(&fx.out));
        let err = pipeline.generate(&request(&fx, "red_tape")).await.unwrap_err();
        assert!(matches!(err, ContentError::Llm(_)));
        assert!(!fx.out.join("red_tape").exists());
    }

    #[tokio::test]
    async fn test_missing_document() {
        let fx = fixture();
        let mock = Arc::new(MockLlmService::new("gpt-4o"));
        let pipeline = ContentPipeline::new(mock.clone(), AgentContentStore::new(&fx.out));

        let mut req = request(&fx, "red_tape");
        req.source_document = fx.out.join("missing.txt");
        let err = pipeline.generate(&req).await.unwrap_err();
        assert!(matches!(err, ContentError::Document { .. }));
        assert!(mock.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_path_like_agent_names() {
        let fx = fixture();
        let mock = Arc::new(MockLlmService::new("gpt-4o"));
        let pipeline = ContentPipeline::new(mock, AgentContentStore::new(&fx.out));

        for name in ["", "../escape", "a/b", ".."] {
            let err = pipeline.generate(&request(&fx, name)).await.unwrap_err();
            assert!(matches!(err, ContentError::InvalidAgentName(_)), "{name}");
        }
    }

    #[test]
    fn test_check_script_warnings() {
        assert!(check_script(SCRIPT, Speaker::DrRedTape).is_empty());

        let warnings = check_script("Dr. Red Tape: hi", Speaker::CoachBlaze);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("no `Section <n>:` headers"));
        assert!(warnings[1].contains("Coach Blaze"));

        let warnings = check_script(
            "Section 1: A\nCoach Blaze: go\nSection 3: B",
            Speaker::CoachBlaze,
        );
        assert_eq!(
            warnings,
            vec![
                "First section is numbered 1, expected 0".to_string(),
                "Section numbers are not consecutive".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_states_bare_json() {
        let states = parse_states(r#"[{"id":"1_a","description":"A"}]"#).unwrap();
        assert_eq!(states[0].ordinal(), "1");
        assert!(parse_states(r#"{"id":"1_a"}"#).is_err());
    }

    #[test]
    fn test_normalize_agent_name() {
        assert_eq!(normalize_agent_name(" Benefits Guru "), "benefits_guru");
    }
}
