//! On-disk layout of generated voice agent content

use crate::voice::{ConversationState, STATES_FILE};
use std::io;
use std::path::{Path, PathBuf};

/// Writes agent artifacts under `<root>/<agent>/`
#[derive(Debug, Clone)]
pub struct AgentContentStore {
    root: PathBuf,
}

impl AgentContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn agent_dir(&self, agent_name: &str) -> PathBuf {
        self.root.join(agent_name)
    }

    /// Save a text artifact. `content_type` may be given with or without `.txt`.
    pub fn save_content(
        &self,
        agent_name: &str,
        content_type: &str,
        content: &str,
    ) -> io::Result<PathBuf> {
        let dir = self.agent_dir(agent_name);
        std::fs::create_dir_all(&dir)?;

        let file_name = if content_type.ends_with(".txt") {
            content_type.to_string()
        } else {
            format!("{content_type}.txt")
        };
        let path = dir.join(file_name);
        std::fs::write(&path, content)?;

        tracing::debug!(agent = %agent_name, path = %path.display(), "Saved agent content");
        Ok(path)
    }

    /// Save the conversation states as pretty-printed JSON
    pub fn save_states(
        &self,
        agent_name: &str,
        states: &[ConversationState],
    ) -> io::Result<PathBuf> {
        let dir = self.agent_dir(agent_name);
        std::fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(states).map_err(io::Error::other)?;
        let path = dir.join(STATES_FILE);
        std::fs::write(&path, json)?;

        tracing::debug!(
            agent = %agent_name,
            states = states.len(),
            path = %path.display(),
            "Saved conversation states"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::{VoiceRegistry, INSTRUCTOR_FILE, SCRIPT_FILE};
    use tempfile::TempDir;

    fn states() -> Vec<ConversationState> {
        ["1_greeting", "2_policy", "3_benefits", "10_farewell"]
            .iter()
            .map(|id| ConversationState {
                id: (*id).to_string(),
                description: format!("Describe {id}"),
                instructions: vec!["Be clear".to_string()],
                examples: vec![format!("Example for {id}")],
                transitions: vec!["Next".to_string()],
            })
            .collect()
    }

    #[test]
    fn test_content_type_with_or_without_extension() {
        let tmp = TempDir::new().unwrap();
        let store = AgentContentStore::new(tmp.path());

        let a = store.save_content("agent", "instructor", "calm").unwrap();
        let b = store.save_content("agent", "script.txt", "lines").unwrap();
        assert_eq!(a, tmp.path().join("agent").join(INSTRUCTOR_FILE));
        assert_eq!(b, tmp.path().join("agent").join(SCRIPT_FILE));
        assert_eq!(std::fs::read_to_string(a).unwrap(), "calm");
    }

    #[test]
    fn test_states_pretty_printed() {
        let tmp = TempDir::new().unwrap();
        let store = AgentContentStore::new(tmp.path());
        let path = store.save_states("agent", &states()).unwrap();
        let raw = std::fs::read_to_string(path).unwrap();
        assert!(raw.starts_with("[\n  {\n    \"id\": \"1_greeting\""));
    }

    #[test]
    fn test_states_round_trip_through_registry() {
        let tmp = TempDir::new().unwrap();
        let store = AgentContentStore::new(tmp.path());
        store.save_content("benefits_guru", "instructor", "Warm").unwrap();
        store
            .save_content("benefits_guru", "script", "Dr. Red Tape: \"Hi\"")
            .unwrap();
        store.save_states("benefits_guru", &states()).unwrap();

        let registry = VoiceRegistry::load(tmp.path());
        let agent = registry.get("benefits_guru").unwrap();
        assert_eq!(agent.states.as_deref(), Some(states().as_slice()));
        assert_eq!(
            agent.available_steps(),
            Some(vec![
                "1".to_string(),
                "2".to_string(),
                "3".to_string(),
                "10".to_string()
            ])
        );
    }
}
