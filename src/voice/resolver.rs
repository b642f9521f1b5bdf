//! Step resolution: pick the text to speak for a requested step

use super::registry::dialogue_line;
use super::types::{ConversationState, ResolutionSource, Speaker, StepResolution, VoiceAgentConfig};

/// Maximum dialogue lines spoken for one script section
pub const MAX_SECTION_LINES: usize = 5;

/// Resolve `step` against an agent's script and states.
///
/// An integer step `n` reads the dialogue under the `Section {n-1}:` header.
/// Anything else is matched against conversation state ids by `{step}_` prefix.
/// When nothing matches, the agent's default sample is used. Never fails.
pub fn resolve_step(config: &VoiceAgentConfig, step: Option<&str>) -> StepResolution {
    let step = step.filter(|s| !s.is_empty());
    let Some(step) = step else {
        return resolution(config, config.default_input.clone(), ResolutionSource::Default);
    };

    if let (Some(script), Ok(number)) = (
        config.script_content.as_deref().filter(|s| !s.is_empty()),
        step.trim().parse::<i64>(),
    ) {
        let lines = section_dialogue(script, number, config.speaker);
        if !lines.is_empty() {
            return resolution(
                config,
                lines.join(" "),
                ResolutionSource::ScriptSection {
                    section: number.saturating_sub(1),
                },
            );
        }
    }

    if let Some(state) = config
        .states
        .as_deref()
        .and_then(|states| state_for_step(states, step))
    {
        let input = format!("{}\n\n{}", state.description, state.examples.join(" "));
        return resolution(
            config,
            input,
            ResolutionSource::ConversationState {
                id: state.id.clone(),
            },
        );
    }

    tracing::debug!(agent = %config.name, step, "No content for step, using default sample");
    resolution(config, config.default_input.clone(), ResolutionSource::Fallback)
}

fn resolution(config: &VoiceAgentConfig, input: String, source: ResolutionSource) -> StepResolution {
    StepResolution {
        input,
        instructions: config.instructions.clone(),
        voice: config.voice,
        source,
    }
}

/// Speaker lines between the `Section {step-1}:` and `Section {step}:` markers
fn section_dialogue(script: &str, step: i64, speaker: Speaker) -> Vec<String> {
    let start = format!("Section {}:", step.saturating_sub(1));
    let end = format!("Section {step}:");

    let mut in_section = false;
    let mut lines = Vec::new();
    for line in script.lines() {
        if line.contains(&start) {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if line.contains(&end) {
            break;
        }
        if let Some(dialogue) = dialogue_line(line, speaker) {
            lines.push(dialogue);
            if lines.len() == MAX_SECTION_LINES {
                break;
            }
        }
    }
    lines
}

fn state_for_step<'a>(states: &'a [ConversationState], step: &str) -> Option<&'a ConversationState> {
    let prefix = format!("{step}_");
    states.iter().find(|s| s.id.starts_with(&prefix))
}

/// First `max_chars` characters of `input`, with an ellipsis when truncated
pub fn preview(input: &str, max_chars: usize) -> String {
    let mut chars = input.chars();
    let mut text: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        text.push_str("...");
    }
    text
}
