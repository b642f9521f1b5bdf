//! Role prompts for the content pipeline

use crate::voice::Speaker;

pub const INSTRUCTOR_PROMPT: &str = r"You create personality and tone instructions for voice agents based on company documentation.

Write the instructions as plain text with two parts:

Personality and Tone
- Identity: who the agent is
- Task: what the agent does for the listener
- Demeanor
- Tone
- Level of Enthusiasm
- Level of Formality
- Level of Emotion
- Filler Words
- Pacing
- Other details

Instructions
- Specific behaviors, including confirming names, numbers and dates back to the listener.

Output only the instructions text.";

pub const SCRIPT_PROMPT: &str = r#"You create detailed voice agent scripts based on company documentation.

Rules:
1. Structure the script in numbered sections. Each section starts with a header line exactly like `Section 0: Welcome`, numbered from 0 and increasing by one.
2. Every spoken line of the agent is written as `<Speaker>: "<dialogue>"` on its own line, using the speaker label you are given.
3. Use the agent's personality consistently throughout.
4. Use natural speech patterns. Stage directions go on their own lines in square brackets.
5. Cover all key information from the source document.
6. Keep the whole script to about 10-12 minutes of speech.

Output only the script."#;

pub const STATES_PROMPT: &str = r#"You create structured conversation states for voice agents from a dialogue script.

Reply with a JSON array and nothing else. Each element has:
- "id": unique identifier "<ordinal>_<slug>", e.g. "1_greeting", "2_overview"; ordinals start at 1 and increase
- "description": brief description of the state's purpose
- "instructions": array of specific instructions for the agent
- "examples": array of example phrases the agent might say
- "transitions": array of conditions for moving to the next states

States should flow in script order and cover all of its content."#;

pub fn instructor_request(document: &str, agent_name: &str, personality: &str) -> String {
    format!(
        "Create the personality and tone instructions for the voice agent \"{agent_name}\".\n\n\
         Agent personality: {personality}\n\n\
         Source document:\n{document}"
    )
}

pub fn script_request(
    document: &str,
    agent_name: &str,
    personality: &str,
    speaker: Speaker,
    instructions: &str,
) -> String {
    let label = speaker.label();
    format!(
        "Create the dialogue script for the voice agent \"{agent_name}\".\n\n\
         Agent personality: {personality}\n\
         Speaker label: {label} (write every agent line as `{label}: \"...\"`)\n\n\
         Tone instructions:\n{instructions}\n\n\
         Source document:\n{document}"
    )
}

pub fn states_request(agent_name: &str, script: &str) -> String {
    format!("Create the conversation states for the voice agent \"{agent_name}\".\n\nScript:\n{script}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_request_names_speaker() {
        let prompt = script_request("doc", "coach_x", "loud", Speaker::CoachBlaze, "Voice: loud");
        assert!(prompt.contains("Speaker label: Coach Blaze"));
        assert!(prompt.contains("`Coach Blaze: \"...\"`"));
        assert!(prompt.contains("Tone instructions:\nVoice: loud"));
    }
}
