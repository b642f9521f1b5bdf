//! Voice agents: loading content from disk and resolving steps to speakable text

mod registry;
mod resolver;
mod types;

pub(crate) use registry::dialogue_line;
pub use registry::{
    default_sample, load_agent, RegistryError, VoiceRegistry, BUILTIN_COACH, FALLBACK_SAMPLE,
    INSTRUCTOR_FILE, SCRIPT_FILE, STATES_FILE,
};
pub use resolver::{preview, resolve_step, MAX_SECTION_LINES};
pub use types::{
    ConversationState, ResolutionSource, Speaker, StepResolution, Voice, VoiceAgentConfig,
};
