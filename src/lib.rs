//! Voice onboarding toolkit
//!
//! Turns onboarding documents into voice agent content and game scenes with
//! an LLM, and serves the agents' lines as synthesized speech over HTTP.

pub mod api;
pub mod config;
pub mod content;
pub mod game;
pub mod llm;
pub mod markdown;
pub mod telemetry;
pub mod tts;
pub mod voice;
