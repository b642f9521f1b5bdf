//! Environment-driven configuration shared by the server and the CLIs

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_CONTENT_ROOT: &str = "voice_agent";
pub const DEFAULT_DOCS_DIR: &str = "ACME_docs";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Audio server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Root holding one directory per voice agent
    pub content_root: PathBuf,
    pub cors_origin: String,
    /// Register the built-in demo coach before scanning `content_root`
    pub builtin_coach: bool,
    pub tts_model: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            content_root: PathBuf::from(DEFAULT_CONTENT_ROOT),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            builtin_coach: true,
            tts_model: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match std::env::var("VOICE_PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "VOICE_PORT",
                value,
            })?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            port,
            content_root: std::env::var("VOICE_AGENT_DIR")
                .map_or(defaults.content_root, PathBuf::from),
            cors_origin: std::env::var("VOICE_CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            builtin_coach: env_flag("VOICE_BUILTIN_COACH", defaults.builtin_coach),
            tts_model: std::env::var("TTS_MODEL").ok(),
        })
    }
}

/// Directory listed by the interactive CLIs
pub fn docs_dir() -> PathBuf {
    std::env::var("ACME_DOCS_DIR").map_or_else(|_| PathBuf::from(DEFAULT_DOCS_DIR), PathBuf::from)
}

/// Directory voice agent content is written to and served from
pub fn content_root() -> PathBuf {
    std::env::var("VOICE_AGENT_DIR")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONTENT_ROOT), PathBuf::from)
}

/// Read a boolean environment variable; unset or unrecognized values yield `default`
pub fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
