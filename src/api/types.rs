//! API response types

use crate::voice::{ResolutionSource, Voice};
use serde::Serialize;
use std::collections::BTreeMap;

/// Root listing of every registered agent
#[derive(Debug, Serialize)]
pub struct AgentListResponse {
    pub message: String,
    pub endpoints: BTreeMap<String, AgentEndpoint>,
    pub usage: String,
}

#[derive(Debug, Serialize)]
pub struct AgentEndpoint {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_steps: Option<Vec<String>>,
}

/// Resolved content for an agent and step, without synthesis
#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub agent: String,
    pub step: Option<String>,
    pub has_script: bool,
    pub has_states: bool,
    pub content_preview: String,
    pub voice: Voice,
    pub source: ResolutionSource,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
