//! HTTP request handlers

use super::types::{AgentEndpoint, AgentListResponse, DebugResponse, ErrorResponse};
use super::AppState;
use crate::tts::SpeechRequest;
use crate::voice::{preview, resolve_step};
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

const PREVIEW_CHARS: usize = 200;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_agents))
        .route("/version", get(get_version))
        .route("/debug/:agent_name", get(debug_agent))
        .route("/:agent_name", get(stream_audio))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct StepQuery {
    step: Option<String>,
}

impl StepQuery {
    fn step(&self) -> Option<&str> {
        self.step.as_deref().filter(|s| !s.is_empty())
    }
}

// ============================================================
// Listing
// ============================================================

async fn list_agents(State(state): State<AppState>) -> Json<AgentListResponse> {
    let endpoints = state
        .registry
        .iter()
        .map(|agent| {
            (
                agent.name.clone(),
                AgentEndpoint {
                    url: format!("/{}", agent.name),
                    available_steps: agent.available_steps(),
                },
            )
        })
        .collect();

    Json(AgentListResponse {
        message: "Audio API Server".to_string(),
        endpoints,
        usage: "GET /<agent_name>?step=<step> streams MP3 audio; \
                GET /debug/<agent_name>?step=<step> shows the resolved text"
            .to_string(),
    })
}

// ============================================================
// Audio
// ============================================================

async fn stream_audio(
    State(state): State<AppState>,
    Path(agent_name): Path<String>,
    Query(query): Query<StepQuery>,
) -> Result<Response, AppError> {
    let agent = state
        .registry
        .get(&agent_name)
        .ok_or_else(|| AppError::agent_not_found(&agent_name))?;

    let filename = audio_filename(&agent_name, query.step());
    let disposition = HeaderValue::from_str(&format!("inline; filename=\"{filename}\""))
        .map_err(|_| AppError::BadRequest("Invalid download filename".to_string()))?;

    let resolution = resolve_step(agent, query.step());
    tracing::info!(
        agent = %agent_name,
        step = query.step().unwrap_or("default"),
        source = ?resolution.source,
        voice = %resolution.voice,
        "Synthesizing audio"
    );

    let audio = state
        .synthesizer
        .synthesize(&SpeechRequest::from(&resolution))
        .await
        .map_err(|e| {
            tracing::error!(agent = %agent_name, error = %e, "Speech synthesis failed");
            AppError::BadGateway(format!("Speech synthesis failed: {e}"))
        })?;

    let mut response = Body::from_stream(audio).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}

/// `<agent>_<step|default>.mp3` with anything outside `[A-Za-z0-9_-]` replaced by `_`
fn audio_filename(agent_name: &str, step: Option<&str>) -> String {
    let stem: String = format!("{agent_name}_{}", step.unwrap_or("default"))
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.mp3")
}

// ============================================================
// Debug
// ============================================================

async fn debug_agent(
    State(state): State<AppState>,
    Path(agent_name): Path<String>,
    Query(query): Query<StepQuery>,
) -> Result<Json<DebugResponse>, AppError> {
    let agent = state
        .registry
        .get(&agent_name)
        .ok_or_else(|| AppError::agent_not_found(&agent_name))?;

    let resolution = resolve_step(agent, query.step());

    Ok(Json(DebugResponse {
        agent: agent_name,
        step: query.step,
        has_script: agent.has_script(),
        has_states: agent.has_states(),
        content_preview: preview(&resolution.input, PREVIEW_CHARS),
        voice: resolution.voice,
        source: resolution.source,
    }))
}

async fn get_version() -> &'static str {
    concat!("voice-onboarding ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
}

impl AppError {
    fn agent_not_found(name: &str) -> Self {
        AppError::NotFound(format!("Voice agent '{name}' not found"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::testing::MockSynthesizer;
    use crate::tts::SpeechSynthesizer;
    use crate::voice::{ConversationState, Speaker, Voice, VoiceAgentConfig, VoiceRegistry};
    use axum::body::to_bytes;
    use axum::http::Request;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const SCRIPT: &str = "Section 0: Welcome\n\
        Dr. Red Tape: \"Welcome aboard.\"\n\
        Section 1: Forms\n\
        Dr. Red Tape: \"Fill in form 27B.\"\n\
        Dr. Red Tape: \"In triplicate.\"\n\
        Section 2: Lunch\n\
        Section 3: End\n";

    fn state(id: &str, description: &str, examples: &[&str]) -> ConversationState {
        ConversationState {
            id: id.to_string(),
            description: description.to_string(),
            instructions: vec![],
            examples: examples.iter().map(|e| (*e).to_string()).collect(),
            transitions: vec![],
        }
    }

    fn registry() -> VoiceRegistry {
        let mut registry = VoiceRegistry::default().with_builtin_coach();
        registry.insert(VoiceAgentConfig {
            name: "red_tape".to_string(),
            default_input: "Welcome aboard.".to_string(),
            instructions: "Voice: bureaucratic".to_string(),
            voice: Voice::Onyx,
            speaker: Speaker::DrRedTape,
            states: Some(vec![
                state("1_greeting", "Greet", &["Hello."]),
                state("2_policy", "Explain policy", &["Rule one.", "Rule two."]),
                state("3_lunch", "Lunch break", &["Eat."]),
            ]),
            script_content: Some(SCRIPT.to_string()),
        });
        registry
    }

    fn app(synthesizer: Arc<dyn SpeechSynthesizer>) -> Router {
        create_router(AppState::new(registry(), synthesizer))
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = get(router, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_root_lists_agents_and_steps() {
        let (status, json) = get_json(app(Arc::new(MockSynthesizer::failing())), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Audio API Server");
        assert_eq!(json["endpoints"]["red_tape"]["url"], "/red_tape");
        assert_eq!(
            json["endpoints"]["red_tape"]["available_steps"],
            serde_json::json!(["1", "2", "3"])
        );
        assert_eq!(json["endpoints"]["coach"]["url"], "/coach");
        assert!(json["endpoints"]["coach"].get("available_steps").is_none());
        assert!(json["usage"].is_string());
    }

    #[tokio::test]
    async fn test_audio_streams_with_headers() {
        let mock = Arc::new(MockSynthesizer::with_chunks(&[b"ID3", b"\x00\x01"]));
        let (status, headers, body) = get(app(mock.clone()), "/red_tape?step=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "audio/mpeg");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "inline; filename=\"red_tape_2.mp3\""
        );
        assert_eq!(body, b"ID3\x00\x01");

        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].input, "Fill in form 27B. In triplicate.");
        assert_eq!(requests[0].instructions, "Voice: bureaucratic");
        assert_eq!(requests[0].voice, Voice::Onyx);
    }

    #[tokio::test]
    async fn test_audio_default_filename() {
        let mock = Arc::new(MockSynthesizer::with_chunks(&[b"mp3"]));
        let (status, headers, _) = get(app(mock.clone()), "/coach?step=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "inline; filename=\"coach_default.mp3\""
        );
        assert_eq!(mock.recorded_requests()[0].voice, Voice::Coral);
    }

    #[tokio::test]
    async fn test_step_cannot_inject_disposition_params() {
        let mock = Arc::new(MockSynthesizer::with_chunks(&[b"mp3"]));
        let (status, headers, _) =
            get(app(mock.clone()), "/red_tape?step=x;%20filename=evil.exe").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "inline; filename=\"red_tape_x__filename_evil_exe.mp3\""
        );
        // The raw step still drives resolution
        assert_eq!(mock.recorded_requests().len(), 1);
    }

    #[test]
    fn test_audio_filename() {
        assert_eq!(audio_filename("coach", None), "coach_default.mp3");
        assert_eq!(audio_filename("red_tape", Some("2_policy")), "red_tape_2_policy.mp3");
        assert_eq!(audio_filename("ägent", Some("a\"b")), "_gent_a_b.mp3");
    }

    #[tokio::test]
    async fn test_unknown_agent_is_404() {
        let mock = Arc::new(MockSynthesizer::with_chunks(&[b"mp3"]));
        let (status, json) = get_json(app(mock.clone()), "/nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Voice agent 'nobody' not found");

        let (status, _) = get_json(app(mock.clone()), "/debug/nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(mock.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_502() {
        let (status, json) = get_json(app(Arc::new(MockSynthesizer::failing())), "/red_tape").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Speech synthesis failed"));
    }

    #[tokio::test]
    async fn test_debug_reports_resolution() {
        let mock = Arc::new(MockSynthesizer::with_chunks(&[b"mp3"]));
        let (status, json) = get_json(app(mock.clone()), "/debug/red_tape?step=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["agent"], "red_tape");
        assert_eq!(json["step"], "3");
        assert_eq!(json["has_script"], true);
        assert_eq!(json["has_states"], true);
        assert_eq!(json["voice"], "onyx");
        // Section 2 has no dialogue, so the 3_lunch state answers
        assert_eq!(json["content_preview"], "Lunch break\n\nEat.");
        assert_eq!(json["source"]["kind"], "conversation_state");
        assert!(mock.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_debug_without_step() {
        let (_, json) = get_json(app(Arc::new(MockSynthesizer::failing())), "/debug/coach").await;
        assert!(json["step"].is_null());
        assert_eq!(json["has_script"], false);
        assert_eq!(json["has_states"], false);
        assert_eq!(json["source"]["kind"], "default");
        assert!(json["content_preview"].as_str().unwrap().ends_with("..."));
    }

    #[tokio::test]
    async fn test_version() {
        let (status, _, body) = get(app(Arc::new(MockSynthesizer::failing())), "/version").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().starts_with("voice-onboarding "));
    }
}
