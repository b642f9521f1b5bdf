//! Voice server: streams synthesized onboarding audio for each voice agent

use axum::http::{header::HeaderName, HeaderValue};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};
use voice_onboarding::api::{create_router, AppState};
use voice_onboarding::config::ServerConfig;
use voice_onboarding::llm::LlmConfig;
use voice_onboarding::telemetry;
use voice_onboarding::tts::{OpenAISpeechService, SpeechSynthesizer};
use voice_onboarding::voice::VoiceRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_json(telemetry::SERVER_FILTER);

    let llm_config = LlmConfig::from_env();
    let api_key = match llm_config.require_api_key() {
        Ok(key) => key.to_string(),
        Err(e) => {
            tracing::error!(error = %e, "Cannot start without an API key");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let config = ServerConfig::from_env()?;

    tracing::info!(root = %config.content_root.display(), "Loading voice agents");
    let mut registry = VoiceRegistry::load(&config.content_root);
    if config.builtin_coach {
        registry = registry.with_builtin_coach();
    }
    tracing::info!(agents = ?registry.names(), "Voice registry initialized");

    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(OpenAISpeechService::new(
        api_key,
        config.tts_model.as_deref(),
        llm_config.base_url.as_deref(),
    )?);
    tracing::info!(model = %synthesizer.model_id(), "Speech synthesis configured");

    let state = AppState::new(registry, synthesizer);

    // Credentials rule out wildcards, so methods and headers are mirrored
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .expose_headers([HeaderName::from_static("content-disposition")]);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting voice server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
