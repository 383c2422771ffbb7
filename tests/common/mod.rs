//! Shared test utilities

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use lingo_coach::api::{self, ApiState};

/// Create a unique temp directory for generated audio clips
#[must_use]
pub fn setup_audio_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lingo-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("failed to create test audio dir");
    dir
}

/// Build a test router with no providers configured
#[must_use]
pub fn build_test_router(audio_dir: PathBuf) -> Router {
    let state = Arc::new(ApiState {
        coach: None,
        tts: None,
        audio_dir,
    });

    router_for_state(state)
}

/// Build a test router with dummy-keyed providers, for request validation
/// tests that reject before any outbound call
#[must_use]
pub fn build_configured_router(audio_dir: PathBuf) -> Router {
    use lingo_coach::llm::ChatClient;
    use lingo_coach::voice::TextToSpeech;
    use tokio::sync::Mutex;

    let chat = ChatClient::new(
        "http://127.0.0.1:9".to_string(),
        "test-key".to_string(),
        "test-model".to_string(),
    )
    .expect("test chat client");

    let tts = TextToSpeech::new(
        "test-key".to_string(),
        "tts-1".to_string(),
        "alloy".to_string(),
        1.0,
    )
    .expect("test tts");

    let state = Arc::new(ApiState {
        coach: Some(Arc::new(Mutex::new(lingo_coach::Coach::new(chat, 1000)))),
        tts: Some(Arc::new(tts)),
        audio_dir,
    });

    router_for_state(state)
}

/// Assemble the routes under test for a given state
fn router_for_state(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(api::chat::router(state.clone()))
        .merge(api::repeat::router(state.clone()))
        .merge(api::health::router())
        .merge(api::health::ready_router(state.clone()))
        .nest_service(
            "/audio",
            tower_http::services::ServeDir::new(&state.audio_dir),
        )
}
