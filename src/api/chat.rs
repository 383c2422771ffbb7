//! Coaching chat endpoint
//!
//! One POST per utterance: the child's transcript goes in, the coach's
//! reply text and a URL for its synthesized audio come back.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::ApiState;

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/process", post(process))
        .with_state(state)
}

/// Chat request carrying one transcribed utterance
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub text: String,
}

/// Chat response: reply text plus a URL for the spoken clip
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub reply: String,
    pub audio: String,
}

/// Process one utterance from the child
async fn process(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let coach = state
        .coach
        .as_ref()
        .ok_or(ApiError::NotConfigured("coach not configured (no LLM key)"))?;

    let tts = state
        .tts
        .as_ref()
        .ok_or(ApiError::NotConfigured("TTS not configured"))?;

    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Empty text"));
    }

    tracing::info!(text = %text, "processing utterance");

    let reply = coach
        .lock()
        .await
        .respond(text)
        .await
        .map_err(|e| ApiError::CoachFailed(e.to_string()))?;

    let audio = synthesize_clip(&state, tts, &reply).await?;

    Ok(Json(ProcessResponse { reply, audio }))
}

/// Synthesize text and write it under the audio dir, returning its URL path
pub(super) async fn synthesize_clip(
    state: &ApiState,
    tts: &crate::voice::TextToSpeech,
    text: &str,
) -> Result<String, ApiError> {
    let mp3 = tts
        .synthesize(text)
        .await
        .map_err(|e| ApiError::SynthesisFailed(e.to_string()))?;

    let filename = format!("{}.mp3", uuid::Uuid::new_v4());
    let path = state.audio_dir.join(&filename);

    tokio::fs::write(&path, &mp3)
        .await
        .map_err(|e| ApiError::SynthesisFailed(format!("failed to write clip: {e}")))?;

    tracing::debug!(path = %path.display(), bytes = mp3.len(), "reply clip written");
    Ok(format!("/audio/{filename}"))
}

/// Coaching API errors
#[derive(Debug)]
pub enum ApiError {
    NotConfigured(&'static str),
    BadRequest(&'static str),
    CoachFailed(String),
    SynthesisFailed(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::NotConfigured(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "not_configured",
                msg.to_string(),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.to_string()),
            Self::CoachFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "coach_failed", msg),
            Self::SynthesisFailed(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "synthesis_failed", msg)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}
