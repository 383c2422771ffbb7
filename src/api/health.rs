//! Health check endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use super::ApiState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed readiness response
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: ReadinessChecks,
}

/// Individual readiness checks
#[derive(Serialize)]
pub struct ReadinessChecks {
    pub coach: CheckResult,
    pub tts: CheckResult,
    pub audio_dir: CheckResult,
}

/// Result of a single health check
#[derive(Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    const fn ok() -> Self {
        Self {
            status: "ok",
            message: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            status: "fail",
            message: Some(message.into()),
        }
    }

    fn unavailable() -> Self {
        Self {
            status: "unavailable",
            message: Some("not configured".to_string()),
        }
    }
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe - is the service ready to accept traffic?
async fn ready(State(state): State<Arc<ApiState>>) -> (StatusCode, Json<ReadinessResponse>) {
    let coach_check = check_coach(&state);
    let tts_check = check_tts(&state);
    let audio_dir_check = check_audio_dir(&state);

    // Missing providers degrade the coaching routes but the process is up
    let all_ok = audio_dir_check.status == "ok"
        && coach_check.status != "fail"
        && tts_check.status != "fail";

    let status = if all_ok { "ok" } else { "degraded" };
    let http_status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(ReadinessResponse {
            status,
            checks: ReadinessChecks {
                coach: coach_check,
                tts: tts_check,
                audio_dir: audio_dir_check,
            },
        }),
    )
}

/// Check coach availability
fn check_coach(state: &ApiState) -> CheckResult {
    match &state.coach {
        Some(_) => CheckResult::ok(),
        None => CheckResult::unavailable(),
    }
}

/// Check TTS availability
fn check_tts(state: &ApiState) -> CheckResult {
    match &state.tts {
        Some(_) => CheckResult::ok(),
        None => CheckResult::unavailable(),
    }
}

/// Check the audio clip directory is writable
fn check_audio_dir(state: &ApiState) -> CheckResult {
    if state.audio_dir.is_dir() {
        CheckResult::ok()
    } else {
        CheckResult::fail(format!("missing: {}", state.audio_dir.display()))
    }
}

/// Build health router (liveness only, no state needed)
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Build readiness router (needs state for checks)
pub fn ready_router(state: Arc<ApiState>) -> Router {
    Router::new().route("/ready", get(ready)).with_state(state)
}
