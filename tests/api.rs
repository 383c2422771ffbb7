//! API endpoint integration tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

mod common;
use common::{build_test_router, setup_audio_dir};

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_test_router(setup_audio_dir());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_ready_reports_unconfigured_providers() {
    let app = build_test_router(setup_audio_dir());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Missing providers degrade features but don't fail readiness
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["coach"]["status"], "unavailable");
    assert_eq!(json["checks"]["tts"]["status"], "unavailable");
    assert_eq!(json["checks"]["audio_dir"]["status"], "ok");
}

#[tokio::test]
async fn test_ready_fails_on_missing_audio_dir() {
    let missing = std::env::temp_dir().join(format!("lingo-missing-{}", uuid::Uuid::new_v4()));
    let app = common::build_test_router(missing);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["audio_dir"]["status"], "fail");
}

#[tokio::test]
async fn test_process_without_coach_returns_503() {
    let app = build_test_router(setup_audio_dir());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/process")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"text":"hello"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"]["code"], "not_configured");
}

#[tokio::test]
async fn test_process_empty_text_is_bad_request() {
    // Providers are configured with dummy keys; the empty-text check
    // rejects before any outbound request is made
    let app = common::build_configured_router(setup_audio_dir());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/process")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"text":"   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_repeat_sentence_without_coach_returns_503() {
    let app = build_test_router(setup_audio_dir());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/repeat_sentence")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

/// POST /check_repeat and return the parsed response body
async fn check_repeat(student: &str, correct: &str) -> (StatusCode, serde_json::Value) {
    let app = build_test_router(setup_audio_dir());
    let body = serde_json::json!({ "student": student, "correct": correct });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/check_repeat")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_check_repeat_perfect_match() {
    let (status, json) = check_repeat("The cat is black", "the cat is black").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["score"], 100);
    assert!(json["feedback"].as_str().unwrap().contains("Excellent"));
}

#[tokio::test]
async fn test_check_repeat_close_match() {
    let (status, json) = check_repeat("the cat is back", "the cat is black").await;

    assert_eq!(status, StatusCode::OK);
    let score = json["score"].as_u64().unwrap();
    assert!(score >= 85, "score was {score}");
    assert!(json["feedback"].as_str().unwrap().contains("Excellent"));
}

#[tokio::test]
async fn test_check_repeat_poor_match() {
    let (status, json) = check_repeat("zzz qqq", "the cat is black").await;

    assert_eq!(status, StatusCode::OK);
    let score = json["score"].as_u64().unwrap();
    assert!(score < 60, "score was {score}");
    assert!(json["feedback"].as_str().unwrap().contains("try again"));
}

#[tokio::test]
async fn test_check_repeat_empty_target_is_bad_request() {
    let (status, json) = check_repeat("anything", "  ").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_audio_clips_are_served() {
    let audio_dir = setup_audio_dir();
    std::fs::write(audio_dir.join("clip.mp3"), b"not really mp3").unwrap();

    let app = build_test_router(audio_dir);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/audio/clip.mp3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"not really mp3");
}

#[tokio::test]
async fn test_unknown_audio_clip_is_404() {
    let app = build_test_router(setup_audio_dir());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/audio/nope.mp3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
