//! Voice session integration tests
//!
//! Exercise the client exchange loop against a stub coaching server,
//! with the recognizer and speaker replaced by fakes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{extract::State, routing::get, routing::post, Json, Router};
use lingo_coach::transcript::{Message, TranscriptLog, TranscriptObserver};
use lingo_coach::{AudioSink, Role, SpeechRecognizer, VoiceSession};

/// Shared ordered event trace across client and stub server
type Events = Arc<Mutex<Vec<String>>>;

/// Recognizer that always returns a fixed transcript
struct FixedRecognizer(&'static str);

#[async_trait]
impl SpeechRecognizer for FixedRecognizer {
    async fn recognize(&self, _audio: &[u8]) -> lingo_coach::Result<String> {
        Ok(self.0.to_string())
    }
}

/// Sink that records played clips instead of touching audio hardware
struct RecordingSink {
    events: Events,
    clips: Arc<Mutex<Vec<Vec<u8>>>>,
}

#[async_trait]
impl AudioSink for RecordingSink {
    async fn play_mp3(&mut self, mp3: &[u8]) -> lingo_coach::Result<()> {
        self.events.lock().unwrap().push("play".to_string());
        self.clips.lock().unwrap().push(mp3.to_vec());
        Ok(())
    }
}

/// Observer that traces each transcript append
struct TracingObserver(Events);

impl TranscriptObserver for TracingObserver {
    fn message_appended(&mut self, message: &Message) {
        self.0
            .lock()
            .unwrap()
            .push(format!("append:{}:{}", message.role.as_str(), message.text));
    }
}

#[derive(serde::Deserialize)]
struct StubRequest {
    text: String,
}

/// Stub /process handler: echoes a canned reply and records the call
async fn stub_process(
    State(events): State<Events>,
    Json(request): Json<StubRequest>,
) -> Json<serde_json::Value> {
    events
        .lock()
        .unwrap()
        .push(format!("server:process:{}", request.text));

    Json(serde_json::json!({
        "reply": "hi there",
        "audio": "/audio/reply.mp3",
    }))
}

/// Stub audio handler returning a fake clip
async fn stub_audio(State(events): State<Events>) -> Vec<u8> {
    events.lock().unwrap().push("server:audio".to_string());
    vec![0x49, 0x44, 0x33, 0x04]
}

/// Start the stub server on an ephemeral port, returning its base URL
async fn start_stub_server(events: Events) -> String {
    let app = Router::new()
        .route("/process", post(stub_process))
        .route("/audio/reply.mp3", get(stub_audio))
        .with_state(events);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("stub server addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });

    format!("http://{addr}")
}

/// Build a session wired to the stub server with fakes and a traced log
async fn build_session(events: &Events) -> (VoiceSession, Arc<Mutex<Vec<Vec<u8>>>>) {
    let server_url = start_stub_server(events.clone()).await;

    let clips = Arc::new(Mutex::new(Vec::new()));
    let sink = RecordingSink {
        events: events.clone(),
        clips: clips.clone(),
    };

    let log = TranscriptLog::with_observer(Box::new(TracingObserver(events.clone())));

    let session = VoiceSession::new(
        server_url,
        Box::new(FixedRecognizer("hello")),
        Box::new(sink),
        log,
    );

    (session, clips)
}

#[tokio::test]
async fn test_exchange_renders_both_sides_and_plays_reply() {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let (mut session, clips) = build_session(&events).await;

    session.exchange("hello").await.expect("exchange");

    let messages = session.transcript().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].text, "hello");
    assert_eq!(messages[1].role, Role::Bot);
    assert_eq!(messages[1].text, "hi there");

    // The fetched clip reached the speaker
    let clips = clips.lock().unwrap();
    assert_eq!(clips.len(), 1);
    assert_eq!(clips[0], vec![0x49, 0x44, 0x33, 0x04]);
}

#[tokio::test]
async fn test_user_line_is_rendered_before_request_is_sent() {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let (mut session, _clips) = build_session(&events).await;

    session.exchange("hello").await.expect("exchange");

    let trace = events.lock().unwrap().clone();
    let user_append = trace
        .iter()
        .position(|e| e == "append:user:hello")
        .expect("user append in trace");
    let server_request = trace
        .iter()
        .position(|e| e == "server:process:hello")
        .expect("server request in trace");
    let bot_append = trace
        .iter()
        .position(|e| e == "append:bot:hi there")
        .expect("bot append in trace");
    let play = trace.iter().position(|e| e == "play").expect("play in trace");

    assert!(user_append < server_request);
    assert!(server_request < bot_append);
    assert!(bot_append < play);
}

#[tokio::test]
async fn test_sequential_exchanges_interleave_in_order() {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let (mut session, clips) = build_session(&events).await;

    for _ in 0..3 {
        session.exchange("hello").await.expect("exchange");
    }

    let messages = session.transcript().messages();
    assert_eq!(messages.len(), 6);
    for pair in messages.chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Bot);
    }

    assert_eq!(clips.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_server_failure_still_renders_user_line() {
    // No /process route at this address
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, Router::new()).await.unwrap();
    });

    let clips = Arc::new(Mutex::new(Vec::new()));
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let sink = RecordingSink {
        events: events.clone(),
        clips: clips.clone(),
    };

    let mut session = VoiceSession::new(
        format!("http://{addr}"),
        Box::new(FixedRecognizer("hello")),
        Box::new(sink),
        TranscriptLog::new(),
    );

    let result = session.exchange("hello").await;
    assert!(result.is_err());

    // The child's words were rendered even though the server failed
    let messages = session.transcript().messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);

    // Nothing was played
    assert!(clips.lock().unwrap().is_empty());
}
