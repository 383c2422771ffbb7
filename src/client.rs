//! Native voice client
//!
//! Drives one coaching conversation from the local microphone: capture an
//! utterance, transcribe it, send the transcript to the server, then render
//! and speak the reply. Exchanges are strictly sequential, so a reply is
//! always rendered and played before the next utterance is captured.

use std::time::Duration;

use async_trait::async_trait;

use crate::transcript::{Role, TranscriptLog};
use crate::voice::{
    AudioPlayback, Microphone, SpeechRecognizer, UtteranceDetector, SAMPLE_RATE, samples_to_wav,
};
use crate::{Error, Result};

/// Minimum buffered samples before running the detector (0.1s at 16kHz)
const CHUNK_SIZE: usize = 1600;

/// Abstraction over reply audio output
///
/// Lets session tests swap the speaker for a recorder.
#[async_trait]
pub trait AudioSink: Send {
    /// Play an MP3 clip to completion
    ///
    /// # Errors
    ///
    /// Returns error if decoding or playback fails
    async fn play_mp3(&mut self, mp3: &[u8]) -> Result<()>;
}

#[async_trait]
impl AudioSink for AudioPlayback {
    async fn play_mp3(&mut self, mp3: &[u8]) -> Result<()> {
        Self::play_mp3(self, mp3).await
    }
}

/// Request body for the chat endpoint
#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    text: &'a str,
}

/// Reply from the chat endpoint
#[derive(serde::Deserialize)]
struct ChatReply {
    reply: String,
    audio: String,
}

/// One voice conversation against a coaching server
pub struct VoiceSession {
    http: reqwest::Client,
    server_url: String,
    recognizer: Box<dyn SpeechRecognizer>,
    sink: Box<dyn AudioSink>,
    log: TranscriptLog,
}

impl VoiceSession {
    /// Create a new session against `server_url`
    #[must_use]
    pub fn new(
        server_url: String,
        recognizer: Box<dyn SpeechRecognizer>,
        sink: Box<dyn AudioSink>,
        log: TranscriptLog,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
            recognizer,
            sink,
            log,
        }
    }

    /// The conversation transcript so far
    #[must_use]
    pub fn transcript(&self) -> &TranscriptLog {
        &self.log
    }

    /// Run the capture loop until Ctrl-C
    ///
    /// Runs on the current thread because cpal streams aren't Send.
    ///
    /// # Errors
    ///
    /// Returns error if audio capture cannot be started
    #[allow(clippy::future_not_send)]
    pub async fn run(&mut self) -> Result<()> {
        let mut capture = Microphone::open()?;
        let mut detector = UtteranceDetector::new();

        capture.start()?;
        tracing::info!(server = %self.server_url, "listening, speak when ready");

        loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    result.map_err(Error::Io)?;
                    tracing::info!("shutting down");
                    break;
                }
                () = tokio::time::sleep(Duration::from_millis(100)) => {
                    let samples = capture.drain();
                    if samples.len() < CHUNK_SIZE {
                        continue;
                    }

                    if detector.process(&samples) {
                        let speech = detector.take_speech_buffer();

                        if let Err(e) = self.handle_utterance(&speech).await {
                            tracing::error!(error = %e, "exchange failed");
                        }

                        // Drop anything captured while the reply was playing
                        capture.drain();
                    }
                }
            }
        }

        capture.stop();
        Ok(())
    }

    /// Transcribe one captured utterance and run the exchange
    async fn handle_utterance(&mut self, speech: &[f32]) -> Result<()> {
        let wav = samples_to_wav(speech, SAMPLE_RATE)?;
        let transcript = self.recognizer.recognize(&wav).await?;

        let transcript = transcript.trim();
        if transcript.is_empty() {
            tracing::debug!("empty transcript, ignoring");
            return Ok(());
        }

        self.exchange(transcript).await
    }

    /// Run one full exchange for an already-transcribed utterance
    ///
    /// The user's line goes into the transcript before the request is sent,
    /// so the child sees their own words even if the server fails.
    ///
    /// # Errors
    ///
    /// Returns error if the request, audio fetch, or playback fails
    pub async fn exchange(&mut self, transcript: &str) -> Result<()> {
        self.log.append(Role::User, transcript);

        let response = self
            .http
            .post(format!("{}/process", self.server_url))
            .json(&ChatRequest { text: transcript })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!("chat request failed {status}: {body}")));
        }

        let reply: ChatReply = response.json().await?;
        self.log.append(Role::Bot, &reply.reply);

        let mp3 = self.fetch_audio(&reply.audio).await?;
        self.sink.play_mp3(&mp3).await
    }

    /// Fetch a reply clip, resolving server-relative paths
    async fn fetch_audio(&self, audio_url: &str) -> Result<Vec<u8>> {
        let url = if audio_url.starts_with("http") {
            audio_url.to_string()
        } else {
            format!("{}{audio_url}", self.server_url)
        };

        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api(format!("audio fetch failed {status}: {url}")));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
