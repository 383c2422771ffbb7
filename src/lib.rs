//! Lingo Coach - voice gateway for an English speaking coach
//!
//! This library provides the core functionality for the Lingo gateway:
//! - Voice processing (capture, utterance detection, STT, TTS, playback)
//! - Coaching logic (LLM-backed corrections, praise, follow-up questions)
//! - HTTP API for the chat widget and repeat-after-me practice mode
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Voice client (talk)                  │
//! │   Mic  │  Utterance  │  STT  │  Transcript  │  Play │
//! └────────────────────┬────────────────────────────────┘
//!                      │ POST /process
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Lingo Gateway                        │
//! │   Coach (LLM)  │  TTS  │  /repeat_sentence  │ /audio│
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod transcript;
pub mod voice;

pub use client::{AudioSink, VoiceSession};
pub use config::Config;
pub use error::{Error, Result};
pub use llm::{ChatClient, Coach, CoachReply};
pub use transcript::{Message, Role, TranscriptLog};
pub use voice::{AudioPlayback, Microphone, SpeechRecognizer, TextToSpeech, UtteranceDetector};
