//! Voice processing module
//!
//! Handles microphone capture, utterance end-pointing, transcription,
//! speech synthesis, and playback.

mod capture;
mod playback;
mod stt;
mod tts;
mod utterance;

pub use capture::{Microphone, SAMPLE_RATE, samples_to_wav};
pub use playback::AudioPlayback;
pub use stt::{SpeechRecognizer, SpeechToText};
pub use tts::TextToSpeech;
pub use utterance::{DetectorState, UtteranceDetector, rms};
