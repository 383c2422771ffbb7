//! Utterance end-pointing
//!
//! Segments a live microphone stream into single utterances using RMS
//! energy: speech starts when energy crosses a threshold and ends after a
//! stretch of silence. One completed segment maps to one coach exchange.

/// Minimum audio energy threshold to consider speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum duration of speech to accept an utterance (in samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// Silence duration to consider end of utterance (in samples)
const SILENCE_SAMPLES: usize = 8000; // 0.5 seconds

/// State of the utterance detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Waiting for speech
    Idle,
    /// Detected speech, accumulating the utterance
    Listening,
}

/// Segments audio into single utterances by energy
pub struct UtteranceDetector {
    state: DetectorState,
    speech_buffer: Vec<f32>,
    /// Voiced samples only; the buffer also holds trailing silence
    speech_samples: usize,
    silence_counter: usize,
}

impl Default for UtteranceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl UtteranceDetector {
    /// Create a new utterance detector in the idle state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DetectorState::Idle,
            speech_buffer: Vec::new(),
            speech_samples: 0,
            silence_counter: 0,
        }
    }

    /// Process audio samples
    ///
    /// Returns true once a complete utterance has been captured: enough
    /// speech followed by enough silence. The segment stays buffered until
    /// [`Self::take_speech_buffer`] is called.
    pub fn process(&mut self, samples: &[f32]) -> bool {
        let energy = rms(samples);
        let is_speech = energy > ENERGY_THRESHOLD;

        match self.state {
            DetectorState::Idle => {
                if is_speech {
                    self.state = DetectorState::Listening;
                    self.speech_buffer.clear();
                    self.speech_buffer.extend_from_slice(samples);
                    self.speech_samples = samples.len();
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech detected, listening");
                }
            }
            DetectorState::Listening => {
                self.speech_buffer.extend_from_slice(samples);

                if is_speech {
                    self.speech_samples += samples.len();
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                tracing::trace!(
                    buffer_len = self.speech_buffer.len(),
                    speech = self.speech_samples,
                    silence = self.silence_counter,
                    is_speech,
                    energy,
                    "listening state"
                );

                if self.silence_counter > SILENCE_SAMPLES
                    && self.speech_samples > MIN_SPEECH_SAMPLES
                {
                    tracing::debug!(samples = self.speech_buffer.len(), "utterance complete");
                    return true;
                }

                // Too much silence without enough speech: likely a noise blip
                if self.silence_counter > SILENCE_SAMPLES * 2 {
                    tracing::trace!("timeout, resetting");
                    self.reset();
                }
            }
        }

        false
    }

    /// Get the accumulated speech buffer
    #[must_use]
    pub fn speech_buffer(&self) -> &[f32] {
        &self.speech_buffer
    }

    /// Take the speech buffer and return the detector to idle
    pub fn take_speech_buffer(&mut self) -> Vec<f32> {
        let segment = std::mem::take(&mut self.speech_buffer);
        self.reset();
        segment
    }

    /// Reset detector to idle state
    pub fn reset(&mut self) {
        self.state = DetectorState::Idle;
        self.speech_buffer.clear();
        self.speech_samples = 0;
        self.silence_counter = 0;
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> DetectorState {
        self.state
    }
}

/// RMS energy of audio samples
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_of_silence_is_near_zero() {
        let silence = vec![0.0f32; 100];
        assert!(rms(&silence) < 0.001);

        let loud = vec![0.5f32; 100];
        assert!(rms(&loud) > 0.4);
    }

    #[test]
    fn speech_then_silence_completes_utterance() {
        let mut detector = UtteranceDetector::new();

        // 1 second of speech in 1600-sample chunks
        let speech = vec![0.2f32; 1600];
        for _ in 0..10 {
            assert!(!detector.process(&speech));
        }
        assert_eq!(detector.state(), DetectorState::Listening);

        // Silence until the endpoint fires
        let silence = vec![0.0f32; 1600];
        let mut complete = false;
        for _ in 0..10 {
            if detector.process(&silence) {
                complete = true;
                break;
            }
        }
        assert!(complete);
        assert!(detector.speech_buffer().len() > MIN_SPEECH_SAMPLES);

        let segment = detector.take_speech_buffer();
        assert!(!segment.is_empty());
        assert_eq!(detector.state(), DetectorState::Idle);
        assert!(detector.speech_buffer().is_empty());
    }

    #[test]
    fn short_blip_resets_to_idle() {
        let mut detector = UtteranceDetector::new();

        // A single short burst, well under the speech minimum
        assert!(!detector.process(&vec![0.2f32; 800]));
        assert_eq!(detector.state(), DetectorState::Listening);

        // Extended silence should time the blip out
        let silence = vec![0.0f32; 1600];
        for _ in 0..20 {
            assert!(!detector.process(&silence));
        }
        assert_eq!(detector.state(), DetectorState::Idle);
    }
}
