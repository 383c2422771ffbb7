//! Repeat-after-me practice endpoints
//!
//! The coach generates a short sentence for the child to read aloud; the
//! repeat check scores how closely the child's attempt matched it.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::chat::{synthesize_clip, ApiError};
use super::ApiState;

/// Build repeat-practice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/repeat_sentence", get(repeat_sentence))
        .route("/check_repeat", post(check_repeat))
        .with_state(state)
}

/// Response carrying a new practice sentence and its spoken clip
#[derive(Debug, Serialize)]
pub struct RepeatSentenceResponse {
    pub sentence: String,
    pub audio: String,
}

/// Generate a new sentence for the child to repeat
async fn repeat_sentence(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<RepeatSentenceResponse>, ApiError> {
    let coach = state
        .coach
        .as_ref()
        .ok_or(ApiError::NotConfigured("coach not configured (no LLM key)"))?;

    let tts = state
        .tts
        .as_ref()
        .ok_or(ApiError::NotConfigured("TTS not configured"))?;

    let sentence = coach
        .lock()
        .await
        .repeat_sentence()
        .await
        .map_err(|e| ApiError::CoachFailed(e.to_string()))?;

    tracing::info!(sentence = %sentence, "practice sentence generated");

    let audio = synthesize_clip(&state, tts, &sentence).await?;

    Ok(Json(RepeatSentenceResponse { sentence, audio }))
}

/// Request to score the child's repeat attempt against the target sentence
#[derive(Debug, Deserialize)]
pub struct CheckRepeatRequest {
    pub student: String,
    pub correct: String,
}

/// Score and short verbal feedback for a repeat attempt
#[derive(Debug, Serialize)]
pub struct CheckRepeatResponse {
    pub feedback: String,
    pub score: u8,
}

/// Score how closely the child repeated the target sentence
async fn check_repeat(
    Json(request): Json<CheckRepeatRequest>,
) -> Result<Json<CheckRepeatResponse>, ApiError> {
    let student = request.student.trim().to_lowercase();
    let correct = request.correct.trim().to_lowercase();

    if correct.is_empty() {
        return Err(ApiError::BadRequest("Empty target sentence"));
    }

    let ratio = similarity_ratio(&student, &correct);

    let feedback = if ratio >= 0.85 {
        "Excellent! You said it perfectly."
    } else if ratio >= 0.6 {
        "Good try! Almost correct. Try again."
    } else {
        "Let's try again. Listen carefully."
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = (ratio * 100.0).round() as u8;

    tracing::debug!(score, "repeat attempt scored");

    Ok(Json(CheckRepeatResponse {
        feedback: feedback.to_string(),
        score,
    }))
}

/// Ratcliff/Obershelp similarity between two strings, in `[0.0, 1.0]`
///
/// Recursively matches the longest common substring, then the pieces to
/// its left and right. The ratio is `2 * matches / (len_a + len_b)` over
/// chars.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Count matching chars via recursive longest-common-substring expansion
fn matching_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (a_start, b_start, len) = longest_common_substring(a, b);
    if len == 0 {
        return 0;
    }

    len + matching_chars(&a[..a_start], &b[..b_start])
        + matching_chars(&a[a_start + len..], &b[b_start + len..])
}

/// Find the longest common substring as (`a_start`, `b_start`, length)
fn longest_common_substring(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // Row of match lengths ending at the current (i, j)
    let mut lengths = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        let mut prev_diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let current = lengths[j + 1];
            if ca == cb {
                let len = prev_diag + 1;
                lengths[j + 1] = len;
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            } else {
                lengths[j + 1] = 0;
            }
            prev_diag = current;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert!((similarity_ratio("the cat is black", "the cat is black") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_strings_score_one() {
        assert!((similarity_ratio("", "") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert!(similarity_ratio("abc", "xyz").abs() < f64::EPSILON);
    }

    #[test]
    fn near_miss_scores_high() {
        let ratio = similarity_ratio("i like apples", "i like apple");
        assert!(ratio > 0.85, "ratio was {ratio}");
    }

    #[test]
    fn unrelated_sentences_score_low() {
        let ratio = similarity_ratio("the dog runs fast", "bananas are yellow");
        assert!(ratio < 0.6, "ratio was {ratio}");
    }

    #[test]
    fn ratio_is_symmetric() {
        let ab = similarity_ratio("good morning", "god morning");
        let ba = similarity_ratio("god morning", "good morning");
        assert!((ab - ba).abs() < f64::EPSILON);
    }
}
