//! English speaking coach
//!
//! Wraps the chat client with the coaching prompt: correct the child's
//! sentence, encourage, ask one follow-up question. Replies come back in a
//! fixed three-line format and are recomposed into one spoken sentence.
//!
//! Conversation memory is a single rolling string trimmed to a byte budget;
//! it lives for the process lifetime only.

use super::{ChatClient, ChatMessage};
use crate::Result;

/// Sampling temperature for coaching replies
const COACH_TEMPERATURE: f32 = 0.3;

/// Sampling temperature for repeat-sentence generation (wants variety)
const REPEAT_TEMPERATURE: f32 = 0.8;

/// Parsed three-part coach reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoachReply {
    pub correct: String,
    pub praise: String,
    pub question: String,
}

impl CoachReply {
    /// Parse the raw LLM reply line-wise; missing lines stay empty
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut reply = Self::default();

        for line in raw.lines() {
            if let Some(rest) = line.strip_prefix("CORRECT:") {
                reply.correct = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix("PRAISE:") {
                reply.praise = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix("QUESTION:") {
                reply.question = rest.trim().to_string();
            }
        }

        reply
    }

    /// Recompose the reply as one spoken sentence
    #[must_use]
    pub fn compose(&self) -> String {
        format!("{}. {} {}", self.correct, self.praise, self.question)
    }
}

/// LLM-backed English speaking coach with rolling conversation context
pub struct Coach {
    chat: ChatClient,
    context: String,
    context_bytes: usize,
}

impl Coach {
    /// Create a coach with an empty conversation context
    #[must_use]
    pub const fn new(chat: ChatClient, context_bytes: usize) -> Self {
        Self {
            chat,
            context: String::new(),
            context_bytes,
        }
    }

    /// Respond to one utterance from the child
    ///
    /// Returns the composed reply sentence and records the turn in the
    /// rolling context.
    ///
    /// # Errors
    ///
    /// Returns error if the completion request fails
    pub async fn respond(&mut self, child_text: &str) -> Result<String> {
        let prompt = self.coach_prompt(child_text);
        let raw = self
            .chat
            .complete(&[ChatMessage::user(prompt)], COACH_TEMPERATURE)
            .await?;

        let reply = CoachReply::parse(&raw);
        let spoken = reply.compose();

        self.context
            .push_str(&format!("\nChild: {child_text}\nCoach: {raw}"));
        trim_to_suffix(&mut self.context, self.context_bytes);

        tracing::info!(reply = %spoken, "coach reply");
        Ok(spoken)
    }

    /// Generate one new simple sentence for repeat-after-me practice
    ///
    /// # Errors
    ///
    /// Returns error if the completion request fails
    pub async fn repeat_sentence(&self) -> Result<String> {
        let prompt = "\
You are an English teacher for children aged 6 to 15.

Rules:
- Give ONLY ONE sentence
- Very simple English
- For speaking practice
- Max 10 words
- No emojis
- No explanation

Give a NEW sentence every time.
";

        self.chat
            .complete(&[ChatMessage::user(prompt)], REPEAT_TEMPERATURE)
            .await
    }

    fn coach_prompt(&self, child_text: &str) -> String {
        format!(
            "\
You are an English speaking coach for children aged 6 to 15.

STRICT RULES:
- Always correct the child's sentences.
- If the child says only ONE WORD or a short phrase, convert it into a full correct sentence from the child's input.
- Use very simple English.
- Encourage the child.
- Ask ONE follow-up question.
- No grammar explanations and keep it short.

Respond ONLY in this format:

CORRECT: <correct sentence>
PRAISE: <short encouragement>
QUESTION: <one simple question>

Conversation so far:
{}

Child says:
\"{child_text}\"
",
            self.context
        )
    }
}

/// Trim a string in place to its trailing `budget` bytes on a char boundary
fn trim_to_suffix(s: &mut String, budget: usize) {
    if s.len() <= budget {
        return;
    }

    let mut start = s.len() - budget;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    s.drain(..start);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_well_formed_reply() {
        let raw = "CORRECT: I like apples.\nPRAISE: Good job!\nQUESTION: What fruit do you like?";
        let reply = CoachReply::parse(raw);

        assert_eq!(reply.correct, "I like apples.");
        assert_eq!(reply.praise, "Good job!");
        assert_eq!(reply.question, "What fruit do you like?");
        assert_eq!(
            reply.compose(),
            "I like apples.. Good job! What fruit do you like?"
        );
    }

    #[test]
    fn parse_missing_lines_degrades_to_empty() {
        let reply = CoachReply::parse("PRAISE: Nice try!");

        assert_eq!(reply.correct, "");
        assert_eq!(reply.praise, "Nice try!");
        assert_eq!(reply.question, "");
    }

    #[test]
    fn trim_keeps_most_recent_suffix() {
        let mut s = "abcdefghij".to_string();
        trim_to_suffix(&mut s, 4);
        assert_eq!(s, "ghij");

        let mut short = "ab".to_string();
        trim_to_suffix(&mut short, 4);
        assert_eq!(short, "ab");
    }

    #[test]
    fn trim_budget_counts_bytes_not_chars() {
        // Five two-byte chars against a 6-byte budget keep three chars
        let mut s = "ééééé".to_string();
        trim_to_suffix(&mut s, 6);
        assert_eq!(s, "ééé");
        assert_eq!(s.len(), 6);
    }

    #[test]
    fn trim_respects_char_boundaries() {
        // Each 'é' is two bytes; a mid-char cut must move forward
        let mut s = "ééééé".to_string();
        trim_to_suffix(&mut s, 3);
        assert_eq!(s, "é");
        assert!(s.len() <= 3);
    }
}
