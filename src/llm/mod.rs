//! LLM integration
//!
//! Chat completions go to an OpenAI-compatible endpoint (the original
//! deployment used Groq). The coach wraps the raw client with the
//! speaking-coach prompt and reply parsing.

mod client;
mod coach;

pub use client::{ChatClient, ChatMessage};
pub use coach::{Coach, CoachReply};
