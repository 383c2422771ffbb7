//! Session transcript log
//!
//! The visible conversation log of the voice client: append-only,
//! order-preserving, in-memory for the session lifetime. Each append is
//! delivered to an observer exactly once, in order (the render hook).

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

/// One transcript entry, immutable once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

/// Observer notified of each appended message
pub trait TranscriptObserver: Send {
    fn message_appended(&mut self, message: &Message);
}

/// Prints messages to stdout as they land
#[derive(Debug, Default)]
pub struct StdoutRenderer;

impl TranscriptObserver for StdoutRenderer {
    fn message_appended(&mut self, message: &Message) {
        println!("[{}] {}", message.role.as_str(), message.text);
    }
}

/// Append-only ordered message log
#[derive(Default)]
pub struct TranscriptLog {
    messages: Vec<Message>,
    observer: Option<Box<dyn TranscriptObserver>>,
}

impl TranscriptLog {
    /// Create an empty log with no observer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log that renders each message to stdout
    #[must_use]
    pub fn with_stdout_renderer() -> Self {
        Self::with_observer(Box::new(StdoutRenderer))
    }

    /// Attach an observer that sees every subsequent append
    #[must_use]
    pub fn with_observer(observer: Box<dyn TranscriptObserver>) -> Self {
        Self {
            messages: Vec::new(),
            observer: Some(observer),
        }
    }

    /// Append a message and notify the observer
    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        let message = Message {
            role,
            text: text.into(),
        };
        tracing::debug!(role = message.role.as_str(), text = %message.text, "transcript append");
        if let Some(observer) = &mut self.observer {
            observer.message_appended(&message);
        }
        self.messages.push(message);
    }

    /// All messages in append order
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
