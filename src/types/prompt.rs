use super::message::Message;

/// An ordered list of messages sent to the provider.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    messages: Vec<Message>,
}

impl Prompt {
    /// Create a prompt with a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(content)],
        }
    }

    /// Create a prompt with a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(content)],
        }
    }

    pub fn with_user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    /// Build the summarization prompt for `text`.
    pub fn summarize(text: &str) -> Self {
        Self::system("You are a helpful summarizer.")
            .with_user(format!("Summarize this:\n\n{text}"))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

impl From<&str> for Prompt {
    fn from(s: &str) -> Self {
        Prompt::user(s)
    }
}

impl From<String> for Prompt {
    fn from(s: String) -> Self {
        Prompt::user(s)
    }
}
