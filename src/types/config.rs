use serde::{Deserialize, Serialize};

use super::message::Message;
use super::prompt::Prompt;

/// How a provider delivers its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// One request, one complete body.
    Batch,
    /// One request answered by a sequence of incremental fragments.
    #[default]
    Streaming,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Batch => "batch",
            TransportMode::Streaming => "streaming",
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Provider-neutral request handed to an [`LLMProvider`](crate::LLMProvider).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub mode: TransportMode,
}

impl LLMRequest {
    /// Build a request for `model` from a prompt, streaming by default.
    pub fn from_prompt(model: impl Into<String>, prompt: &Prompt) -> Self {
        Self {
            model: model.into(),
            messages: prompt.messages().to_vec(),
            temperature: None,
            max_tokens: None,
            top_p: None,
            mode: TransportMode::default(),
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn mode(mut self, mode: TransportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.mode == TransportMode::Streaming
    }
}
