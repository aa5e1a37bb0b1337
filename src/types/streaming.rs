//! Types for streaming responses.

use serde::{Deserialize, Serialize};

use crate::types::Usage;

/// Events emitted while a provider reply is being delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A fragment of generated text.
    ContentDelta { delta: String },
    /// The provider reported the end of its reply.
    Done {
        finish_reason: FinishReason,
        usage: Usage,
    },
    /// The provider reported a failure inside the stream.
    Error { error: String },
}

impl StreamEvent {
    pub fn delta(text: impl Into<String>) -> Self {
        StreamEvent::ContentDelta { delta: text.into() }
    }
}

/// Reason why generation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    #[default]
    Stop,
    Length,
    ContentFilter,
}
