//! Response handling for LLM generations.

use crate::{Error, FinishReason, StreamEvent, Usage};
use futures_util::stream::{self, Stream};
use std::pin::Pin;

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, Error>> + Send>>;

/// A complete reply from an LLM provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteResponse {
    pub text: String,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

/// A provider reply as a lazy, finite, non-restartable event sequence.
pub struct Response {
    stream: EventStream,
}

impl Response {
    /// Create a new response from a stream of events.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<StreamEvent, Error>> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream),
        }
    }

    /// Wrap a complete batch body as a single-delta response.
    pub fn from_complete(complete: CompleteResponse) -> Self {
        let mut events = Vec::with_capacity(2);
        if !complete.text.is_empty() {
            events.push(Ok(StreamEvent::delta(complete.text)));
        }
        events.push(Ok(StreamEvent::Done {
            finish_reason: complete.finish_reason,
            usage: complete.usage,
        }));
        Self::from_stream(stream::iter(events))
    }

    /// Stream the response events.
    pub fn stream(self) -> EventStream {
        self.stream
    }
}
