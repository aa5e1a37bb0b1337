//! Delta accumulation for streamed summaries.

use crate::types::{FinishReason, StreamEvent, Usage};
use crate::{CompleteResponse, Error};

/// Concatenates content deltas in arrival order.
#[derive(Debug, Default)]
pub struct SummaryAccumulator {
    text: String,
    fragments: usize,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
}

impl SummaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the accumulation.
    ///
    /// Returns `Ok(true)` once the provider has signalled the end of its
    /// reply. An in-stream error event is turned into [`Error::Streaming`].
    pub fn process_event(&mut self, event: StreamEvent) -> Result<bool, Error> {
        match event {
            StreamEvent::ContentDelta { delta } => {
                if !delta.is_empty() {
                    self.text.push_str(&delta);
                    self.fragments += 1;
                }
                Ok(false)
            }
            StreamEvent::Done {
                finish_reason,
                usage,
            } => {
                self.finish_reason = Some(finish_reason);
                self.usage = Some(usage);
                Ok(true)
            }
            StreamEvent::Error { error } => Err(Error::streaming(error)),
        }
    }

    /// Text collected so far.
    pub fn current_content(&self) -> &str {
        &self.text
    }

    /// Number of non-empty fragments received.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Finalize and return the complete response.
    pub fn finalize(self) -> CompleteResponse {
        CompleteResponse {
            text: self.text,
            finish_reason: self.finish_reason.unwrap_or_default(),
            usage: self.usage.unwrap_or_default(),
        }
    }
}
