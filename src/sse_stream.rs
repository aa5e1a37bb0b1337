//! Server-Sent Events decoding over a byte stream.

use crate::Error;
use futures_util::{Stream, StreamExt};
use memchr::memmem;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Upper bound on bytes buffered while waiting for an event terminator.
const MAX_BUFFER_BYTES: usize = 1_000_000;

/// A Server-Sent Events (SSE) event.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    pub event_type: Option<String>,
    pub data: String,
    pub id: Option<String>,
}

impl SseEvent {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            event_type: None,
            data: data.into(),
            id: None,
        }
    }

    /// The `[DONE]` sentinel OpenAI-compatible APIs send last.
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }
}

/// Parses SSE events out of a byte stream, holding partial events
/// (and partial UTF-8 sequences) across chunk boundaries.
pub struct SseStream<S> {
    inner: S,
    buffer: Vec<u8>,
    events: VecDeque<SseEvent>,
    lf: memmem::Finder<'static>,
    crlf: memmem::Finder<'static>,
}

impl<S> SseStream<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            events: VecDeque::new(),
            lf: memmem::Finder::new(b"\n\n"),
            crlf: memmem::Finder::new(b"\r\n\r\n"),
        }
    }

    /// Position and length of the earliest event terminator in `haystack`.
    fn next_terminator(&self, haystack: &[u8]) -> Option<(usize, usize)> {
        let lf = self.lf.find(haystack).map(|pos| (pos, 2));
        let crlf = self.crlf.find(haystack).map(|pos| (pos, 4));
        match (lf, crlf) {
            (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
            (a, b) => a.or(b),
        }
    }

    fn drain_complete_events(&mut self) -> Result<(), Error> {
        let mut start = 0;

        while let Some((pos, len)) = self.next_terminator(&self.buffer[start..]) {
            let end = start + pos;
            let text = std::str::from_utf8(&self.buffer[start..end])
                .map_err(|e| Error::streaming(format!("Invalid UTF-8 in SSE event: {e}")))?;

            if let Some(event) = parse_event(text) {
                self.events.push_back(event);
            }
            start = end + len;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }
        Ok(())
    }
}

/// Parse one event block. Returns `None` when it carries no `data` field.
fn parse_event(block: &str) -> Option<SseEvent> {
    let block = block.strip_prefix('\u{feff}').unwrap_or(block);
    let mut event_type = None;
    let mut id = None;
    let mut data: Option<String> = None;

    for line in block.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);

        match field {
            "data" => match data.as_mut() {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(value);
                }
                None => data = Some(value.to_string()),
            },
            "event" => event_type = Some(value.to_string()),
            "id" => id = Some(value.to_string()),
            _ => {}
        }
    }

    data.map(|data| SseEvent {
        event_type,
        data,
        id,
    })
}

impl<S, E> Stream for SseStream<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    type Item = Result<SseEvent, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }

            match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => {
                    self.buffer.extend_from_slice(&chunk);
                    if let Err(e) = self.drain_complete_events() {
                        return Poll::Ready(Some(Err(e)));
                    }
                    // Only the unterminated remainder counts against the cap.
                    if self.buffer.len() > MAX_BUFFER_BYTES {
                        self.buffer.clear();
                        self.events.clear();
                        return Poll::Ready(Some(Err(Error::streaming(
                            "SSE buffer exceeded maximum size",
                        ))));
                    }
                }
                Some(Err(e)) => {
                    return Poll::Ready(Some(Err(Error::streaming(format!(
                        "Stream error: {e}"
                    )))));
                }
                None => {
                    // The last event may arrive without its blank-line terminator.
                    let tail = std::mem::take(&mut self.buffer);
                    let event = std::str::from_utf8(&tail)
                        .ok()
                        .map(str::trim)
                        .filter(|text| !text.is_empty())
                        .and_then(parse_event);
                    if event.is_none() && !tail.is_empty() {
                        tracing::debug!(bytes = tail.len(), "Dropping unterminated SSE tail");
                    }
                    return Poll::Ready(event.map(Ok));
                }
            }
        }
    }
}

/// Extension trait to add SSE parsing to byte streams.
pub trait SseStreamExt: Stream {
    fn sse_events(self) -> SseStream<Self>
    where
        Self: Sized,
    {
        SseStream::new(self)
    }
}

impl<S: Stream> SseStreamExt for S {}
