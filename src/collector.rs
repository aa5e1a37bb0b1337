//! Turns raw text into a single summary string through a configured provider.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::accumulator::SummaryAccumulator;
use crate::error::ErrorKind;
use crate::response::EventStream;
use crate::types::{FinishReason, LLMRequest, Prompt, StreamEvent, TransportMode, Usage};
use crate::{Error, LLMProvider};

pub const DEFAULT_MAX_TOKENS: u32 = 200;
pub const DEFAULT_MAX_INPUT_CHARS: usize = 1024;

const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 1.0;

/// What to do with already-collected text when the stream fails midway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialResultPolicy {
    /// Fail the whole request and drop the partial text.
    #[default]
    Discard,
    /// Return the partial text flagged `incomplete`, if any arrived.
    ReturnIncomplete,
}

/// Collector settings.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub model: String,
    pub transport: TransportMode,
    pub default_max_tokens: u32,
    /// Characters forwarded upstream; longer inputs are cut. `None` disables.
    pub max_input_chars: Option<usize>,
    pub partial_policy: PartialResultPolicy,
}

impl CollectorConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            transport: TransportMode::Streaming,
            default_max_tokens: DEFAULT_MAX_TOKENS,
            max_input_chars: Some(DEFAULT_MAX_INPUT_CHARS),
            partial_policy: PartialResultPolicy::Discard,
        }
    }

    pub fn transport(mut self, transport: TransportMode) -> Self {
        self.transport = transport;
        self
    }

    pub fn max_input_chars(mut self, limit: Option<usize>) -> Self {
        self.max_input_chars = limit;
        self
    }

    pub fn partial_policy(mut self, policy: PartialResultPolicy) -> Self {
        self.partial_policy = policy;
        self
    }

    pub fn default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    /// Read the `SUMMARY_*` variables from the environment.
    pub fn from_env(model: impl Into<String>) -> Result<Self, Error> {
        Self::from_vars(model, |key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(model: impl Into<String>, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::new(model);

        if let Some(value) = get("SUMMARY_TRANSPORT") {
            config.transport = match value.as_str() {
                "batch" => TransportMode::Batch,
                "streaming" | "stream" => TransportMode::Streaming,
                _ => {
                    return Err(Error::config(format!(
                        "SUMMARY_TRANSPORT must be 'batch' or 'streaming', got '{value}'"
                    )))
                }
            };
        }

        if let Some(value) = get("SUMMARY_DEFAULT_MAX_TOKENS") {
            config.default_max_tokens = value
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    Error::config(format!(
                        "SUMMARY_DEFAULT_MAX_TOKENS must be a positive integer, got '{value}'"
                    ))
                })?;
        }

        if let Some(value) = get("SUMMARY_MAX_INPUT_CHARS") {
            let limit: usize = value.parse().map_err(|_| {
                Error::config(format!(
                    "SUMMARY_MAX_INPUT_CHARS must be a non-negative integer, got '{value}'"
                ))
            })?;
            config.max_input_chars = (limit > 0).then_some(limit);
        }

        if let Some(value) = get("SUMMARY_PARTIAL_POLICY") {
            config.partial_policy = match value.as_str() {
                "discard" => PartialResultPolicy::Discard,
                "return-incomplete" | "return_incomplete" => PartialResultPolicy::ReturnIncomplete,
                _ => {
                    return Err(Error::config(format!(
                        "SUMMARY_PARTIAL_POLICY must be 'discard' or 'return-incomplete', \
                         got '{value}'"
                    )))
                }
            };
        }

        Ok(config)
    }
}

/// A summarization request as received from a caller.
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl SummarizeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// The collected summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    pub text: String,
    /// Set when the stream failed and the partial text was kept.
    pub incomplete: bool,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

/// Cut `text` to at most `limit` characters. Borrowed when nothing is cut.
pub fn truncate_input(text: &str, limit: usize) -> Cow<'_, str> {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => Cow::Owned(text[..byte_index].to_string()),
        None => Cow::Borrowed(text),
    }
}

/// Pass-through state: forwards events until the first terminal one.
struct PassThrough {
    events: EventStream,
    provider: String,
    text_seen: bool,
    finished: bool,
}

impl PassThrough {
    async fn next(mut self) -> Option<(Result<StreamEvent, Error>, Self)> {
        if self.finished {
            return None;
        }

        let item = match self.events.next().await {
            Some(Ok(StreamEvent::ContentDelta { delta })) => {
                self.text_seen |= !delta.is_empty();
                Ok(StreamEvent::ContentDelta { delta })
            }
            Some(Ok(StreamEvent::Done { .. })) if !self.text_seen => {
                self.finished = true;
                Err(Error::provider(&self.provider, "Provider returned an empty summary"))
            }
            Some(Ok(done @ StreamEvent::Done { .. })) => {
                self.finished = true;
                Ok(done)
            }
            Some(failure) => {
                self.finished = true;
                failure
            }
            None => {
                self.finished = true;
                Err(Error::streaming(format!(
                    "{} closed the stream before completion",
                    self.provider
                )))
            }
        };
        Some((item, self))
    }
}

/// Produces one summary per call through a shared provider.
///
/// Holds no per-request state; clone it or share it behind an `Arc`.
#[derive(Clone)]
pub struct SummaryCollector {
    provider: Arc<dyn LLMProvider>,
    config: CollectorConfig,
}

impl SummaryCollector {
    pub fn new(provider: Arc<dyn LLMProvider>, config: CollectorConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Summarize `request.text`, draining the provider reply completely.
    pub async fn summarize(&self, request: SummarizeRequest) -> Result<SummaryResult, Error> {
        self.summarize_until(request, std::future::pending()).await
    }

    /// Like [`summarize`](Self::summarize), but gives up when `cancel` resolves.
    ///
    /// Cancelling drops the in-flight transport future, which closes the
    /// upstream connection.
    pub async fn summarize_until<F>(
        &self,
        request: SummarizeRequest,
        cancel: F,
    ) -> Result<SummaryResult, Error>
    where
        F: Future<Output = ()>,
    {
        let llm_request = self.prepare(&request, self.config.transport)?;
        let span = tracing::info_span!(
            "summarize",
            request_id = %uuid::Uuid::new_v4(),
            provider = self.provider.name(),
            mode = llm_request.mode.as_str(),
        );

        async move {
            let mut accumulator = SummaryAccumulator::new();
            let outcome = {
                let drain = self.collect(&llm_request, &mut accumulator);
                tokio::pin!(cancel);
                tokio::select! {
                    outcome = drain => outcome,
                    _ = &mut cancel => Err(Error::Cancelled),
                }
            };
            self.finish(accumulator, outcome)
        }
        .instrument(span)
        .await
    }

    /// Validate and open a streaming request without collecting it.
    ///
    /// Used to forward fragments to a caller as they arrive. Errors before
    /// the first byte (validation, non-2xx) are returned here; later ones
    /// appear in the stream. The stream ends with an error item when the
    /// provider closes it before its terminal event or finishes without
    /// any text, so a consumer never mistakes a cut-off reply for a whole one.
    pub async fn summarize_stream(
        &self,
        request: SummarizeRequest,
    ) -> Result<EventStream, Error> {
        let llm_request = self.prepare(&request, TransportMode::Streaming)?;
        tracing::debug!(provider = self.provider.name(), "Opening pass-through stream");
        let events = self.provider.generate(&llm_request).await?.stream();

        let state = PassThrough {
            events,
            provider: self.provider.name().to_string(),
            text_seen: false,
            finished: false,
        };
        Ok(Box::pin(stream::unfold(state, PassThrough::next)))
    }

    /// Validation and truncation. No I/O happens before this succeeds.
    fn prepare(
        &self,
        request: &SummarizeRequest,
        mode: TransportMode,
    ) -> Result<LLMRequest, Error> {
        if request.text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        let max_tokens = match request.max_tokens {
            Some(0) => return Err(Error::invalid_request("max_tokens must be a positive integer")),
            Some(n) => n,
            None => self.config.default_max_tokens,
        };

        let text = match self.config.max_input_chars {
            Some(limit) => truncate_input(&request.text, limit),
            None => Cow::Borrowed(request.text.as_str()),
        };
        if let Cow::Owned(_) = text {
            tracing::info!(
                limit = self.config.max_input_chars,
                original_chars = request.text.chars().count(),
                "Input truncated before sending upstream"
            );
        }

        Ok(LLMRequest::from_prompt(self.config.model.clone(), &Prompt::summarize(&text))
            .temperature(TEMPERATURE)
            .top_p(TOP_P)
            .max_tokens(max_tokens)
            .mode(mode))
    }

    /// Sent → Streaming* → Accumulated (or Failed).
    async fn collect(
        &self,
        request: &LLMRequest,
        accumulator: &mut SummaryAccumulator,
    ) -> Result<(), Error> {
        tracing::debug!(model = %request.model, "Sending request");
        let mut stream = self.provider.generate(request).await?.stream();

        let mut finished = false;
        while let Some(event) = stream.next().await {
            if accumulator.process_event(event?)? {
                finished = true;
                break;
            }
        }

        if !finished {
            return Err(Error::streaming(format!(
                "{} closed the stream before completion",
                self.provider.name()
            )));
        }

        tracing::debug!(fragments = accumulator.fragments(), "Reply drained");
        Ok(())
    }

    /// Apply the result guarantees and the partial-result policy.
    fn finish(
        &self,
        accumulator: SummaryAccumulator,
        outcome: Result<(), Error>,
    ) -> Result<SummaryResult, Error> {
        match outcome {
            Ok(()) => {
                let complete = accumulator.finalize();
                if complete.text.is_empty() {
                    tracing::warn!("Provider returned no summary text");
                    return Err(Error::provider(
                        self.provider.name(),
                        "Provider returned an empty summary",
                    ));
                }
                tracing::info!(
                    chars = complete.text.chars().count(),
                    output_tokens = complete.usage.output_tokens,
                    "Summary collected"
                );
                Ok(SummaryResult {
                    text: complete.text,
                    incomplete: false,
                    finish_reason: complete.finish_reason,
                    usage: complete.usage,
                })
            }
            Err(error) => {
                let keep_partial = self.config.partial_policy
                    == PartialResultPolicy::ReturnIncomplete
                    && !accumulator.is_empty();

                if keep_partial {
                    tracing::warn!(
                        error = %error,
                        fragments = accumulator.fragments(),
                        "Stream failed; returning incomplete summary"
                    );
                    let complete = accumulator.finalize();
                    return Ok(SummaryResult {
                        text: complete.text,
                        incomplete: true,
                        finish_reason: complete.finish_reason,
                        usage: complete.usage,
                    });
                }

                match error.kind() {
                    ErrorKind::Cancelled => tracing::info!("Summarization cancelled"),
                    _ => tracing::error!(error = %error, "Summarization failed"),
                }
                Err(error)
            }
        }
    }
}
