use super::types::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    StreamOptions,
};
use crate::provider::LLMProvider;
use crate::providers::error_from_response;
use crate::sse_stream::{SseEvent, SseStreamExt};
use crate::{CompleteResponse, Error, FinishReason, LLMRequest, Response, StreamEvent, Usage};
use futures_util::{stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const NVIDIA_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Provider for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAIProvider {
    client: Client,
    name: String,
    api_key: String,
    base_url: String,
    extra_headers: HeaderMap,
}

impl std::fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIProvider")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Finish reason and usage seen so far in a chunk stream.
#[derive(Debug, Default)]
struct ChunkState {
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider.
    pub fn new(api_key: String) -> Result<Self, Error> {
        Self::new_with_base_url(api_key, OPENAI_BASE_URL.to_string())
    }

    /// Create a new provider against a custom base URL.
    pub fn new_with_base_url(api_key: String, base_url: String) -> Result<Self, Error> {
        Self::with_timeout(api_key, base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            name: "OpenAI".to_string(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            extra_headers: HeaderMap::new(),
        })
    }

    /// NVIDIA-hosted OpenAI-compatible endpoint.
    pub fn nvidia(api_key: String) -> Result<Self, Error> {
        Ok(Self::new_with_base_url(api_key, NVIDIA_BASE_URL.to_string())?.with_name("NVIDIA"))
    }

    /// OpenRouter endpoint.
    pub fn openrouter(api_key: String) -> Result<Self, Error> {
        let provider = Self::new_with_base_url(api_key, OPENROUTER_BASE_URL.to_string())?;
        Ok(provider.with_name("OpenRouter"))
    }

    /// Override the display name used in logs and errors.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Send an extra header with every request (e.g. OpenRouter's `X-Title`).
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::config(format!("Invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| Error::config(format!("Invalid value for header '{name}': {e}")))?;
        self.extra_headers.insert(header_name, header_value);
        Ok(self)
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Convert internal request to Chat Completions format.
    fn convert_request(&self, request: &LLMRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|msg| ChatMessage {
                    role: msg.role.as_str().to_string(),
                    content: msg.content.clone(),
                })
                .collect(),
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
            stream: request.is_streaming(),
            stream_options: request.is_streaming().then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }

    fn map_finish_reason(provider: &str, reason: &str) -> Result<FinishReason, Error> {
        match reason {
            "length" => Ok(FinishReason::Length),
            "content_filter" => Err(Error::content_filtered(format!(
                "{provider} stopped generation (content_filter)"
            ))),
            _ => Ok(FinishReason::Stop),
        }
    }

    fn convert_complete(
        provider: &str,
        body: ChatCompletionResponse,
    ) -> Result<CompleteResponse, Error> {
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::provider(provider, "Response contained no choices"))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some(reason) => Self::map_finish_reason(provider, reason)?,
            None => FinishReason::Stop,
        };

        Ok(CompleteResponse {
            text: choice.message.content.unwrap_or_default(),
            finish_reason,
            usage: body.usage.map(Usage::from).unwrap_or_default(),
        })
    }

    /// Convert one SSE event into zero or more stream events.
    fn convert_sse_event(
        provider: &str,
        sse_result: Result<SseEvent, Error>,
        state: &mut ChunkState,
    ) -> Vec<Result<StreamEvent, Error>> {
        let sse_event = match sse_result {
            Ok(event) => event,
            Err(e) => return vec![Err(e)],
        };

        if sse_event.is_done() {
            return vec![Ok(StreamEvent::Done {
                finish_reason: state.finish_reason.take().unwrap_or_default(),
                usage: state.usage.take().unwrap_or_default(),
            })];
        }

        let chunk = match serde_json::from_str::<ChatCompletionChunk>(&sse_event.data) {
            Ok(chunk) => chunk,
            Err(e) => {
                return vec![Err(Error::streaming(format!(
                    "Malformed chunk from {provider}: {e}"
                )))]
            }
        };

        if let Some(error) = chunk.error {
            return vec![Err(Error::provider(provider, error.message))];
        }
        if let Some(usage) = chunk.usage {
            state.usage = Some(usage.into());
        }

        let mut events = Vec::new();
        if let Some(choice) = chunk.choices.into_iter().next() {
            if let Some(delta) = choice.delta.content.filter(|d| !d.is_empty()) {
                events.push(Ok(StreamEvent::ContentDelta { delta }));
            }
            if let Some(reason) = choice.finish_reason {
                match Self::map_finish_reason(provider, &reason) {
                    Ok(finish_reason) => state.finish_reason = Some(finish_reason),
                    Err(e) => events.push(Err(e)),
                }
            }
        }
        events
    }
}

#[async_trait::async_trait]
impl LLMProvider for OpenAIProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &LLMRequest) -> Result<Response, Error> {
        let body = self.convert_request(request);

        tracing::debug!(
            provider = %self.name,
            model = %body.model,
            stream = body.stream,
            "Calling chat completions"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .headers(self.extra_headers.clone())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(&self.name, response).await);
        }

        if !body.stream {
            let complete = response.json::<ChatCompletionResponse>().await?;
            return Ok(Response::from_complete(Self::convert_complete(&self.name, complete)?));
        }

        let provider = self.name.clone();
        let mut state = ChunkState::default();
        let event_stream = response
            .bytes_stream()
            .sse_events()
            .map(move |sse_result| Self::convert_sse_event(&provider, sse_result, &mut state))
            .map(stream::iter)
            .flatten();

        Ok(Response::from_stream(event_stream))
    }
}
