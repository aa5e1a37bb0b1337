use futures_util::{stream, StreamExt};
use reqwest::Client;
use std::time::Duration;

use super::types::*;
use crate::provider::LLMProvider;
use crate::providers::error_from_response;
use crate::sse_stream::{SseEvent, SseStreamExt};
use crate::types::{FinishReason, Role, Usage};
use crate::{CompleteResponse, Error, LLMRequest, Response, StreamEvent};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const PROVIDER: &str = "Gemini";

/// Finish reasons that mean the reply was withheld.
const BLOCKED_FINISH_REASONS: &[&str] =
    &["SAFETY", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII", "RECITATION"];

/// Gemini provider using the public Generative Language API.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Text, finish reason and usage carried by one response payload.
#[derive(Debug, Default, PartialEq)]
struct Extracted {
    text: String,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Result<Self, Error> {
        Self::new_with_base_url(api_key, GEMINI_BASE_URL.to_string())
    }

    /// Create a new Gemini provider with custom base URL (for testing).
    pub fn new_with_base_url(api_key: String, base_url: String) -> Result<Self, Error> {
        Self::with_timeout(api_key, base_url, Duration::from_secs(60))
    }

    pub fn with_timeout(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The API key goes in a header, so the URL is safe to log.
    fn endpoint(&self, stream: bool, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        if stream {
            format!(
                "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
                self.base_url, model
            )
        } else {
            format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
        }
    }

    /// Convert internal request to Gemini format.
    fn convert_request(request: &LLMRequest) -> GeminiRequest {
        let mut contents = Vec::new();
        let mut system_parts = Vec::new();

        for msg in &request.messages {
            let role = match msg.role {
                Role::System => {
                    system_parts.push(GeminiPart::text(msg.content.clone()));
                    continue;
                }
                Role::User => "user",
            };
            contents.push(GeminiContent {
                role: Some(role.to_string()),
                parts: vec![GeminiPart::text(msg.content.clone())],
            });
        }

        let system_instruction = (!system_parts.is_empty()).then(|| GeminiContent {
            role: None,
            parts: system_parts,
        });

        let generation_config = Some(GenerationConfig {
            temperature: request.temperature,
            top_p: request.top_p,
            max_output_tokens: request.max_tokens,
        });

        GeminiRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    /// Pull the answer text out of a payload, rejecting blocked content.
    fn extract(response: GeminiResponse) -> Result<Extracted, Error> {
        if let Some(error) = response.error {
            return Err(Error::provider(PROVIDER, error.message));
        }
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(Error::content_filtered(format!(
                "Gemini blocked the prompt ({reason})"
            )));
        }

        let mut extracted = Extracted {
            usage: response.usage_metadata.map(Usage::from),
            ..Default::default()
        };

        if let Some(candidate) = response.candidates.into_iter().next() {
            for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
                if part.thought == Some(true) {
                    continue;
                }
                if let Some(text) = part.text {
                    extracted.text.push_str(&text);
                }
            }

            extracted.finish_reason = match candidate.finish_reason.as_deref() {
                None | Some("FINISH_REASON_UNSPECIFIED") => None,
                Some("MAX_TOKENS") => Some(FinishReason::Length),
                Some(reason) if BLOCKED_FINISH_REASONS.contains(&reason) => {
                    return Err(Error::content_filtered(format!(
                        "Gemini stopped generation ({reason})"
                    )));
                }
                Some(_) => Some(FinishReason::Stop),
            };
        }

        Ok(extracted)
    }

    fn convert_sse_event(sse_result: Result<SseEvent, Error>) -> Vec<Result<StreamEvent, Error>> {
        let sse_event = match sse_result {
            Ok(event) => event,
            Err(e) => return vec![Err(e)],
        };
        let data = sse_event.data.trim();
        if data.is_empty() || sse_event.is_done() {
            return vec![];
        }

        let extracted = match serde_json::from_str::<GeminiResponse>(data) {
            Ok(response) => Self::extract(response),
            Err(e) => Err(Error::streaming(format!("Malformed chunk from Gemini: {e}"))),
        };

        match extracted {
            Ok(extracted) => {
                let mut events = Vec::new();
                if !extracted.text.is_empty() {
                    events.push(Ok(StreamEvent::ContentDelta {
                        delta: extracted.text,
                    }));
                }
                if let Some(finish_reason) = extracted.finish_reason {
                    events.push(Ok(StreamEvent::Done {
                        finish_reason,
                        usage: extracted.usage.unwrap_or_default(),
                    }));
                }
                events
            }
            Err(e) => vec![Err(e)],
        }
    }
}

#[async_trait::async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(&self, request: &LLMRequest) -> Result<Response, Error> {
        let body = Self::convert_request(request);
        let streaming = request.is_streaming();
        let endpoint = self.endpoint(streaming, &request.model);

        tracing::debug!(provider = PROVIDER, endpoint = %endpoint, "Calling Gemini");

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(PROVIDER, response).await);
        }

        if !streaming {
            let extracted = Self::extract(response.json::<GeminiResponse>().await?)?;
            return Ok(Response::from_complete(CompleteResponse {
                text: extracted.text,
                finish_reason: extracted.finish_reason.unwrap_or_default(),
                usage: extracted.usage.unwrap_or_default(),
            }));
        }

        let event_stream = response
            .bytes_stream()
            .sse_events()
            .map(Self::convert_sse_event)
            .map(stream::iter)
            .flatten();

        Ok(Response::from_stream(event_stream))
    }
}
