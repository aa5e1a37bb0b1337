//! Provider implementations for different LLM services.

pub mod gemini;
pub mod openai;

// Re-export commonly used provider types
pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;

use crate::Error;
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Translate a non-2xx provider response into an [`Error`].
///
/// Both OpenAI-compatible APIs and Gemini wrap failures as
/// `{"error": {"message": ...}}`; anything else is reported verbatim.
pub(crate) async fn error_from_response(provider: &str, response: reqwest::Response) -> Error {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return Error::provider(provider, format!("API error ({status}): {e}")),
    };
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    tracing::warn!(provider, status = %status, "Provider returned an error status");

    if status == StatusCode::TOO_MANY_REQUESTS {
        Error::RateLimit(format!("{provider}: {message}"))
    } else {
        Error::provider(provider, format!("API error ({status}): {message}"))
    }
}
