use super::{load_fixture, user_prompt, ProviderTestConfig, ProviderTestSetup, SYSTEM_PROMPT};
use llm_summarizer::{GeminiProvider, LLMProvider};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockBuilder};

pub struct GeminiTestSetup;

impl ProviderTestSetup for GeminiTestSetup {
    fn get_config() -> ProviderTestConfig {
        ProviderTestConfig {
            name: "Gemini",
            model: "gemini-2.0-flash",
        }
    }

    fn create_provider(base_url: &str) -> Arc<dyn LLMProvider> {
        let provider =
            GeminiProvider::new_with_base_url("test-gemini-key".to_string(), base_url.to_string())
                .expect("Failed to create Gemini provider");
        Arc::new(provider)
    }

    fn summarize_request(streaming: bool, text: &str) -> MockBuilder {
        let payload = json!({
            "contents": [{"role": "user", "parts": [{"text": user_prompt(text)}]}],
            "systemInstruction": {"parts": [{"text": SYSTEM_PROMPT}]},
            "generationConfig": {"temperature": 0.7, "topP": 1.0, "maxOutputTokens": 200}
        });

        let builder = Mock::given(method("POST")).and(header("x-goog-api-key", "test-gemini-key"));
        if streaming {
            builder
                .and(path("/v1beta/models/gemini-2.0-flash:streamGenerateContent"))
                .and(query_param("alt", "sse"))
                .and(body_json(payload))
        } else {
            builder
                .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
                .and(body_json(payload))
        }
    }

    fn batch_reply(summary: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": summary}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 31,
                "candidatesTokenCount": 4,
                "totalTokenCount": 35
            }
        })
    }

    fn stream_fixture() -> String {
        load_fixture("gemini/summary_stream.sse")
    }

    fn truncated_fixture() -> String {
        load_fixture("gemini/truncated_stream.sse")
    }
}
