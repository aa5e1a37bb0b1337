use super::{load_fixture, user_prompt, ProviderTestConfig, ProviderTestSetup, SYSTEM_PROMPT};
use llm_summarizer::{LLMProvider, OpenAIProvider};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockBuilder};

const MODEL: &str = "meta-llama/llama-3.1-8b-instruct";

pub struct OpenRouterTestSetup;

impl ProviderTestSetup for OpenRouterTestSetup {
    fn get_config() -> ProviderTestConfig {
        ProviderTestConfig {
            name: "OpenRouter",
            model: MODEL,
        }
    }

    fn create_provider(base_url: &str) -> Arc<dyn LLMProvider> {
        let provider =
            OpenAIProvider::new_with_base_url("sk-or-test-key".to_string(), base_url.to_string())
                .and_then(|p| {
                    p.with_name("OpenRouter")
                        .with_header("HTTP-Referer", "https://summarizer.example")
                })
                .and_then(|p| p.with_header("X-Title", "Summarizer"))
            .expect("Failed to create OpenRouter provider");
        Arc::new(provider)
    }

    fn summarize_request(streaming: bool, text: &str) -> MockBuilder {
        let mut payload = json!({
            "model": MODEL,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt(text)}
            ],
            "temperature": 0.7,
            "top_p": 1.0,
            "max_tokens": 200,
            "stream": streaming
        });
        if streaming {
            payload["stream_options"] = json!({"include_usage": true});
        }

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-or-test-key"))
            .and(header("http-referer", "https://summarizer.example"))
            .and(header("x-title", "Summarizer"))
            .and(body_json(payload))
    }

    fn batch_reply(summary: &str) -> serde_json::Value {
        json!({
            "id": "gen-batch",
            "model": MODEL,
            "choices": [{
                "message": {"role": "assistant", "content": summary},
                "finish_reason": "stop"
            }]
        })
    }

    fn stream_fixture() -> String {
        load_fixture("openai/summary_stream.sse")
    }

    fn truncated_fixture() -> String {
        load_fixture("openai/truncated_stream.sse")
    }
}
