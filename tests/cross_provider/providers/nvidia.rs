use super::{load_fixture, user_prompt, ProviderTestConfig, ProviderTestSetup, SYSTEM_PROMPT};
use llm_summarizer::{LLMProvider, OpenAIProvider};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockBuilder};

const MODEL: &str = "openai/gpt-oss-120b";

pub struct NvidiaTestSetup;

impl ProviderTestSetup for NvidiaTestSetup {
    fn get_config() -> ProviderTestConfig {
        ProviderTestConfig {
            name: "NVIDIA",
            model: MODEL,
        }
    }

    fn create_provider(base_url: &str) -> Arc<dyn LLMProvider> {
        let provider =
            OpenAIProvider::new_with_base_url("nvapi-test-key".to_string(), base_url.to_string())
                .expect("Failed to create NVIDIA provider")
                .with_name("NVIDIA");
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
            .and(header("authorization", "Bearer nvapi-test-key"))
            .and(body_json(payload))
    }

    fn batch_reply(summary: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-batch",
            "object": "chat.completion",
            "model": MODEL,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": summary},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 31, "completion_tokens": 4, "total_tokens": 35}
        })
    }

    fn stream_fixture() -> String {
        load_fixture("openai/summary_stream.sse")
    }

    fn truncated_fixture() -> String {
        load_fixture("openai/truncated_stream.sse")
    }
}
