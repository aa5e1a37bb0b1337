pub mod gemini;
pub mod nvidia;
pub mod openrouter;

use llm_summarizer::LLMProvider;
use std::sync::Arc;
use wiremock::MockBuilder;

pub const SYSTEM_PROMPT: &str = "You are a helpful summarizer.";

/// Provider configuration for cross-provider testing
#[derive(Debug, Clone)]
pub struct ProviderTestConfig {
    pub name: &'static str,
    pub model: &'static str,
}

/// Trait for provider-specific test setup
pub trait ProviderTestSetup {
    fn get_config() -> ProviderTestConfig;

    /// Create the provider instance pointed at the mock server
    fn create_provider(base_url: &str) -> Arc<dyn LLMProvider>;

    /// Matcher for exactly one summarize request, payload and credentials included
    fn summarize_request(streaming: bool, text: &str) -> MockBuilder;

    /// Non-streaming reply body carrying `summary`
    fn batch_reply(summary: &str) -> serde_json::Value;

    /// SSE body delivering "The ", "cat ", "sat." then a normal finish
    fn stream_fixture() -> String;

    /// SSE body delivering "Partial " then closing without a finish
    fn truncated_fixture() -> String;
}

/// Load test fixture from file
pub fn load_fixture(relative: &str) -> String {
    let path = format!("{}/tests/cross_provider/fixtures/{relative}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load test fixture: {path}"))
}

pub fn user_prompt(text: &str) -> String {
    format!("Summarize this:\n\n{text}")
}
