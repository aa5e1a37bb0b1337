use axum::body::Body;
use axum::http::{Request, StatusCode};
use llm_summarizer::server::{create_router, AppState};
use llm_summarizer::{
    CollectorConfig, Error, ErrorKind, FinishReason, PartialResultPolicy, SummarizeRequest,
    SummaryCollector, TransportMode,
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::providers::{
    gemini::GeminiTestSetup, nvidia::NvidiaTestSetup, openrouter::OpenRouterTestSetup,
    ProviderTestSetup,
};

const INPUT: &str = "The cat, after a long day of chasing mice around the barn, finally sat down.";

fn sse(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

fn collector<T: ProviderTestSetup>(
    server: &MockServer,
    config: CollectorConfig,
) -> SummaryCollector {
    SummaryCollector::new(T::create_provider(&server.uri()), config)
}

async fn run_streaming_summary<T: ProviderTestSetup>() {
    let config = T::get_config();
    let mock_server = MockServer::start().await;

    T::summarize_request(true, INPUT)
        .respond_with(sse(T::stream_fixture()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = collector::<T>(&mock_server, CollectorConfig::new(config.model))
        .summarize(SummarizeRequest::new(INPUT))
        .await
        .unwrap_or_else(|e| panic!("{} streaming summary failed: {e}", config.name));

    assert_eq!(result.text, "The cat sat.");
    assert!(!result.incomplete);
    assert_eq!(result.finish_reason, FinishReason::Stop);
    assert_eq!(result.usage.output_tokens, 4);
}

async fn run_batch_summary<T: ProviderTestSetup>() {
    let config = T::get_config();
    let mock_server = MockServer::start().await;

    T::summarize_request(false, INPUT)
        .respond_with(ResponseTemplate::new(200).set_body_json(T::batch_reply("A cat sat down.")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = collector::<T>(
        &mock_server,
        CollectorConfig::new(config.model).transport(TransportMode::Batch),
    )
    .summarize(SummarizeRequest::new(INPUT))
    .await
    .unwrap_or_else(|e| panic!("{} batch summary failed: {e}", config.name));

    assert_eq!(result.text, "A cat sat down.");
    assert!(!result.incomplete);
}

async fn run_truncated_stream<T: ProviderTestSetup>() {
    let config = T::get_config();

    let mock_server = MockServer::start().await;
    T::summarize_request(true, INPUT)
        .respond_with(sse(T::truncated_fixture()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let discard = collector::<T>(&mock_server, CollectorConfig::new(config.model))
        .summarize(SummarizeRequest::new(INPUT))
        .await;
    assert!(
        matches!(discard, Err(Error::Streaming(_))),
        "{}: expected streaming error, got {discard:?}",
        config.name
    );

    let keep = collector::<T>(
        &mock_server,
        CollectorConfig::new(config.model).partial_policy(PartialResultPolicy::ReturnIncomplete),
    )
    .summarize(SummarizeRequest::new(INPUT))
    .await
    .unwrap();
    assert_eq!(keep.text, "Partial ");
    assert!(keep.incomplete);
}

async fn run_error_status<T: ProviderTestSetup>() {
    let config = T::get_config();
    let mock_server = MockServer::start().await;

    T::summarize_request(true, INPUT)
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": {"message": "model overloaded"}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let error = collector::<T>(&mock_server, CollectorConfig::new(config.model))
        .summarize(SummarizeRequest::new(INPUT))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Upstream);
    let message = error.to_string();
    assert!(message.contains("500"), "{}: {message}", config.name);
    assert!(message.contains("model overloaded"), "{}: {message}", config.name);
}

async fn run_rate_limited<T: ProviderTestSetup>() {
    let config = T::get_config();
    let mock_server = MockServer::start().await;

    T::summarize_request(true, INPUT)
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let error = collector::<T>(&mock_server, CollectorConfig::new(config.model))
        .summarize(SummarizeRequest::new(INPUT))
        .await
        .unwrap_err();

    assert!(matches!(error, Error::RateLimit(ref msg) if msg.contains("slow down")));
}

#[tokio::test]
async fn test_nvidia_streaming_summary() {
    run_streaming_summary::<NvidiaTestSetup>().await;
}

#[tokio::test]
async fn test_openrouter_streaming_summary() {
    run_streaming_summary::<OpenRouterTestSetup>().await;
}

#[tokio::test]
async fn test_gemini_streaming_summary() {
    run_streaming_summary::<GeminiTestSetup>().await;
}

#[tokio::test]
async fn test_nvidia_batch_summary() {
    run_batch_summary::<NvidiaTestSetup>().await;
}

#[tokio::test]
async fn test_openrouter_batch_summary() {
    run_batch_summary::<OpenRouterTestSetup>().await;
}

#[tokio::test]
async fn test_gemini_batch_summary() {
    run_batch_summary::<GeminiTestSetup>().await;
}

#[tokio::test]
async fn test_nvidia_truncated_stream() {
    run_truncated_stream::<NvidiaTestSetup>().await;
}

#[tokio::test]
async fn test_gemini_truncated_stream() {
    run_truncated_stream::<GeminiTestSetup>().await;
}

#[tokio::test]
async fn test_nvidia_error_status() {
    run_error_status::<NvidiaTestSetup>().await;
}

#[tokio::test]
async fn test_gemini_error_status() {
    run_error_status::<GeminiTestSetup>().await;
}

#[tokio::test]
async fn test_openrouter_rate_limited() {
    run_rate_limited::<OpenRouterTestSetup>().await;
}

#[tokio::test]
async fn test_input_truncated_before_sending() {
    let mock_server = MockServer::start().await;
    let long_input = "abcdefghijklmnop";

    NvidiaTestSetup::summarize_request(true, "abcdefghij")
        .respond_with(sse(NvidiaTestSetup::stream_fixture()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = collector::<NvidiaTestSetup>(
        &mock_server,
        CollectorConfig::new("openai/gpt-oss-120b").max_input_chars(Some(10)),
    )
    .summarize(SummarizeRequest::new(long_input))
    .await
    .unwrap();

    assert_eq!(result.text, "The cat sat.");
}

#[tokio::test]
async fn test_openrouter_midstream_error_object() {
    let mock_server = MockServer::start().await;

    OpenRouterTestSetup::summarize_request(true, INPUT)
        .respond_with(sse(super::providers::load_fixture("openai/midstream_error.sse")))
        .mount(&mock_server)
        .await;

    let error = collector::<OpenRouterTestSetup>(
        &mock_server,
        CollectorConfig::new("meta-llama/llama-3.1-8b-instruct"),
    )
    .summarize(SummarizeRequest::new(INPUT))
    .await
    .unwrap_err();

    assert!(error.to_string().contains("Upstream provider disconnected"));
}

#[tokio::test]
async fn test_gemini_blocked_prompt() {
    let mock_server = MockServer::start().await;

    GeminiTestSetup::summarize_request(true, INPUT)
        .respond_with(sse(super::providers::load_fixture("gemini/blocked_stream.sse")))
        .mount(&mock_server)
        .await;

    let error = collector::<GeminiTestSetup>(&mock_server, CollectorConfig::new("gemini-2.0-flash"))
        .summarize(SummarizeRequest::new(INPUT))
        .await
        .unwrap_err();

    assert!(matches!(error, Error::ContentFiltered(_)));
}

#[tokio::test]
async fn test_empty_input_makes_no_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let error = collector::<NvidiaTestSetup>(
        &mock_server,
        CollectorConfig::new("openai/gpt-oss-120b"),
    )
    .summarize(SummarizeRequest::new("  \n "))
    .await
    .unwrap_err();

    assert!(matches!(error, Error::EmptyInput));
}

#[tokio::test]
async fn test_http_round_trip() {
    let mock_server = MockServer::start().await;
    NvidiaTestSetup::summarize_request(true, INPUT)
        .respond_with(sse(NvidiaTestSetup::stream_fixture()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let state = AppState::new(collector::<NvidiaTestSetup>(
        &mock_server,
        CollectorConfig::new("openai/gpt-oss-120b"),
    ));
    let app = create_router(state);
    let body = json!({ "text": INPUT }).to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/summarize")
                .header("content-type", "application/json")
                .body(Body::from(body.clone()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json, json!({"summary": "The cat sat."}));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/summarize/stream")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"The cat sat.");
}
