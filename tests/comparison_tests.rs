use std::time::Duration;

use llm_compare::{
    ComparatorSettings, ComparisonRequest, CompletionProvider, CompletionResult, GroqClient,
    GroqConfig, HttpClientConfig, LlmError, ModelChoice, ModelParameters, PanelOutcome,
    SamplingSettings, run_comparison,
};
use serde_json::{Value, json};
use wiremock::{
    Match, Mock, MockServer, Request as WiremockRequest, ResponseTemplate,
    matchers::{method, path},
};

#[derive(Clone)]
struct ModelIs(&'static str);

impl Match for ModelIs {
    fn matches(&self, request: &WiremockRequest) -> bool {
        serde_json::from_slice::<Value>(&request.body)
            .map(|body| body["model"] == self.0)
            .unwrap_or(false)
    }
}

#[tokio::test]
async fn completion_echo_round_trips_into_typed_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": "hi there",
            "response_metadata": { "tokens": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = ModelParameters::builder("llama3-8b-8192")
        .temperature(0.5)
        .top_p(0.9)
        .max_tokens(512)
        .system_prompt("You are a helpful AI assistant")
        .user_prompt("Say hi")
        .build()
        .expect("valid parameters");

    let result = client_for(&server)
        .complete(&params)
        .await
        .expect("completion");

    let mut expected_metadata = serde_json::Map::new();
    expected_metadata.insert("tokens".to_string(), json!(2));
    assert_eq!(
        result,
        CompletionResult {
            content: "hi there".to_string(),
            response_metadata: expected_metadata,
        }
    );

    let requests = server.received_requests().await.expect("recorded");
    let body = request_body(&requests[0]);
    assert_eq!(body["model"], "llama3-8b-8192");
    assert_eq!(body["max_tokens"], 512);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "You are a helpful AI assistant");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "Say hi");
}

#[tokio::test]
async fn comparator_sees_literal_braces_from_both_models() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(ModelIs("llama3-8b-8192"))
        .respond_with(normalized("use {weird} here", json!({ "tokens": 4 })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(ModelIs("gemma2-9b-it"))
        .respond_with(chat_completion("gemma2-9b-it", "also {weird}"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(ModelIs("llama3-70b-8192"))
        .respond_with(normalized("Model 1 wins", json!({})))
        .mount(&server)
        .await;

    let request = ComparisonRequest::new(
        ModelChoice::new("LLaMA 8B", "llama3-8b-8192"),
        ModelChoice::new("Gemma 2 9B IT", "gemma2-9b-it"),
        "Show a {placeholder}",
    )
    .with_comparator(ComparatorSettings::new(ModelChoice::new(
        "LLaMA 70B",
        "llama3-70b-8192",
    )));

    let outcome = run_comparison(&client_for(&server), &request).await;

    assert_eq!(outcome.first.result().unwrap().content, "use {weird} here");
    assert_eq!(outcome.second.result().unwrap().content, "also {weird}");
    assert_eq!(
        outcome.comparator.as_ref().unwrap().result().unwrap().content,
        "Model 1 wins"
    );

    let requests = server.received_requests().await.expect("recorded");
    assert_eq!(requests.len(), 3);

    // The compared models get the user's braces verbatim.
    let first = request_body(&requests[0]);
    assert_eq!(first["messages"][1]["content"], "Show a {placeholder}");

    let judge = request_body(&requests[2]);
    assert_eq!(judge["model"], "llama3-70b-8192");
    assert_eq!(judge["temperature"], json!(0.2));
    assert_eq!(judge["max_tokens"], 1024);

    let judge_user = judge["messages"][1]["content"].as_str().unwrap();
    assert!(judge_user.starts_with("Following are the responses from the two models."));
    assert!(judge_user.contains("## Response from Model 1 [LLaMA 8B]:\n use {weird} here\n"));
    assert!(judge_user.contains("## Response from Model 2 [Gemma 2 9B IT]:\n also {weird}\n"));
    assert!(judge_user.contains("{\"tokens\":4}"));
    assert!(!judge_user.contains("{{"));

    let judge_system = judge["messages"][0]["content"].as_str().unwrap();
    assert!(judge_system.contains("Prompt for response generation from LLMs: \nShow a {placeholder}."));
}

#[tokio::test]
async fn partial_results_survive_a_failed_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(ModelIs("llama3-8b-8192"))
        .respond_with(chat_completion("llama3-8b-8192", "Hello!"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(ModelIs("retired-model"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "message": "The model `retired-model` has been decommissioned",
                "type": "invalid_request_error"
            }
        })))
        .mount(&server)
        .await;

    let request = ComparisonRequest::new(
        ModelChoice::new("LLaMA 8B", "llama3-8b-8192"),
        ModelChoice::new("Retired", "retired-model"),
        "Say hi",
    )
    .with_comparator(ComparatorSettings::new(ModelChoice::new(
        "LLaMA 70B",
        "llama3-70b-8192",
    )));

    let outcome = run_comparison(&client_for(&server), &request).await;

    assert_eq!(outcome.first.result().unwrap().content, "Hello!");
    match &outcome.second.outcome {
        PanelOutcome::Failed(LlmError::Provider {
            status_code: Some(404),
            message,
            ..
        }) => assert!(message.contains("decommissioned")),
        other => panic!("Expected 404 Provider failure, got {other:?}"),
    }
    assert!(matches!(
        outcome.comparator.as_ref().unwrap().outcome,
        PanelOutcome::Skipped(_)
    ));

    let requests = server.received_requests().await.expect("recorded");
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn unreachable_provider_fails_every_panel_with_transport_error() {
    let config = GroqConfig::new("test-key")
        .with_base_url("http://127.0.0.1:9/openai/v1")
        .with_http_config(HttpClientConfig {
            timeout: Duration::from_secs(2),
            ..HttpClientConfig::default()
        });
    let client = GroqClient::new(config).expect("client");

    let request = ComparisonRequest::new(
        ModelChoice::new("A", "a"),
        ModelChoice::new("B", "b"),
        "hello",
    )
    .with_sampling(SamplingSettings {
        max_tokens: 1,
        ..SamplingSettings::default()
    });

    let outcome = run_comparison(&client, &request).await;

    for panel in outcome.panels() {
        assert!(
            matches!(panel.outcome, PanelOutcome::Failed(LlmError::Transport { .. })),
            "unexpected outcome for {}: {:?}",
            panel.title,
            panel.outcome
        );
    }
}

fn client_for(server: &MockServer) -> GroqClient {
    let config = GroqConfig::new("test-key")
        .with_base_url(format!("{}/openai/v1", server.uri()))
        .with_http_config(HttpClientConfig {
            timeout: Duration::from_secs(5),
            ..HttpClientConfig::default()
        });
    GroqClient::new(config).expect("client")
}

fn request_body(request: &WiremockRequest) -> Value {
    serde_json::from_slice(&request.body).expect("JSON request body")
}

fn normalized(content: &str, metadata: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "content": content,
        "response_metadata": metadata
    }))
}

fn chat_completion(model: &str, content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12 }
    }))
}
