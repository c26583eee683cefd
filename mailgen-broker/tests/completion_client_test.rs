//! Chat-completion client tests against a mock provider

use mailgen_broker::{generate, BrokerError, CompletionApi, CompletionConfig, HttpCompletionClient};
use mailgen_core::CompletionRequest;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpCompletionClient {
    HttpCompletionClient::new(CompletionConfig {
        url: format!("{}/openai/v1/chat/completions", server.uri()),
        model: "llama-3.1-8b-instant".to_string(),
        api_key: "gsk_test".to_string(),
    })
}

/// Test: the request is authorized and carries the model and prompt
#[tokio::test]
async fn test_generate_through_http_client() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer gsk_test"))
        .and(body_partial_json(json!({
            "model": "llama-3.1-8b-instant",
            "max_tokens": 600,
            "messages": [{ "role": "user", "content": "Draft a reminder" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Subject: Reminder\n\nDon't forget." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = generate(&client_for(&server), "Draft a reminder").await.unwrap();

    assert_eq!(text, "Subject: Reminder\n\nDon't forget.");
}

/// Test: a non-success status becomes an upstream error with the payload
#[tokio::test]
async fn test_completion_error_status() {
    let server = MockServer::start().await;
    let payload = json!({
        "error": { "message": "Invalid API Key", "type": "invalid_request_error" }
    });

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(payload.clone()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = CompletionRequest::for_prompt(client.model(), "Hi");
    let err = client.complete(&request).await.unwrap_err();

    match err {
        BrokerError::Upstream { message, details } => {
            assert_eq!(message, "Invalid API Key");
            assert_eq!(details, payload);
        }
        other => panic!("Expected upstream error, got {:?}", other),
    }
}

/// Test: a plain-text error body falls back to a status message
#[tokio::test]
async fn test_completion_error_plain_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = CompletionRequest::for_prompt(client.model(), "Hi");
    let err = client.complete(&request).await.unwrap_err();

    match err {
        BrokerError::Upstream { message, details } => {
            assert!(message.starts_with("Completion API error"));
            assert_eq!(details, json!("Bad Gateway"));
        }
        other => panic!("Expected upstream error, got {:?}", other),
    }
}

/// Test: a success status with a non-JSON body is an unrecognized shape
#[tokio::test]
async fn test_completion_non_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = generate(&client_for(&server), "Hi").await.unwrap_err();

    match err {
        BrokerError::UnrecognizedResponseShape(payload) => {
            assert_eq!(payload, json!("<html>oops</html>"));
        }
        other => panic!("Expected unrecognized shape, got {:?}", other),
    }
}

/// Test: a JSON payload of an unknown schema is rejected
#[tokio::test]
async fn test_completion_unknown_schema() {
    let server = MockServer::start().await;
    let payload = json!({ "generated": "text" });

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .mount(&server)
        .await;

    let err = generate(&client_for(&server), "Hi").await.unwrap_err();

    assert!(matches!(err, BrokerError::UnrecognizedResponseShape(p) if p == payload));
}
