#![cfg(feature = "anthropic")]
//! Mock API tests for the Anthropic Messages adapter.

use std::sync::Arc;

use eduvis::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn messages_response(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_01XFDUDYJgAACzvnptvVoYEL",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "model": "claude-3-5-sonnet-20240620",
        "stop_reason": "end_turn",
        "stop_sequence": null,
        "usage": { "input_tokens": 10, "output_tokens": 15 }
    })
}

fn settings(server: &MockServer) -> ProviderSettings {
    let mut settings = ProviderSettings::anthropic_default().with_api_key("test-api-key");
    settings.base_url = server.uri();
    settings
}

fn chat_params() -> PromptParams {
    PromptParams::Chat(PromptBuilder::new().build_diagram_prompt("The Nitrogen Cycle", "bacteria"))
}

#[tokio::test]
async fn messages_request_carries_auth_and_version_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-api-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-5-sonnet-20240620",
            "max_tokens": 4000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_response(
            "Here you go:\n<svg viewBox=\"0 0 800 600\"><circle r=\"4\"/></svg>\nEnjoy!",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = AnthropicAdapter::new(settings(&server)).unwrap();
    let raw = adapter.invoke(&chat_params()).await.unwrap();
    let artifact = eduvis::ArtifactExtractor::default()
        .extract(&raw, ProviderKind::TextGeneration, "The Nitrogen Cycle")
        .unwrap();
    assert_eq!(
        artifact.markup,
        r#"<svg viewBox="0 0 800 600"><circle r="4"/></svg>"#
    );
}

#[tokio::test]
async fn invalid_key_is_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": { "type": "authentication_error", "message": "invalid x-api-key" }
        })))
        .mount(&server)
        .await;

    let adapter = AnthropicAdapter::new(settings(&server)).unwrap();
    let err = adapter.invoke(&chat_params()).await.unwrap_err();
    assert_eq!(err.class(), Some(ErrorClass::AuthFailure));
    assert!(err.to_string().contains("invalid x-api-key"));
}

#[tokio::test]
async fn overloaded_primary_model_falls_back_to_secondary_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(json!({ "model": "claude-3-5-sonnet-20240620" })))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": { "type": "overloaded_error", "message": "Overloaded" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(json!({ "model": "claude-3-opus-20240229" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_response("<svg><rect/></svg>")))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = Arc::new(AnthropicAdapter::new(settings(&server)).unwrap());
    let orchestrator = DiagramOrchestrator::builder()
        .diagram_chain(ProviderChain::new(adapter))
        .build();

    let outcome = orchestrator
        .generate_with_report(&GenerationRequest::new("Tides", ""))
        .await
        .unwrap();
    assert_eq!(outcome.artifact.markup, "<svg><rect/></svg>");
    assert_eq!(outcome.invocations.len(), 2);
    assert_eq!(outcome.invocations[0].model, "claude-3-5-sonnet-20240620");
    assert_eq!(
        outcome.invocations[0].error_class,
        Some(ErrorClass::TransportError)
    );
    assert_eq!(outcome.invocations[1].model, "claude-3-opus-20240229");
}
