//! The JSON contract served to the chat layer.

mod support;

use std::sync::Arc;

use eduvis::prelude::*;
use serde_json::json;
use support::{ScriptedAdapter, Step, text_reply};

#[tokio::test]
async fn camel_case_body_round_trips_through_handle() {
    let adapter = Arc::new(
        ScriptedAdapter::text("anthropic").on_default(Step::Respond(text_reply("<svg><g/></svg>"))),
    );
    let orchestrator = DiagramOrchestrator::builder()
        .illustration_chain(ProviderChain::new(adapter.clone()))
        .build();

    let body: DiagramRequestBody = serde_json::from_value(json!({
        "subjectHint": "Biology 101",
        "topic": "Osmosis",
        "context": "water crosses a membrane",
        "family": "illustration"
    }))
    .unwrap();
    assert_eq!(body.family, ArtifactFamily::Illustration);

    let response = orchestrator.handle(body).await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({ "status": "success", "markup": "<svg><g/></svg>" })
    );
    assert_eq!(adapter.calls(), 1);
}

#[tokio::test]
async fn degraded_runs_still_report_success() {
    let orchestrator = DiagramOrchestrator::builder()
        .random(RandomSource::Seeded(2))
        .build();
    let body: DiagramRequestBody =
        serde_json::from_value(json!({ "topic": "Black Holes" })).unwrap();

    let response = orchestrator.handle(body).await;
    assert_eq!(response.status, ResponseStatus::Success);
    assert!(response.markup.starts_with("<svg"));
}

#[tokio::test]
async fn blank_topic_reports_error_status() {
    let orchestrator = DiagramOrchestrator::builder().build();
    let body: DiagramRequestBody =
        serde_json::from_value(json!({ "subjectHint": "Physics", "topic": "  " })).unwrap();

    let response = orchestrator.handle(body).await;
    assert_eq!(response.status, ResponseStatus::Error);
    assert!(response.markup.contains("topic must not be empty"));
    assert_eq!(serde_json::to_value(&response).unwrap()["status"], "error");
}

#[test]
fn missing_topic_does_not_deserialize() {
    let parsed = serde_json::from_value::<DiagramRequestBody>(json!({ "context": "x" }));
    assert!(parsed.is_err());
}
