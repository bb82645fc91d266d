//! Test doubles shared by the integration suites.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use eduvis::prelude::*;
use eduvis::traits::ImageFrame;
use serde_json::{Value, json};

/// 1x1 transparent PNG.
pub const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// What a scripted adapter does when called with a given model.
#[derive(Clone)]
pub enum Step {
    Respond(Value),
    Fail(DiagramError),
    /// Never completes.
    Hang,
    Panic,
}

/// Anthropic-shaped reply carrying `text`.
pub fn text_reply(text: &str) -> Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn"
    })
}

/// Stability-shaped reply with one image.
pub fn image_reply() -> Value {
    json!({ "artifacts": [{ "base64": PNG_1X1, "finishReason": "SUCCESS", "seed": 1 }] })
}

/// Adapter whose answers are fixed per model, with call accounting.
pub struct ScriptedAdapter {
    id: &'static str,
    kind: ProviderKind,
    model: &'static str,
    fallback_model: Option<&'static str>,
    available: bool,
    steps: HashMap<String, Step>,
    calls: AtomicU32,
    seen_models: Mutex<Vec<String>>,
    seen_params: Mutex<Vec<PromptParams>>,
}

impl ScriptedAdapter {
    fn new(id: &'static str, kind: ProviderKind) -> Self {
        Self {
            id,
            kind,
            model: "primary-model",
            fallback_model: None,
            available: true,
            steps: HashMap::new(),
            calls: AtomicU32::new(0),
            seen_models: Mutex::new(Vec::new()),
            seen_params: Mutex::new(Vec::new()),
        }
    }

    pub fn text(id: &'static str) -> Self {
        Self::new(id, ProviderKind::TextGeneration)
    }

    pub fn image(id: &'static str) -> Self {
        Self::new(id, ProviderKind::DiffusionImage)
    }

    pub fn with_fallback_model(mut self, model: &'static str) -> Self {
        self.fallback_model = Some(model);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Behavior for the default model.
    pub fn on_default(self, step: Step) -> Self {
        let model = self.model;
        self.on_model(model, step)
    }

    pub fn on_model(mut self, model: &str, step: Step) -> Self {
        self.steps.insert(model.to_string(), step);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_models(&self) -> Vec<String> {
        self.seen_models.lock().unwrap().clone()
    }

    pub fn seen_params(&self) -> Vec<PromptParams> {
        self.seen_params.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn provider_id(&self) -> &str {
        self.id
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn default_model(&self) -> &str {
        self.model
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn fallback_model(&self) -> Option<&str> {
        self.fallback_model
    }

    async fn invoke_with_model(&self, params: &PromptParams, model_id: &str) -> eduvis::Result<RawResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_models.lock().unwrap().push(model_id.to_string());
        self.seen_params.lock().unwrap().push(params.clone());

        let step = self.steps.get(model_id).cloned().unwrap_or_else(|| {
            Step::Fail(DiagramError::transport(self.id, format!("no script for {model_id}")))
        });
        match step {
            Step::Respond(body) => {
                let raw = RawResponse::new(self.id, model_id, body);
                Ok(match self.kind {
                    ProviderKind::DiffusionImage => raw.with_frame(ImageFrame::new(1024, 768)),
                    ProviderKind::TextGeneration => raw,
                })
            }
            Step::Fail(err) => Err(err),
            Step::Hang => std::future::pending().await,
            Step::Panic => panic!("scripted adapter {} panicked", self.id),
        }
    }
}
