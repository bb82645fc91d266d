//! Anthropic models on Bedrock

use async_trait::async_trait;
use serde::Serialize;

use super::BedrockRuntime;
use crate::config::BedrockSettings;
use crate::error::{DiagramError, Result};
use crate::params::{ChatParams, PromptParams};
use crate::traits::{ProviderAdapter, ProviderKind, RawResponse};

pub const BEDROCK_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct InvokeBody<'a> {
    anthropic_version: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

impl<'a> From<&'a ChatParams> for InvokeBody<'a> {
    fn from(params: &'a ChatParams) -> Self {
        Self {
            anthropic_version: BEDROCK_ANTHROPIC_VERSION,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            system: &params.system,
            messages: [Message {
                role: "user",
                content: &params.user,
            }],
        }
    }
}

/// Text adapter for Claude through Bedrock `InvokeModel`.
#[derive(Debug, Clone)]
pub struct BedrockAnthropicAdapter {
    runtime: BedrockRuntime,
    model: String,
    fallback_model: Option<String>,
}

impl BedrockAnthropicAdapter {
    pub const PROVIDER_ID: &'static str = "bedrock-anthropic";

    pub fn new(settings: &BedrockSettings) -> Result<Self> {
        let http_client = settings.provider.http.build_client()?;
        Ok(Self::with_http_client(settings, http_client))
    }

    pub fn with_http_client(settings: &BedrockSettings, http_client: reqwest::Client) -> Self {
        Self {
            runtime: BedrockRuntime::new(settings, http_client),
            model: settings.text_model.clone(),
            fallback_model: settings.provider.fallback_model.clone(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for BedrockAnthropicAdapter {
    fn provider_id(&self) -> &str {
        Self::PROVIDER_ID
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::TextGeneration
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        self.runtime.is_available()
    }

    fn fallback_model(&self) -> Option<&str> {
        self.fallback_model.as_deref()
    }

    async fn invoke_with_model(&self, params: &PromptParams, model_id: &str) -> Result<RawResponse> {
        let PromptParams::Chat(chat) = params else {
            return Err(DiagramError::transport(
                Self::PROVIDER_ID,
                format!("expected chat parameters, got {}", params.kind_name()),
            ));
        };
        let body = serde_json::to_value(InvokeBody::from(chat))?;
        let json = self
            .runtime
            .invoke_model(Self::PROVIDER_ID, model_id, &body)
            .await?;
        Ok(RawResponse::new(Self::PROVIDER_ID, model_id, json))
    }
}
