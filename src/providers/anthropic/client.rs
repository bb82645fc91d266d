//! Anthropic Messages API adapter

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::ProviderSettings;
use crate::error::{DiagramError, Result};
use crate::params::{ChatParams, PromptParams};
use crate::providers::http::{insert_header, json_headers, post_json};
use crate::traits::{ProviderAdapter, ProviderKind, RawResponse};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

impl<'a> MessagesBody<'a> {
    fn new(params: &'a ChatParams, model: &'a str) -> Self {
        Self {
            model,
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

/// Text adapter that asks Claude for inline SVG.
#[derive(Clone)]
pub struct AnthropicAdapter {
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    fallback_model: Option<String>,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicAdapter")
            .field("provider_name", &Self::PROVIDER_ID)
            .field("model", &self.model)
            .field("fallback_model", &self.fallback_model)
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl AnthropicAdapter {
    pub const PROVIDER_ID: &'static str = "anthropic";

    pub fn new(settings: ProviderSettings) -> Result<Self> {
        let http_client = settings.http.build_client()?;
        Ok(Self::with_http_client(settings, http_client))
    }

    pub fn with_http_client(settings: ProviderSettings, http_client: reqwest::Client) -> Self {
        let api_key = settings
            .has_credentials()
            .then_some(settings.api_key)
            .flatten();
        Self {
            api_key,
            base_url: settings.base_url,
            model: settings.model,
            fallback_model: settings.fallback_model,
            http_client,
        }
    }

    fn build_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
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
        self.api_key.is_some()
    }

    fn fallback_model(&self) -> Option<&str> {
        self.fallback_model.as_deref()
    }

    async fn invoke_with_model(&self, params: &PromptParams, model_id: &str) -> Result<RawResponse> {
        let Some(api_key) = &self.api_key else {
            return Err(DiagramError::auth_failure(
                Self::PROVIDER_ID,
                "ANTHROPIC_API_KEY is not configured",
            ));
        };
        let PromptParams::Chat(chat) = params else {
            return Err(DiagramError::transport(
                Self::PROVIDER_ID,
                format!("expected chat parameters, got {}", params.kind_name()),
            ));
        };

        let mut headers = json_headers();
        insert_header(&mut headers, Self::PROVIDER_ID, "x-api-key", api_key.expose_secret())?;
        insert_header(&mut headers, Self::PROVIDER_ID, "anthropic-version", ANTHROPIC_VERSION)?;

        let body = serde_json::to_value(MessagesBody::new(chat, model_id))?;
        let json = post_json(
            &self.http_client,
            Self::PROVIDER_ID,
            model_id,
            &self.build_url(),
            headers,
            &body,
        )
        .await?;

        Ok(RawResponse::new(Self::PROVIDER_ID, model_id, json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use crate::params::PromptBuilder;

    #[test]
    fn body_carries_system_and_single_user_turn() {
        let params = PromptBuilder::new().build_diagram_prompt("Mitosis", "");
        let body = serde_json::to_value(MessagesBody::new(&params, "claude-3-5-sonnet-20240620")).unwrap();
        assert_eq!(body["model"], "claude-3-5-sonnet-20240620");
        assert_eq!(body["max_tokens"], 4000);
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(body["messages"][0]["content"].as_str().unwrap().contains("Mitosis"));
        assert!(body["system"].as_str().unwrap().contains("SVG"));
    }

    #[test]
    fn default_settings_expose_fallback_model() {
        let adapter = AnthropicAdapter::with_http_client(
            ProviderSettings::anthropic_default().with_api_key("sk-ant-test"),
            reqwest::Client::new(),
        );
        assert!(adapter.is_available());
        assert!(adapter.supports_fallback_model());
        assert_eq!(adapter.fallback_model(), Some("claude-3-opus-20240229"));
        assert_eq!(adapter.build_url(), "https://api.anthropic.com/v1/messages");
    }

    #[tokio::test]
    async fn disabled_adapter_is_unavailable() {
        let adapter = AnthropicAdapter::with_http_client(
            ProviderSettings::anthropic_default()
                .with_api_key("sk-ant-test")
                .disabled(),
            reqwest::Client::new(),
        );
        assert!(!adapter.is_available());
        let params = PromptParams::Chat(PromptBuilder::new().build_diagram_prompt("x", ""));
        let err = adapter.invoke(&params).await.unwrap_err();
        assert_eq!(err.class(), Some(ErrorClass::AuthFailure));
    }
}
