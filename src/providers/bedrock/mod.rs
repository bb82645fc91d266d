//! Amazon Bedrock provider
//!
//! Both Bedrock adapters go through `InvokeModel` at
//! `{endpoint}/model/{model}/invoke`, authenticated with a Bedrock API key sent as a
//! bearer token.

pub mod claude;
pub(crate) mod errors;
pub mod stability;

pub use claude::BedrockAnthropicAdapter;
pub use stability::BedrockStabilityAdapter;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::config::BedrockSettings;
use crate::error::{DiagramError, Result};
use crate::providers::http::{bearer_headers, post_json_classified};

/// Credentials, endpoint and client shared by the Bedrock adapters.
#[derive(Clone)]
pub(crate) struct BedrockRuntime {
    token: Option<SecretString>,
    endpoint: String,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for BedrockRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockRuntime")
            .field("endpoint", &self.endpoint)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl BedrockRuntime {
    pub(crate) fn new(settings: &BedrockSettings, http_client: reqwest::Client) -> Self {
        let provider = &settings.provider;
        let token = provider
            .has_credentials()
            .then(|| provider.api_key.clone())
            .flatten();
        Self {
            token,
            endpoint: provider.base_url.clone(),
            http_client,
        }
    }

    pub(crate) fn is_available(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn invoke_url(&self, model_id: &str) -> String {
        format!(
            "{}/model/{}/invoke",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(model_id)
        )
    }

    pub(crate) async fn invoke_model(
        &self,
        provider_id: &str,
        model_id: &str,
        body: &Value,
    ) -> Result<Value> {
        let Some(token) = &self.token else {
            return Err(DiagramError::auth_failure(
                provider_id,
                "AWS_BEARER_TOKEN_BEDROCK is not configured",
            ));
        };
        let headers = bearer_headers(provider_id, token.expose_secret())?;
        post_json_classified(
            &self.http_client,
            provider_id,
            model_id,
            &self.invoke_url(model_id),
            headers,
            body,
            errors::classify_bedrock_http_error,
        )
        .await
    }
}
