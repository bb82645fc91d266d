//! `OpenAI` image adapter
//!
//! Calls the Images API with `response_format=b64_json` so the picture arrives in
//! the same response as the metadata.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::ProviderSettings;
use crate::error::{DiagramError, Result};
use crate::params::{ImageGenParams, PromptParams};
use crate::providers::http::{bearer_headers, post_json};
use crate::traits::{ImageFrame, ProviderAdapter, ProviderKind, RawResponse};

/// Square frame returned by the Images API for the size we request.
pub const OPENAI_IMAGE_FRAME: ImageFrame = ImageFrame::new(1024, 1024);
const OPENAI_IMAGE_SIZE: &str = "1024x1024";

#[derive(Debug, Serialize)]
struct ImageGenerationBody<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    quality: &'a str,
    response_format: &'a str,
}

/// Diffusion adapter for `POST {base}/images/generations`.
#[derive(Clone)]
pub struct OpenAiImageAdapter {
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    fallback_model: Option<String>,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiImageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiImageAdapter")
            .field("provider_name", &Self::PROVIDER_ID)
            .field("model", &self.model)
            .field("fallback_model", &self.fallback_model)
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl OpenAiImageAdapter {
    pub const PROVIDER_ID: &'static str = "openai";

    /// Build the adapter and its HTTP client from settings.
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
        format!("{}/images/generations", self.base_url.trim_end_matches('/'))
    }

    fn build_body(params: &ImageGenParams, model: &str) -> Result<serde_json::Value> {
        let body = ImageGenerationBody {
            model,
            prompt: &params.prompt,
            n: 1,
            size: OPENAI_IMAGE_SIZE,
            quality: &params.quality,
            response_format: "b64_json",
        };
        Ok(serde_json::to_value(body)?)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiImageAdapter {
    fn provider_id(&self) -> &str {
        Self::PROVIDER_ID
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::DiffusionImage
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
                "OPENAI_API_KEY is not configured",
            ));
        };
        let PromptParams::Image(image) = params else {
            return Err(DiagramError::transport(
                Self::PROVIDER_ID,
                format!("expected image parameters, got {}", params.kind_name()),
            ));
        };

        let headers = bearer_headers(Self::PROVIDER_ID, api_key.expose_secret())?;
        let body = Self::build_body(image, model_id)?;
        let json = post_json(
            &self.http_client,
            Self::PROVIDER_ID,
            model_id,
            &self.build_url(),
            headers,
            &body,
        )
        .await?;

        Ok(RawResponse::new(Self::PROVIDER_ID, model_id, json).with_frame(OPENAI_IMAGE_FRAME))
    }
}
