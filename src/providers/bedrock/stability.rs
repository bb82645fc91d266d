//! Stability SDXL on Bedrock

use async_trait::async_trait;
use serde::Serialize;

use super::BedrockRuntime;
use crate::config::BedrockSettings;
use crate::error::{DiagramError, Result};
use crate::params::{ImageGenParams, PromptParams};
use crate::traits::{ImageFrame, ProviderAdapter, ProviderKind, RawResponse};

#[derive(Debug, Serialize)]
struct TextPrompt<'a> {
    text: &'a str,
    weight: f32,
}

#[derive(Debug, Serialize)]
struct StabilityBody<'a> {
    text_prompts: [TextPrompt<'a>; 1],
    cfg_scale: f32,
    steps: u32,
    width: u32,
    height: u32,
    seed: u32,
    style_preset: &'a str,
}

impl<'a> From<&'a ImageGenParams> for StabilityBody<'a> {
    fn from(params: &'a ImageGenParams) -> Self {
        Self {
            text_prompts: [TextPrompt {
                text: &params.prompt,
                weight: 1.0,
            }],
            cfg_scale: params.cfg_scale,
            steps: params.steps,
            width: params.width,
            height: params.height,
            seed: params.seed,
            style_preset: &params.style_preset,
        }
    }
}

/// Diffusion adapter for Stability models hosted on Bedrock.
#[derive(Debug, Clone)]
pub struct BedrockStabilityAdapter {
    runtime: BedrockRuntime,
    model: String,
}

impl BedrockStabilityAdapter {
    pub const PROVIDER_ID: &'static str = "bedrock-stability";

    pub fn new(settings: &BedrockSettings) -> Result<Self> {
        let http_client = settings.provider.http.build_client()?;
        Ok(Self::with_http_client(settings, http_client))
    }

    pub fn with_http_client(settings: &BedrockSettings, http_client: reqwest::Client) -> Self {
        Self {
            runtime: BedrockRuntime::new(settings, http_client),
            model: settings.image_model.clone(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for BedrockStabilityAdapter {
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
        self.runtime.is_available()
    }

    async fn invoke_with_model(&self, params: &PromptParams, model_id: &str) -> Result<RawResponse> {
        let PromptParams::Image(image) = params else {
            return Err(DiagramError::transport(
                Self::PROVIDER_ID,
                format!("expected image parameters, got {}", params.kind_name()),
            ));
        };
        let body = serde_json::to_value(StabilityBody::from(image))?;
        let json = self
            .runtime
            .invoke_model(Self::PROVIDER_ID, model_id, &body)
            .await?;
        Ok(RawResponse::new(Self::PROVIDER_ID, model_id, json)
            .with_frame(ImageFrame::new(image.width, image.height)))
    }
}
