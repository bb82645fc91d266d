//! Provider adapter capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::params::PromptParams;

/// Family of backend behind an adapter. Decides both the parameters it is sent and
/// how its response is extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    DiffusionImage,
    TextGeneration,
}

/// Pixel size of a generated raster, used when wrapping it in SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFrame {
    pub width: u32,
    pub height: u32,
}

impl ImageFrame {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Undecoded provider answer. The extractor only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub provider_id: String,
    pub model: String,
    pub body: serde_json::Value,
    /// Size of the requested raster; `None` for text providers.
    pub frame: Option<ImageFrame>,
}

impl RawResponse {
    pub fn new(provider_id: impl Into<String>, model: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            provider_id: provider_id.into(),
            model: model.into(),
            body,
            frame: None,
        }
    }

    pub fn with_frame(mut self, frame: ImageFrame) -> Self {
        self.frame = Some(frame);
        self
    }
}

/// Uniform wrapper around one remote generative backend.
///
/// Implementations perform exactly one network call per invoke and never retry;
/// the retry policy belongs to the orchestrator. An adapter built without
/// credentials reports itself unavailable and fails every call with
/// `AuthFailure` before touching the network.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable provider identifier used in logs and invocation records.
    fn provider_id(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    /// Model used by [`ProviderAdapter::invoke`].
    fn default_model(&self) -> &str;

    /// Whether credentials are configured.
    fn is_available(&self) -> bool;

    /// Alternate model to try before abandoning this provider.
    fn fallback_model(&self) -> Option<&str> {
        None
    }

    fn supports_fallback_model(&self) -> bool {
        self.fallback_model().is_some()
    }

    /// Call the backend with an explicit model identifier.
    async fn invoke_with_model(&self, params: &PromptParams, model_id: &str) -> Result<RawResponse>;

    /// Call the backend with its default model.
    async fn invoke(&self, params: &PromptParams) -> Result<RawResponse> {
        let model = self.default_model().to_string();
        self.invoke_with_model(params, &model).await
    }
}
