//! Artifact extraction
//!
//! Turns a [`RawResponse`] into a validated [`DiagramArtifact`]. Image responses are
//! wrapped in a minimal SVG frame; text responses are searched for the shortest
//! complete root element span. Interior markup is trusted once the root tags are
//! found, so an unclosed child element will only surface at render time.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde_json::Value;

use crate::error::{DiagramError, Result};
use crate::traits::{ImageFrame, ProviderKind, RawResponse};
use crate::types::DiagramArtifact;
use crate::utils::markup_text;
use crate::utils::sanitize::{TITLE_LIMIT, truncate_entity_safe};

/// Default root element expected in text responses.
pub const DEFAULT_ROOT_ELEMENT: &str = "svg";
/// Default upper bound on emitted markup.
pub const DEFAULT_MAX_MARKUP_BYTES: usize = 8 * 1024 * 1024;

/// Frame used when an image adapter did not report one.
const FALLBACK_FRAME: ImageFrame = ImageFrame::new(1024, 1024);

/// Parses raw provider output into artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactExtractor {
    root: String,
    pattern: Regex,
    max_markup_bytes: usize,
}

impl Default for ArtifactExtractor {
    fn default() -> Self {
        // `svg` always passes `with_root` validation.
        Self::with_root(DEFAULT_ROOT_ELEMENT).expect("default root element pattern compiles")
    }
}

impl ArtifactExtractor {
    /// Extractor for text responses whose markup root is `root`.
    pub fn with_root(root: &str) -> Result<Self> {
        let root = root.trim();
        if root.is_empty() || !root.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':')) {
            return Err(DiagramError::Configuration(format!(
                "invalid root element name: {root:?}"
            )));
        }
        let escaped = regex::escape(root);
        let pattern = Regex::new(&format!(r"(?is)<{escaped}(?:\s[^>]*)?>.*?</{escaped}\s*>"))
            .map_err(|e| DiagramError::Configuration(format!("root element pattern: {e}")))?;
        Ok(Self {
            root: root.to_string(),
            pattern,
            max_markup_bytes: DEFAULT_MAX_MARKUP_BYTES,
        })
    }

    pub fn with_max_markup_bytes(mut self, max: usize) -> Self {
        self.max_markup_bytes = max;
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn max_markup_bytes(&self) -> usize {
        self.max_markup_bytes
    }

    /// Extract an artifact from `raw`, titled with `topic` where applicable.
    pub fn extract(&self, raw: &RawResponse, kind: ProviderKind, topic: &str) -> Result<DiagramArtifact> {
        let artifact = match kind {
            ProviderKind::DiffusionImage => self.extract_image(raw, topic)?,
            ProviderKind::TextGeneration => self.extract_markup(raw)?,
        };
        if artifact.markup.len() > self.max_markup_bytes {
            return Err(DiagramError::malformed(format!(
                "markup from {} is {} bytes, limit is {}",
                raw.provider_id,
                artifact.markup.len(),
                self.max_markup_bytes
            )));
        }
        Ok(artifact)
    }

    fn extract_image(&self, raw: &RawResponse, topic: &str) -> Result<DiagramArtifact> {
        let list = ["artifacts", "data", "images"]
            .iter()
            .find_map(|key| raw.body.get(*key))
            .and_then(Value::as_array)
            .ok_or_else(|| DiagramError::empty(format!("{} returned no image list", raw.provider_id)))?;

        let first = list
            .first()
            .ok_or_else(|| DiagramError::empty(format!("{} returned an empty image list", raw.provider_id)))?;

        if first
            .get("finishReason")
            .and_then(Value::as_str)
            .is_some_and(|r| r.eq_ignore_ascii_case("CONTENT_FILTERED"))
        {
            return Err(DiagramError::empty(format!(
                "{} filtered the generated image",
                raw.provider_id
            )));
        }

        let payload = ["base64", "b64_json", "image"]
            .iter()
            .find_map(|key| first.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DiagramError::malformed(format!("{} image has no base64 payload", raw.provider_id)))?;

        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| DiagramError::malformed(format!("{} image payload is not base64: {e}", raw.provider_id)))?;
        let mime = infer::get(&bytes)
            .map(|t| t.mime_type())
            .filter(|m| m.starts_with("image/"))
            .unwrap_or("image/png");

        let frame = raw.frame.unwrap_or(FALLBACK_FRAME);
        let escaped = markup_text(topic.trim());
        let (title, _) = truncate_entity_safe(&escaped, TITLE_LIMIT);
        let markup = format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                "<title>Educational Illustration: {title}</title>",
                "<desc>An educational illustration about {title}</desc>",
                r#"<image width="{w}" height="{h}" href="data:{mime};base64,{payload}"/>"#,
                "</svg>"
            ),
            w = frame.width,
            h = frame.height,
            title = title,
            mime = mime,
            payload = payload,
        );

        Ok(DiagramArtifact::raster(markup, raw.provider_id.clone()))
    }

    fn extract_markup(&self, raw: &RawResponse) -> Result<DiagramArtifact> {
        let text = response_text(&raw.body)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| DiagramError::empty(format!("{} returned no text content", raw.provider_id)))?;

        let span = self.pattern.find(&text).ok_or_else(|| {
            DiagramError::malformed(format!(
                "{} response contains no complete <{}> element",
                raw.provider_id, self.root
            ))
        })?;

        Ok(DiagramArtifact::inline(
            span.as_str().to_string(),
            raw.provider_id.clone(),
        ))
    }
}

/// Text content of a chat response, across the shapes the adapters produce.
fn response_text(body: &Value) -> Option<String> {
    // Anthropic Messages (direct and via Bedrock)
    if let Some(blocks) = body.get("content").and_then(Value::as_array) {
        let text: String = blocks
            .iter()
            .filter(|b| b.get("type").and_then(Value::as_str).is_none_or(|t| t == "text"))
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n");
        return Some(text);
    }

    // OpenAI-style chat completions
    if let Some(content) = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
    {
        return Some(content.to_string());
    }

    // Legacy text completions
    body.get("completion")
        .and_then(Value::as_str)
        .map(str::to_string)
}
