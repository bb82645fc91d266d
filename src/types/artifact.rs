//! Diagram artifact types.

use serde::{Deserialize, Serialize};

use super::invocation::ProviderInvocation;

/// How the markup was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A raster image wrapped in an SVG frame.
    RasterWrapped,
    /// SVG markup written by a text model.
    InlineMarkup,
    /// Locally synthesized placeholder.
    Placeholder,
}

/// `Degraded` means the placeholder synthesizer produced the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Success,
    Degraded,
}

/// The renderable result of one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramArtifact {
    pub kind: ArtifactKind,
    pub markup: String,
    pub status: ArtifactStatus,
    /// Provider that produced the markup; `None` for placeholders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

impl DiagramArtifact {
    pub fn raster(markup: String, provider_id: impl Into<String>) -> Self {
        Self {
            kind: ArtifactKind::RasterWrapped,
            markup,
            status: ArtifactStatus::Success,
            provider_id: Some(provider_id.into()),
        }
    }

    pub fn inline(markup: String, provider_id: impl Into<String>) -> Self {
        Self {
            kind: ArtifactKind::InlineMarkup,
            markup,
            status: ArtifactStatus::Success,
            provider_id: Some(provider_id.into()),
        }
    }

    pub fn placeholder(markup: String) -> Self {
        Self {
            kind: ArtifactKind::Placeholder,
            markup,
            status: ArtifactStatus::Degraded,
            provider_id: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.status == ArtifactStatus::Degraded
    }
}

/// An artifact together with the attempts that led to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub artifact: DiagramArtifact,
    pub invocations: Vec<ProviderInvocation>,
}

impl GenerationOutcome {
    /// Number of attempts that actually reached the network.
    pub fn attempted_calls(&self) -> usize {
        self.invocations.iter().filter(|i| i.attempted).count()
    }
}
