//! Generation request types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DiagramError, Result};

/// Which kind of visual the caller wants; selects the provider chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFamily {
    /// Raster illustration from an image model, wrapped in SVG.
    Illustration,
    /// Inline SVG diagram written by a text model.
    #[default]
    Diagram,
}

impl ArtifactFamily {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Illustration => "illustration",
            Self::Diagram => "diagram",
        }
    }
}

impl std::fmt::Display for ArtifactFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagram generation request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    request_id: Uuid,
    topic: String,
    context: String,
    subject_hint: Option<String>,
    family: ArtifactFamily,
}

impl GenerationRequest {
    /// Create a diagram request for `topic` with surrounding `context`.
    pub fn new(topic: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            topic: topic.into(),
            context: context.into(),
            subject_hint: None,
            family: ArtifactFamily::default(),
        }
    }

    /// Attach a free-form label such as the course name.
    pub fn with_subject_hint(mut self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        self.subject_hint = (!hint.trim().is_empty()).then_some(hint);
        self
    }

    pub fn with_family(mut self, family: ArtifactFamily) -> Self {
        self.family = family;
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn subject_hint(&self) -> Option<&str> {
        self.subject_hint.as_deref()
    }

    pub const fn family(&self) -> ArtifactFamily {
        self.family
    }

    /// A topic made only of whitespace counts as empty.
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(DiagramError::invalid_request("topic must not be empty"));
        }
        Ok(())
    }
}
