//! Request/response bodies exchanged with the chat layer.
//!
//! The chat service posts `{ subjectHint, topic, context }` and expects back
//! `{ status, markup }`. Only an invalid request produces `status = "error"`;
//! every backend failure is absorbed into a placeholder.

use serde::{Deserialize, Serialize};

use super::request::{ArtifactFamily, GenerationRequest};

/// Incoming body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRequestBody {
    #[serde(default)]
    pub subject_hint: String,
    pub topic: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub family: ArtifactFamily,
}

impl From<DiagramRequestBody> for GenerationRequest {
    fn from(body: DiagramRequestBody) -> Self {
        GenerationRequest::new(body.topic, body.context)
            .with_subject_hint(body.subject_hint)
            .with_family(body.family)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Outgoing body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramResponseBody {
    pub status: ResponseStatus,
    pub markup: String,
}

impl DiagramResponseBody {
    pub fn success(markup: String) -> Self {
        Self {
            status: ResponseStatus::Success,
            markup,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            markup: message.into(),
        }
    }
}
