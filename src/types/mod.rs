//! Core data types
//!
//! Requests, artifacts, per-attempt invocation records, HTTP settings and the
//! serializable boundary bodies exchanged with the chat layer.

pub mod artifact;
pub mod boundary;
pub mod http;
pub mod invocation;
pub mod request;

pub use artifact::{ArtifactKind, ArtifactStatus, DiagramArtifact, GenerationOutcome};
pub use boundary::{DiagramRequestBody, DiagramResponseBody, ResponseStatus};
pub use http::{HttpConfig, HttpConfigBuilder};
pub use invocation::ProviderInvocation;
pub use request::{ArtifactFamily, GenerationRequest};
