//! # eduvis - Educational Diagram Generation
//!
//! eduvis turns a topic and some surrounding context into a renderable SVG artifact
//! for teaching material. It builds provider-specific prompts, calls a remote
//! generative backend, extracts the markup from the answer and walks an explicit
//! fallback chain when something goes wrong. When every provider fails, a locally
//! synthesized placeholder is returned, so callers always get markup back.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **One adapter trait**: every backend implements [`traits::ProviderAdapter`].
//! - **Explicit fallback**: primary provider, its fallback model, an alternate provider,
//!   then a placeholder, driven by [`orchestrator::GenerationState`].
//! - **Bounded attempts**: every attempt is limited by a timeout and isolated from panics.
//! - **Injectable randomness**: [`config::RandomSource::Seeded`] makes output reproducible.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eduvis::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = DiagramOrchestrator::from_env()?;
//!
//!     let request = GenerationRequest::new("The Water Cycle", "evaporation, condensation")
//!         .with_family(ArtifactFamily::Diagram);
//!     let artifact = orchestrator.generate(&request).await?;
//!
//!     println!("{} ({:?})", artifact.markup, artifact.status);
//!     Ok(())
//! }
//! ```
//!
//! ## Providers
//!
//! | Feature | Adapters |
//! |---|---|
//! | `openai` | [`providers::OpenAiImageAdapter`] |
//! | `anthropic` | [`providers::AnthropicAdapter`] |
//! | `bedrock` | [`providers::BedrockStabilityAdapter`], [`providers::BedrockAnthropicAdapter`] |

pub mod config;
pub mod error;
pub mod extract;
pub mod observability;
pub mod orchestrator;
pub mod params;
pub mod placeholder;
pub mod providers;
pub mod traits;
pub mod types;
pub mod utils;

pub use config::{DiagramConfig, ImageBackend, ProviderSettings, RandomSource};
pub use error::{DiagramError, ErrorClass, Result};
pub use extract::ArtifactExtractor;
pub use orchestrator::{DiagramOrchestrator, GenerationState, ProviderChain};
pub use placeholder::PlaceholderSynthesizer;
pub use traits::ProviderAdapter;
pub use types::{DiagramArtifact, GenerationOutcome, GenerationRequest};

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::config::{BedrockSettings, DiagramConfig, ImageBackend, ProviderSettings, RandomSource};
    pub use crate::error::{DiagramError, ErrorClass};
    pub use crate::orchestrator::{DiagramOrchestrator, OrchestratorOptions, ProviderChain};
    pub use crate::params::{PromptBuilder, PromptParams};
    pub use crate::traits::{ProviderAdapter, ProviderKind, RawResponse};
    pub use crate::types::{
        ArtifactFamily, ArtifactKind, ArtifactStatus, DiagramArtifact, DiagramRequestBody,
        DiagramResponseBody, GenerationOutcome, GenerationRequest, HttpConfig, ProviderInvocation,
        ResponseStatus,
    };
    pub use crate::utils::{CancelHandle, new_cancel_handle};

    #[cfg(feature = "anthropic")]
    pub use crate::providers::AnthropicAdapter;
    #[cfg(feature = "bedrock")]
    pub use crate::providers::{BedrockAnthropicAdapter, BedrockStabilityAdapter};
    #[cfg(feature = "openai")]
    pub use crate::providers::OpenAiImageAdapter;
}
