//! Provider adapters
//!
//! One [`crate::traits::ProviderAdapter`] implementation per remote backend,
//! each behind its own cargo feature.

pub(crate) mod http;

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "bedrock")]
pub mod bedrock;
#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicAdapter;
#[cfg(feature = "bedrock")]
pub use bedrock::{BedrockAnthropicAdapter, BedrockStabilityAdapter};
#[cfg(feature = "openai")]
pub use openai::OpenAiImageAdapter;
