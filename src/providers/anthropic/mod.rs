//! Anthropic provider

pub mod client;

pub use client::{ANTHROPIC_VERSION, AnthropicAdapter};
