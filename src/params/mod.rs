//! Parameter Management Module
//!
//! Builds the provider-facing generation parameters from a topic and its context.
//! Image models receive [`ImageGenParams`]; chat models receive [`ChatParams`].

pub mod prompt;

pub use prompt::{ChatParams, ImageGenParams, PromptBuilder, PromptParams};
