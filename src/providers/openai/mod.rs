//! `OpenAI` provider
//!
//! Image generation through the `OpenAI` Images API.

pub mod client;

pub use client::{OPENAI_IMAGE_FRAME, OpenAiImageAdapter};
