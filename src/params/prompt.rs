//! Prompt construction for image and diagram backends.
//!
//! Both builders are pure. The only non-determinism is the image seed, which is drawn
//! from the caller-supplied random source.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Width of the canonical inline diagram frame.
pub const DIAGRAM_FRAME_WIDTH: u32 = 800;
/// Height of the canonical inline diagram frame.
pub const DIAGRAM_FRAME_HEIGHT: u32 = 600;

/// Parameters for a diffusion-style image model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenParams {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub cfg_scale: f32,
    pub steps: u32,
    pub style_preset: String,
    pub quality: String,
    pub seed: u32,
}

/// Parameters for a chat-completion model asked to write SVG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatParams {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Parameters handed to an adapter; which variant depends on the adapter kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptParams {
    Image(ImageGenParams),
    Chat(ChatParams),
}

impl PromptParams {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Chat(_) => "chat",
        }
    }
}

/// Fixed generation settings shared by every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptBuilder {
    pub image_width: u32,
    pub image_height: u32,
    pub cfg_scale: f32,
    pub steps: u32,
    pub style_preset: String,
    pub quality: String,
    /// Image APIs cap prompt length, so context is clamped to this many characters.
    pub image_context_limit: usize,
    pub chat_temperature: f32,
    pub chat_max_tokens: u32,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            image_width: 1024,
            image_height: 768,
            cfg_scale: 7.0,
            steps: 50,
            style_preset: "digital-art".to_string(),
            quality: "standard".to_string(),
            image_context_limit: 500,
            chat_temperature: 0.2,
            chat_max_tokens: 4000,
        }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_context_limit(mut self, limit: usize) -> Self {
        self.image_context_limit = limit;
        self
    }

    /// Build parameters for an image model.
    pub fn build_image_prompt<R: Rng + ?Sized>(
        &self,
        topic: &str,
        context: &str,
        rng: &mut R,
    ) -> ImageGenParams {
        let context = clamp_chars(context.trim(), self.image_context_limit);
        let mut prompt = format!(
            "Create an educational illustration that clearly explains and visualizes: {topic}.\n\n"
        );
        if !context.is_empty() {
            prompt.push_str(&format!("Topic details:\n{context}\n\n"));
        }
        prompt.push_str(
            "Requirements:\n\
             - Every element must be factually and scientifically accurate\n\
             - Label the important components clearly\n\
             - Use a pleasing, well-balanced color palette\n\
             - All text must be legible and properly positioned\n\
             - Keep the complexity appropriate for the student's grade level\n\n\
             The illustration should help students visualize and understand this concept.",
        );

        ImageGenParams {
            prompt,
            width: self.image_width,
            height: self.image_height,
            cfg_scale: self.cfg_scale,
            steps: self.steps,
            style_preset: self.style_preset.clone(),
            quality: self.quality.clone(),
            seed: rng.r#gen::<u32>(),
        }
    }

    /// Build parameters for a chat model that must answer with SVG only.
    pub fn build_diagram_prompt(&self, topic: &str, context: &str) -> ChatParams {
        let system = "You are an expert at creating educational SVG diagrams. \
                      You answer with well-formed SVG markup and nothing else."
            .to_string();

        let context = context.trim();
        let context_block = if context.is_empty() {
            String::new()
        } else {
            format!("Use this context to keep the diagram accurate:\n{context}\n\n")
        };

        let user = format!(
            "Create an educational SVG diagram about: {topic}\n\n\
             {context_block}\
             Checklist:\n\
             1. Output a single <svg> element with viewBox=\"0 0 {w} {h}\"\n\
             2. Include clear labels and arrows that explain the concept\n\
             3. All text must be readable and no elements may overlap\n\
             4. Position every element correctly inside the frame\n\
             5. Keep it suitable for students\n\n\
             Respond with ONLY the complete SVG markup, without explanations or code fences.",
            w = DIAGRAM_FRAME_WIDTH,
            h = DIAGRAM_FRAME_HEIGHT,
        );

        ChatParams {
            system,
            user,
            temperature: self.chat_temperature,
            max_tokens: self.chat_max_tokens,
        }
    }
}

fn clamp_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
