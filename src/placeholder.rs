//! Placeholder synthesis
//!
//! Last-resort artifact built from the topic alone: a pastel background, a badge with a
//! short acronym, and a caption bar. Needs no network and cannot fail.

use rand::Rng;

use crate::types::{ArtifactFamily, DiagramArtifact};
use crate::utils::markup_text;
use crate::utils::sanitize::{MARKUP_ENTITIES, TITLE_LIMIT, truncate_entity_safe};

/// Tokens must be longer than this to contribute to the acronym.
const ACRONYM_MIN_TOKEN_CHARS: usize = 3;
const ACRONYM_MAX_CHARS: usize = 3;
/// Caption text limit before the ellipsis.
pub const CAPTION_LIMIT: usize = 40;
const ELLIPSIS: &str = "...";

/// Geometry of the placeholder for one artifact family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    width: u32,
    height: u32,
    label: &'static str,
    noun: &'static str,
    badge_radius: u32,
    badge_font: u32,
    bar_x: u32,
    bar_y: u32,
    bar_width: u32,
}

const BAR_HEIGHT: u32 = 60;

impl Layout {
    const fn for_family(family: ArtifactFamily) -> Self {
        match family {
            ArtifactFamily::Illustration => Self {
                width: 1024,
                height: 1024,
                label: "Educational Illustration",
                noun: "illustration",
                badge_radius: 200,
                badge_font: 120,
                bar_x: 112,
                bar_y: 768,
                bar_width: 800,
            },
            ArtifactFamily::Diagram => Self {
                width: 800,
                height: 600,
                label: "Educational Diagram",
                noun: "diagram",
                badge_radius: 150,
                badge_font: 80,
                bar_x: 100,
                bar_y: 500,
                bar_width: 600,
            },
        }
    }
}

/// Light and dark tones sharing one hue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub hue: u16,
    pub light: String,
    pub dark: String,
}

impl Palette {
    pub fn from_hue(hue: u16) -> Self {
        let hue = hue % 360;
        Self {
            hue,
            light: format!("hsl({hue}, 70%, 80%)"),
            dark: format!("hsl({hue}, 70%, 40%)"),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_hue(rng.gen_range(0..360))
    }
}

/// Builds degraded-mode artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderSynthesizer;

impl PlaceholderSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Synthesize a placeholder for `topic`. The hue is drawn from `rng`.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        topic: &str,
        family: ArtifactFamily,
        rng: &mut R,
    ) -> DiagramArtifact {
        let layout = Layout::for_family(family);
        let sanitized = markup_text(topic.trim());
        let badge = acronym(&sanitized);
        let caption = caption(&sanitized);
        let (title, _) = truncate_entity_safe(&sanitized, TITLE_LIMIT);
        let palette = Palette::random(rng);

        let Layout {
            width: w,
            height: h,
            label,
            noun,
            badge_radius,
            badge_font,
            bar_x,
            bar_y,
            bar_width,
        } = layout;
        let cx = w / 2;
        let cy = h / 2;
        let caption_y = bar_y + BAR_HEIGHT / 2;

        let markup = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
  <title>{label}: {title}</title>
  <desc>A placeholder {noun} about {title}</desc>
  <rect width="{w}" height="{h}" fill="{light}"/>
  <circle cx="{cx}" cy="{cy}" r="{badge_radius}" fill="white"/>
  <text x="{cx}" y="{cy}" font-family="Arial, sans-serif" font-size="{badge_font}" font-weight="bold" fill="{dark}" text-anchor="middle" dominant-baseline="central">{badge}</text>
  <rect x="{bar_x}" y="{bar_y}" width="{bar_width}" height="{BAR_HEIGHT}" rx="10" fill="white" opacity="0.9"/>
  <text x="{cx}" y="{caption_y}" font-family="Arial, sans-serif" font-size="24" fill="{dark}" text-anchor="middle" dominant-baseline="central">{label}: {caption}</text>
</svg>"#,
            light = palette.light,
            dark = palette.dark,
        );

        DiagramArtifact::placeholder(markup)
    }
}

/// Up to three uppercase initials of the tokens longer than three characters.
///
/// Falls back to the first alphanumeric character of the text, then to `?`, so the
/// badge is never blank.
pub fn acronym(sanitized: &str) -> String {
    let initials: String = sanitized
        .split_whitespace()
        .filter(|token| token.chars().count() > ACRONYM_MIN_TOKEN_CHARS)
        .filter_map(first_letter)
        .flat_map(char::to_uppercase)
        .take(ACRONYM_MAX_CHARS)
        .collect();

    if !initials.is_empty() {
        return initials;
    }

    first_letter(sanitized)
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

/// First alphanumeric character of a sanitized token, skipping escape entities.
fn first_letter(token: &str) -> Option<char> {
    let mut rest = token;
    loop {
        if let Some(entity) = MARKUP_ENTITIES.iter().find(|e| rest.starts_with(**e)) {
            rest = &rest[entity.len()..];
            continue;
        }
        let ch = rest.chars().next()?;
        if ch.is_alphanumeric() {
            return Some(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }
}

/// Caption text: the first [`CAPTION_LIMIT`] characters plus `...` when longer.
pub fn caption(sanitized: &str) -> String {
    match truncate_entity_safe(sanitized, CAPTION_LIMIT) {
        (head, true) => format!("{head}{ELLIPSIS}"),
        (head, false) => head.to_string(),
    }
}
