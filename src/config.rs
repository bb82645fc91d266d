//! Configuration
//!
//! Explicit configuration structs for every backend plus the orchestrator knobs.
//! [`DiagramConfig::from_env`] reads the process environment once; nothing is global.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{DiagramError, Result};
use crate::extract::{DEFAULT_MAX_MARKUP_BYTES, DEFAULT_ROOT_ELEMENT};
use crate::types::HttpConfig;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

pub const DEFAULT_OPENAI_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20240620";
pub const DEFAULT_ANTHROPIC_FALLBACK_MODEL: &str = "claude-3-opus-20240229";
pub const DEFAULT_BEDROCK_IMAGE_MODEL: &str = "stability.stable-diffusion-xl-v1";
pub const DEFAULT_BEDROCK_TEXT_MODEL: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

/// Upper bound for a single provider attempt, including extraction.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where per-request randomness (image seeds, placeholder hues) comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RandomSource {
    #[default]
    Entropy,
    /// Every request starts from the same seed, so output is reproducible.
    Seeded(u64),
}

impl RandomSource {
    /// Fresh generator for one request.
    pub fn rng(&self) -> StdRng {
        match self {
            Self::Entropy => StdRng::from_entropy(),
            Self::Seeded(seed) => StdRng::seed_from_u64(*seed),
        }
    }
}

/// Which diffusion backend serves illustrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageBackend {
    #[default]
    OpenAi,
    Bedrock,
}

impl std::str::FromStr for ImageBackend {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "bedrock" | "stability" => Ok(Self::Bedrock),
            other => Err(DiagramError::Configuration(format!(
                "unknown image provider '{other}' (expected openai or bedrock)"
            ))),
        }
    }
}

/// Settings for one backend.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub enabled: bool,
    /// `None` leaves the adapter constructed but unavailable.
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub fallback_model: Option<String>,
    pub http: HttpConfig,
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: base_url.into(),
            model: model.into(),
            fallback_model: None,
            http: HttpConfig::default(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = Some(model.into());
        self
    }

    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Enabled and holding a non-blank key.
    pub fn has_credentials(&self) -> bool {
        self.enabled
            && self
                .api_key
                .as_ref()
                .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    pub fn openai_default() -> Self {
        Self::new(DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_IMAGE_MODEL)
    }

    pub fn anthropic_default() -> Self {
        Self::new(DEFAULT_ANTHROPIC_BASE_URL, DEFAULT_ANTHROPIC_MODEL)
            .with_fallback_model(DEFAULT_ANTHROPIC_FALLBACK_MODEL)
    }
}

/// Bedrock runtime settings. One bearer token serves both the image and text models.
#[derive(Debug, Clone)]
pub struct BedrockSettings {
    pub provider: ProviderSettings,
    pub region: String,
    pub image_model: String,
    pub text_model: String,
}

impl BedrockSettings {
    pub fn new(region: impl Into<String>) -> Self {
        let region = region.into();
        Self {
            provider: ProviderSettings::new(bedrock_endpoint(&region), DEFAULT_BEDROCK_TEXT_MODEL),
            region,
            image_model: DEFAULT_BEDROCK_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_BEDROCK_TEXT_MODEL.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.provider.base_url
    }
}

impl Default for BedrockSettings {
    fn default() -> Self {
        Self::new(DEFAULT_AWS_REGION)
    }
}

/// Regional Bedrock runtime endpoint.
pub fn bedrock_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

/// Complete configuration for a [`crate::orchestrator::DiagramOrchestrator`].
#[derive(Debug, Clone)]
pub struct DiagramConfig {
    pub openai: ProviderSettings,
    pub anthropic: ProviderSettings,
    pub bedrock: BedrockSettings,
    pub image_backend: ImageBackend,
    pub attempt_timeout: Duration,
    pub max_markup_bytes: usize,
    pub root_element: String,
    pub random: RandomSource,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            openai: ProviderSettings::openai_default(),
            anthropic: ProviderSettings::anthropic_default(),
            bedrock: BedrockSettings::default(),
            image_backend: ImageBackend::default(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            max_markup_bytes: DEFAULT_MAX_MARKUP_BYTES,
            root_element: DEFAULT_ROOT_ELEMENT.to_string(),
            random: RandomSource::default(),
        }
    }
}

impl DiagramConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(key) = get("OPENAI_API_KEY") {
            config.openai.api_key = Some(SecretString::from(key));
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            config.openai.base_url = url;
        }
        if let Some(key) = get("ANTHROPIC_API_KEY") {
            config.anthropic.api_key = Some(SecretString::from(key));
        }
        if let Some(url) = get("ANTHROPIC_BASE_URL") {
            config.anthropic.base_url = url;
        }

        if let Some(region) = get("AWS_REGION") {
            config.bedrock = BedrockSettings::new(region);
        }
        if let Some(endpoint) = get("BEDROCK_ENDPOINT") {
            config.bedrock.provider.base_url = endpoint;
        }
        if let Some(token) = get("AWS_BEARER_TOKEN_BEDROCK") {
            config.bedrock.provider.api_key = Some(SecretString::from(token));
        }

        if let Some(backend) = get("EDUVIS_IMAGE_PROVIDER") {
            config.image_backend = backend.parse()?;
        }
        if let Some(flag) = get("EDUVIS_OPENAI_ENABLED") {
            config.openai.enabled = parse_flag("EDUVIS_OPENAI_ENABLED", &flag)?;
        }
        if let Some(flag) = get("EDUVIS_ANTHROPIC_ENABLED") {
            config.anthropic.enabled = parse_flag("EDUVIS_ANTHROPIC_ENABLED", &flag)?;
        }
        if let Some(flag) = get("EDUVIS_BEDROCK_ENABLED") {
            config.bedrock.provider.enabled = parse_flag("EDUVIS_BEDROCK_ENABLED", &flag)?;
        }
        if let Some(secs) = get("EDUVIS_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                DiagramError::Configuration(format!("EDUVIS_TIMEOUT_SECS must be whole seconds, got '{secs}'"))
            })?;
            if secs == 0 {
                return Err(DiagramError::Configuration(
                    "EDUVIS_TIMEOUT_SECS must be greater than zero".to_string(),
                ));
            }
            config.attempt_timeout = Duration::from_secs(secs);
        }
        if let Some(seed) = get("EDUVIS_SEED") {
            let seed: u64 = seed.trim().parse().map_err(|_| {
                DiagramError::Configuration(format!("EDUVIS_SEED must be an unsigned integer, got '{seed}'"))
            })?;
            config.random = RandomSource::Seeded(seed);
        }

        Ok(config)
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_random(mut self, random: RandomSource) -> Self {
        self.random = random;
        self
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(DiagramError::Configuration(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}
