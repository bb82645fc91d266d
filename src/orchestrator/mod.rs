//! Generation orchestrator
//!
//! Drives one request through the fallback chain: primary provider, its fallback
//! model, an alternate provider, and finally the placeholder synthesizer. Attempts
//! are sequential. Each one is bounded by the attempt timeout and isolated from
//! adapter panics, so backend failures never reach the caller.

mod state;

pub use state::{ChainShape, GenerationState};

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::FutureExt;
use rand::rngs::StdRng;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::{DEFAULT_ATTEMPT_TIMEOUT, DiagramConfig, RandomSource};
use crate::error::{DiagramError, ErrorClass, Result};
use crate::extract::ArtifactExtractor;
use crate::params::{PromptBuilder, PromptParams};
use crate::placeholder::PlaceholderSynthesizer;
use crate::traits::{ProviderAdapter, ProviderKind};
use crate::types::{
    ArtifactFamily, DiagramArtifact, DiagramRequestBody, DiagramResponseBody, GenerationOutcome,
    GenerationRequest, ProviderInvocation,
};
use crate::utils::cancel::{CancelHandle, run_until_cancelled};

/// Called once per recorded attempt, including skipped ones.
pub type AttemptCallback = Arc<dyn Fn(&ProviderInvocation) + Send + Sync>;

/// Ordered providers for one artifact family.
#[derive(Clone)]
pub struct ProviderChain {
    primary: Arc<dyn ProviderAdapter>,
    alternate: Option<Arc<dyn ProviderAdapter>>,
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderChain")
            .field("primary", &self.primary.provider_id())
            .field("alternate", &self.alternate.as_ref().map(|a| a.provider_id()))
            .finish()
    }
}

impl ProviderChain {
    pub fn new(primary: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            primary,
            alternate: None,
        }
    }

    pub fn with_alternate(mut self, alternate: Arc<dyn ProviderAdapter>) -> Self {
        self.alternate = Some(alternate);
        self
    }

    /// Chain from optional slots. A missing primary is replaced by the alternate.
    pub fn from_slots(
        primary: Option<Arc<dyn ProviderAdapter>>,
        alternate: Option<Arc<dyn ProviderAdapter>>,
    ) -> Option<Self> {
        match (primary, alternate) {
            (Some(primary), alternate) => Some(Self { primary, alternate }),
            (None, Some(alternate)) => Some(Self::new(alternate)),
            (None, None) => None,
        }
    }

    pub fn primary(&self) -> &Arc<dyn ProviderAdapter> {
        &self.primary
    }

    pub fn alternate(&self) -> Option<&Arc<dyn ProviderAdapter>> {
        self.alternate.as_ref()
    }

    pub fn shape(&self) -> ChainShape {
        ChainShape {
            has_chain: true,
            primary_has_fallback_model: self.primary.supports_fallback_model()
                && self.primary.fallback_model().is_some(),
            has_alternate: self.alternate.is_some(),
        }
    }

    /// Adapter and model an attempt state calls.
    fn target(&self, state: GenerationState) -> Option<(&dyn ProviderAdapter, &str)> {
        match state {
            GenerationState::TryPrimaryProvider => {
                Some((self.primary.as_ref(), self.primary.default_model()))
            }
            GenerationState::TryProviderFallbackModel => self
                .primary
                .fallback_model()
                .map(|model| (self.primary.as_ref(), model)),
            GenerationState::TryAlternateProvider => self
                .alternate
                .as_deref()
                .map(|alternate| (alternate, alternate.default_model())),
            _ => None,
        }
    }
}

/// Runtime options for [`DiagramOrchestrator`].
#[derive(Clone)]
pub struct OrchestratorOptions {
    /// Upper bound for one invoke plus extraction.
    pub attempt_timeout: Duration,
    pub random: RandomSource,
    pub on_attempt: Option<AttemptCallback>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            random: RandomSource::default(),
            on_attempt: None,
        }
    }
}

impl std::fmt::Debug for OrchestratorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorOptions")
            .field("attempt_timeout", &self.attempt_timeout)
            .field("random", &self.random)
            .field("has_on_attempt", &self.on_attempt.is_some())
            .finish()
    }
}

/// Entry point of the crate: turns a [`GenerationRequest`] into a renderable artifact.
///
/// Holds only read-only state and can be shared across tasks behind an `Arc`.
#[derive(Debug, Clone)]
pub struct DiagramOrchestrator {
    illustration: Option<ProviderChain>,
    diagram: Option<ProviderChain>,
    prompts: PromptBuilder,
    extractor: ArtifactExtractor,
    placeholder: PlaceholderSynthesizer,
    options: OrchestratorOptions,
}

impl DiagramOrchestrator {
    pub fn builder() -> DiagramOrchestratorBuilder {
        DiagramOrchestratorBuilder::default()
    }

    /// Assemble adapters and chains from configuration.
    ///
    /// Illustrations go to the configured image backend first and then to a text
    /// model; diagrams go to Anthropic first and then to Claude on Bedrock.
    pub fn from_config(config: &DiagramConfig) -> Result<Self> {
        let image = wiring::image_adapter(config)?;
        let text = wiring::anthropic_adapter(config)?;
        let bedrock_text = wiring::bedrock_text_adapter(config)?;

        let illustration =
            ProviderChain::from_slots(image, text.clone().or_else(|| bedrock_text.clone()));
        let diagram = ProviderChain::from_slots(text, bedrock_text);

        let extractor = ArtifactExtractor::with_root(&config.root_element)?
            .with_max_markup_bytes(config.max_markup_bytes);

        let mut builder = Self::builder()
            .extractor(extractor)
            .attempt_timeout(config.attempt_timeout)
            .random(config.random);
        if let Some(chain) = illustration {
            builder = builder.illustration_chain(chain);
        }
        if let Some(chain) = diagram {
            builder = builder.diagram_chain(chain);
        }
        Ok(builder.build())
    }

    /// Convenience: [`DiagramConfig::from_env`] followed by [`Self::from_config`].
    pub fn from_env() -> Result<Self> {
        Self::from_config(&DiagramConfig::from_env()?)
    }

    pub fn chain(&self, family: ArtifactFamily) -> Option<&ProviderChain> {
        match family {
            ArtifactFamily::Illustration => self.illustration.as_ref(),
            ArtifactFamily::Diagram => self.diagram.as_ref(),
        }
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    /// Generate an artifact. The only error is `InvalidRequest`.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<DiagramArtifact> {
        self.generate_with_report(request)
            .await
            .map(|outcome| outcome.artifact)
    }

    /// Generate an artifact and report every attempt made on the way.
    pub async fn generate_with_report(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        let span = info_span!(
            "diagram_generation",
            request_id = %request.request_id(),
            family = %request.family()
        );
        async {
            request.validate().inspect_err(|e| debug!(error = %e, "request rejected"))?;
            Ok::<_, DiagramError>(self.run(request).await)
        }
        .instrument(span)
        .await
    }

    /// Like [`Self::generate_with_report`], but gives up with `Ok(None)` as soon as
    /// `cancel` fires. In-flight provider calls are dropped, not awaited.
    pub async fn generate_cancellable(
        &self,
        request: &GenerationRequest,
        cancel: &CancelHandle,
    ) -> Result<Option<GenerationOutcome>> {
        request.validate()?;
        let outcome = run_until_cancelled(cancel, self.generate_with_report(request)).await;
        if outcome.is_none() {
            info!(request_id = %request.request_id(), "generation cancelled");
        }
        outcome.transpose()
    }

    /// Serve the boundary contract: `status="error"` only for invalid requests.
    pub async fn handle(&self, body: DiagramRequestBody) -> DiagramResponseBody {
        let request = GenerationRequest::from(body);
        match self.generate(&request).await {
            Ok(artifact) => DiagramResponseBody::success(artifact.markup),
            Err(err) => DiagramResponseBody::error(err.to_string()),
        }
    }

    async fn run(&self, request: &GenerationRequest) -> GenerationOutcome {
        let mut rng = self.options.random.rng();
        let chain = self.chain(request.family());
        let shape = chain.map(ProviderChain::shape).unwrap_or_default();
        let mut invocations = Vec::new();
        let mut artifact = None;
        let mut state = GenerationState::Start;

        while state != GenerationState::Done {
            let failure = match state {
                GenerationState::Placeholder => {
                    warn!(
                        topic = %request.topic(),
                        attempts = invocations.len(),
                        "all providers failed, returning placeholder"
                    );
                    artifact = Some(self.synthesize_placeholder(request, &mut rng));
                    None
                }
                s if s.is_attempt() => match chain.and_then(|c| c.target(s)) {
                    Some((adapter, model)) => {
                        match self
                            .attempt(adapter, model, request, &mut rng, &mut invocations)
                            .await
                        {
                            Ok(found) => {
                                artifact = Some(found);
                                None
                            }
                            Err(class) => Some(class),
                        }
                    }
                    None => Some(ErrorClass::TransportError),
                },
                _ => None,
            };

            let next = state.next(failure, shape);
            debug!(from = %state, to = %next, error_class = ?failure, "state transition");
            state = next;
        }

        let artifact = artifact.unwrap_or_else(|| self.synthesize_placeholder(request, &mut rng));
        if !artifact.is_degraded() {
            info!(
                provider = artifact.provider_id.as_deref().unwrap_or_default(),
                kind = ?artifact.kind,
                markup_bytes = artifact.markup.len(),
                "artifact generated"
            );
        }
        GenerationOutcome {
            artifact,
            invocations,
        }
    }

    fn synthesize_placeholder(&self, request: &GenerationRequest, rng: &mut StdRng) -> DiagramArtifact {
        self.placeholder
            .synthesize(request.topic(), request.family(), rng)
    }

    /// One invoke plus extraction. Failures come back already classified.
    async fn attempt(
        &self,
        adapter: &dyn ProviderAdapter,
        model: &str,
        request: &GenerationRequest,
        rng: &mut StdRng,
        invocations: &mut Vec<ProviderInvocation>,
    ) -> std::result::Result<DiagramArtifact, ErrorClass> {
        let provider_id = adapter.provider_id();
        if !adapter.is_available() {
            debug!(provider = provider_id, model, "adapter has no credentials, skipping");
            self.record(invocations, ProviderInvocation::skipped(provider_id, model));
            return Err(ErrorClass::AuthFailure);
        }

        let topic = request.topic().trim();
        let kind = adapter.kind();
        let params = match kind {
            ProviderKind::DiffusionImage => {
                PromptParams::Image(self.prompts.build_image_prompt(topic, request.context(), rng))
            }
            ProviderKind::TextGeneration => {
                PromptParams::Chat(self.prompts.build_diagram_prompt(topic, request.context()))
            }
        };

        let started_at = Utc::now();
        let started = Instant::now();
        let call = AssertUnwindSafe(self.invoke_and_extract(adapter, &params, model, topic)).catch_unwind();
        let result = match tokio::time::timeout(self.options.attempt_timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(DiagramError::transport(
                provider_id,
                format!("adapter panicked: {}", panic_message(panic.as_ref())),
            )),
            Err(_) => Err(DiagramError::timeout(provider_id, self.options.attempt_timeout)),
        };
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let result = result.map_err(|err| {
            let class = err.fallback_class();
            warn!(provider = provider_id, model, error_class = %class, error = %err, "attempt failed");
            class
        });
        self.record(
            invocations,
            ProviderInvocation::finished(provider_id, model, started_at, latency_ms, result.as_ref().err().copied()),
        );
        result
    }

    async fn invoke_and_extract(
        &self,
        adapter: &dyn ProviderAdapter,
        params: &PromptParams,
        model: &str,
        topic: &str,
    ) -> Result<DiagramArtifact> {
        let raw = adapter.invoke_with_model(params, model).await?;
        self.extractor.extract(&raw, adapter.kind(), topic)
    }

    fn record(&self, invocations: &mut Vec<ProviderInvocation>, invocation: ProviderInvocation) {
        if let Some(callback) = &self.options.on_attempt {
            callback(&invocation);
        }
        invocations.push(invocation);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Builder for [`DiagramOrchestrator`].
#[derive(Default)]
pub struct DiagramOrchestratorBuilder {
    illustration: Option<ProviderChain>,
    diagram: Option<ProviderChain>,
    prompts: Option<PromptBuilder>,
    extractor: Option<ArtifactExtractor>,
    options: OrchestratorOptions,
}

impl DiagramOrchestratorBuilder {
    pub fn illustration_chain(mut self, chain: ProviderChain) -> Self {
        self.illustration = Some(chain);
        self
    }

    pub fn diagram_chain(mut self, chain: ProviderChain) -> Self {
        self.diagram = Some(chain);
        self
    }

    pub fn prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = Some(prompts);
        self
    }

    pub fn extractor(mut self, extractor: ArtifactExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.options.attempt_timeout = timeout;
        self
    }

    pub fn random(mut self, random: RandomSource) -> Self {
        self.options.random = random;
        self
    }

    pub fn on_attempt(mut self, callback: AttemptCallback) -> Self {
        self.options.on_attempt = Some(callback);
        self
    }

    pub fn build(self) -> DiagramOrchestrator {
        DiagramOrchestrator {
            illustration: self.illustration,
            diagram: self.diagram,
            prompts: self.prompts.unwrap_or_default(),
            extractor: self.extractor.unwrap_or_default(),
            placeholder: PlaceholderSynthesizer::new(),
            options: self.options,
        }
    }
}

/// Adapter construction per enabled cargo feature.
mod wiring {
    use std::sync::Arc;

    use crate::config::DiagramConfig;
    use crate::error::Result;
    use crate::traits::ProviderAdapter;

    pub(super) type Slot = Option<Arc<dyn ProviderAdapter>>;

    pub(super) fn image_adapter(config: &DiagramConfig) -> Result<Slot> {
        use crate::config::ImageBackend;

        let adapter: Arc<dyn ProviderAdapter> = match config.image_backend {
            #[cfg(feature = "openai")]
            ImageBackend::OpenAi => Arc::new(crate::providers::OpenAiImageAdapter::new(
                config.openai.clone(),
            )?),
            #[cfg(feature = "bedrock")]
            ImageBackend::Bedrock => {
                Arc::new(crate::providers::BedrockStabilityAdapter::new(&config.bedrock)?)
            }
            #[allow(unreachable_patterns)]
            _ => return Ok(None),
        };
        Ok(Some(adapter))
    }

    #[cfg(feature = "anthropic")]
    pub(super) fn anthropic_adapter(config: &DiagramConfig) -> Result<Slot> {
        let adapter: Arc<dyn ProviderAdapter> =
            Arc::new(crate::providers::AnthropicAdapter::new(config.anthropic.clone())?);
        Ok(Some(adapter))
    }

    #[cfg(not(feature = "anthropic"))]
    pub(super) fn anthropic_adapter(_config: &DiagramConfig) -> Result<Slot> {
        Ok(None)
    }

    #[cfg(feature = "bedrock")]
    pub(super) fn bedrock_text_adapter(config: &DiagramConfig) -> Result<Slot> {
        let adapter: Arc<dyn ProviderAdapter> =
            Arc::new(crate::providers::BedrockAnthropicAdapter::new(&config.bedrock)?);
        Ok(Some(adapter))
    }

    #[cfg(not(feature = "bedrock"))]
    pub(super) fn bedrock_text_adapter(_config: &DiagramConfig) -> Result<Slot> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PromptParams;
    use crate::traits::RawResponse;
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixed {
        id: &'static str,
        kind: ProviderKind,
        body: serde_json::Value,
    }

    #[async_trait]
    impl ProviderAdapter for Fixed {
        fn provider_id(&self) -> &str {
            self.id
        }
        fn kind(&self) -> ProviderKind {
            self.kind
        }
        fn default_model(&self) -> &str {
            "m"
        }
        fn is_available(&self) -> bool {
            true
        }
        async fn invoke_with_model(&self, _params: &PromptParams, model_id: &str) -> Result<RawResponse> {
            Ok(RawResponse::new(self.id, model_id, self.body.clone()))
        }
    }

    fn text(id: &'static str, body: serde_json::Value) -> Arc<dyn ProviderAdapter> {
        Arc::new(Fixed {
            id,
            kind: ProviderKind::TextGeneration,
            body,
        })
    }

    #[tokio::test]
    async fn blank_topic_is_the_only_visible_error() {
        let orchestrator = DiagramOrchestrator::builder().build();
        let err = orchestrator
            .generate(&GenerationRequest::new("   ", "ctx"))
            .await
            .unwrap_err();
        assert!(matches!(err, DiagramError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn family_without_chain_degrades_without_attempts() {
        let orchestrator = DiagramOrchestrator::builder()
            .random(RandomSource::Seeded(1))
            .build();
        let outcome = orchestrator
            .generate_with_report(&GenerationRequest::new("Fractions", ""))
            .await
            .unwrap();
        assert!(outcome.artifact.is_degraded());
        assert!(outcome.invocations.is_empty());
    }

    #[tokio::test]
    async fn malformed_primary_falls_through_to_alternate() {
        let chain = ProviderChain::new(text("first", json!({"completion": "no markup here"})))
            .with_alternate(text("second", json!({"completion": "<svg><rect/></svg>"})));
        let orchestrator = DiagramOrchestrator::builder().diagram_chain(chain).build();
        let outcome = orchestrator
            .generate_with_report(&GenerationRequest::new("Vectors", ""))
            .await
            .unwrap();
        assert_eq!(outcome.artifact.provider_id.as_deref(), Some("second"));
        assert_eq!(outcome.artifact.markup, "<svg><rect/></svg>");
        assert_eq!(outcome.invocations.len(), 2);
        assert_eq!(
            outcome.invocations[0].error_class,
            Some(ErrorClass::MalformedResponse)
        );
        assert!(outcome.invocations[1].succeeded);
    }

    #[tokio::test]
    async fn handle_maps_blank_topic_to_error_status() {
        let orchestrator = DiagramOrchestrator::builder().build();
        let body: DiagramRequestBody =
            serde_json::from_value(json!({"subjectHint": "Math", "topic": "", "context": ""})).unwrap();
        let response = orchestrator.handle(body).await;
        assert_eq!(response.status, crate::types::ResponseStatus::Error);
        assert!(!response.markup.is_empty());
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn degraded_runs_are_logged_with_request_span() {
        let chain = ProviderChain::new(text("broken", json!({"content": []})));
        let orchestrator = DiagramOrchestrator::builder().diagram_chain(chain).build();
        let artifact = orchestrator
            .generate(&GenerationRequest::new("Isotopes", ""))
            .await
            .unwrap();
        assert!(artifact.is_degraded());
        assert!(logs_contain("diagram_generation"));
        assert!(logs_contain("attempt failed"));
        assert!(logs_contain("empty_result"));
        assert!(logs_contain("all providers failed, returning placeholder"));
    }

    #[test]
    fn from_slots_promotes_alternate() {
        let chain = ProviderChain::from_slots(None, Some(text("only", json!({})))).unwrap();
        assert_eq!(chain.primary().provider_id(), "only");
        assert!(chain.alternate().is_none());
        assert!(ProviderChain::from_slots(None, None).is_none());
    }

    #[test]
    fn default_config_wires_both_families() {
        let orchestrator = DiagramOrchestrator::from_config(&DiagramConfig::default()).unwrap();
        let illustration = orchestrator.chain(ArtifactFamily::Illustration).unwrap();
        assert_eq!(illustration.primary().provider_id(), "openai");
        assert_eq!(
            illustration.alternate().map(|a| a.provider_id()),
            Some("anthropic")
        );
        let diagram = orchestrator.chain(ArtifactFamily::Diagram).unwrap();
        assert_eq!(diagram.primary().provider_id(), "anthropic");
        assert_eq!(
            diagram.alternate().map(|a| a.provider_id()),
            Some("bedrock-anthropic")
        );
        assert!(diagram.shape().primary_has_fallback_model);
    }
}
