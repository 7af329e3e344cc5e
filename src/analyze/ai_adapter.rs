//! AI adapter: LLM intent classifier behind a provider abstraction.
//!
//! The classifier never fails towards its caller. No provider, a transport error, a
//! non-2xx status, a timeout or unparsable output all collapse into `None`, which is the
//! policy's trigger for the dictionary fallback.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tracing::{debug, warn};

use super::anon_hash;
use super::prompt::Prompt;
use super::providers::{
    AnthropicProvider, LlmError, LlmProvider, OpenAiProvider, OpenRouterProvider,
};
use super::response_parse::parse_llm_response;
use super::types::AnalysisResult;
use crate::config::{ProviderConfig, ProviderKind};

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Trait object used by the policy (and replaced by stubs in tests).
pub trait AiClient: Send + Sync {
    /// Classify `input`; `None` means "no usable LLM verdict".
    fn analyze<'a>(
        &'a self,
        input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AnalysisResult>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type DynAiClient = Arc<dyn AiClient>;

/// Factory: build a client according to the provider config.
///
/// * Unavailable config (no provider or no key) → [`DisabledClient`].
/// * HTTP client construction failure → logged, [`DisabledClient`].
/// * Otherwise the matching provider wrapped in an [`IntentClassifier`].
pub fn build_client_from_config(config: &ProviderConfig, timeout: Duration) -> DynAiClient {
    let http = match build_http_client(timeout) {
        Ok(http) => http,
        Err(e) => {
            warn!(target: "llm", error = %e, "failed to build HTTP client; LLM path disabled");
            return Arc::new(DisabledClient);
        }
    };
    match build_provider(config, http) {
        Some(provider) => Arc::new(IntentClassifier::new(provider, timeout)),
        None => Arc::new(DisabledClient),
    }
}

/// One implementation per provider tag. `None` when the config is not available.
pub fn build_provider(config: &ProviderConfig, http: reqwest::Client) -> Option<Arc<dyn LlmProvider>> {
    if !config.is_available() {
        return None;
    }
    let api_key = config.api_key.clone()?;
    let model = config.effective_model()?.to_string();
    let base_url = config.effective_base_url()?.to_string();

    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderKind::OpenRouter => {
            Arc::new(OpenRouterProvider::new(http, api_key, model, base_url))
        }
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(http, api_key, model, base_url)),
        ProviderKind::Anthropic => {
            Arc::new(AnthropicProvider::new(http, api_key, model, base_url))
        }
        ProviderKind::None => return None,
    };
    Some(provider)
}

fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("hate-speech-monitor/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(timeout.min(Duration::from_secs(4)))
        .timeout(timeout)
        .build()
}

// ------------------------------------------------------------
// Clients
// ------------------------------------------------------------

/// Returns `None` always; used when no provider is configured.
pub struct DisabledClient;

impl AiClient for DisabledClient {
    fn analyze<'a>(
        &'a self,
        _input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AnalysisResult>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Prompt → provider call (hard timeout) → tolerant parse.
pub struct IntentClassifier {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl IntentClassifier {
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    async fn classify(&self, input: &str) -> Result<AnalysisResult, LlmError> {
        let prompt = Prompt::for_post(input);
        let raw = tokio::time::timeout(self.timeout, self.provider.complete(&prompt))
            .await
            .map_err(|_| LlmError::Timeout)??;
        Ok(parse_llm_response(&raw)?)
    }

    async fn analyze_impl(&self, input: &str) -> Option<AnalysisResult> {
        let provider = self.provider.name();
        let id = anon_hash(input);
        let t0 = Instant::now();

        let outcome = self.classify(input).await;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("llm_latency_ms", "provider" => provider).record(ms);

        match outcome {
            Ok(result) => {
                debug!(
                    target: "llm",
                    %id, provider,
                    score = result.score,
                    hate = result.is_hate_speech,
                    ms,
                    "LLM verdict"
                );
                Some(result)
            }
            Err(e) => {
                warn!(target: "llm", %id, provider, kind = e.kind(), error = %e, "LLM analysis failed");
                counter!("llm_failures_total", "provider" => provider, "kind" => e.kind())
                    .increment(1);
                None
            }
        }
    }
}

impl AiClient for IntentClassifier {
    fn analyze<'a>(
        &'a self,
        input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AnalysisResult>> + Send + 'a>> {
        Box::pin(self.analyze_impl(input))
    }
    fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}
