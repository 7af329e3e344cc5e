// src/analyze/policy.rs
//! Decision core: LLM first when available, unconditional dictionary fallback otherwise.
//!
//! Two tiers, no retry loop. At most one LLM call per analyzed text; a `None` from the
//! classifier (for any reason) drops straight to the dictionary matcher.

use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use tracing::debug;

use super::ai_adapter::{build_client_from_config, DynAiClient};
use super::anon_hash;
use super::dictionary::DictionaryMatcher;
use super::types::{AnalysisMethod, AnalysisResult, DictionaryMatch};
use crate::config::ProviderConfig;

/// Caller preference for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    /// LLM when configured, dictionary otherwise.
    #[default]
    Auto,
    /// Skip the LLM even when configured.
    DictionaryOnly,
}

/// Normalized response of the decision core.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyOutcome {
    #[serde(flatten)]
    pub result: AnalysisResult,
    /// Matched keyword spans. Authoritative for dictionary results, display-only for LLM ones.
    pub dictionary_matches: Vec<DictionaryMatch>,
    /// Provider that produced an LLM result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

pub struct AnalysisPolicy {
    config: ProviderConfig,
    client: DynAiClient,
    dictionary: DictionaryMatcher,
    attach_dictionary_matches: bool,
}

impl AnalysisPolicy {
    /// Policy over an explicit client (tests inject stubs here).
    pub fn new(config: ProviderConfig, client: DynAiClient) -> Self {
        Self {
            config,
            client,
            dictionary: DictionaryMatcher::new(),
            attach_dictionary_matches: true,
        }
    }

    /// Policy with the provider client built from `config`.
    pub fn from_config(config: ProviderConfig, timeout: Duration) -> Self {
        let client = build_client_from_config(&config, timeout);
        Self::new(config, client)
    }

    pub fn with_dictionary_matches(mut self, attach: bool) -> Self {
        self.attach_dictionary_matches = attach;
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn llm_available(&self) -> bool {
        self.config.is_available()
    }

    /// Method a request in `Auto` mode will try first.
    pub fn preferred_method(&self) -> AnalysisMethod {
        if self.llm_available() {
            AnalysisMethod::Llm
        } else {
            AnalysisMethod::Dictionary
        }
    }

    pub async fn analyze(&self, text: &str) -> PolicyOutcome {
        self.analyze_with(text, AnalysisMode::Auto).await
    }

    pub async fn analyze_with(&self, text: &str, mode: AnalysisMode) -> PolicyOutcome {
        if mode == AnalysisMode::Auto && self.llm_available() {
            if let Some(result) = self.client.analyze(text).await {
                counter!("analysis_total", "method" => "llm").increment(1);
                let dictionary_matches = if self.attach_dictionary_matches {
                    self.dictionary.analyze(text).matches
                } else {
                    Vec::new()
                };
                return PolicyOutcome {
                    result,
                    dictionary_matches,
                    provider: Some(self.config.provider.as_str().to_string()),
                };
            }
            debug!(target: "analysis", id = %anon_hash(text), "LLM returned nothing; dictionary fallback");
        }

        counter!("analysis_total", "method" => "dictionary").increment(1);
        let (result, dictionary_matches) = self.dictionary.analyze(text).into_result();
        PolicyOutcome {
            result,
            dictionary_matches,
            provider: None,
        }
    }
}
