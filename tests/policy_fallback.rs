// tests/policy_fallback.rs
//
// Decision core: availability gate, LLM authority, and unconditional fallback.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hate_speech_monitor::analyze::{
    AiClient, AnalysisMethod, AnalysisMode, AnalysisPolicy, AnalysisResult, CategoryTag,
    EmotionalTone, Severity,
};
use hate_speech_monitor::config::{ProviderConfig, ProviderKind};

/// Counts calls and returns a canned verdict (or nothing).
struct StubClient {
    calls: AtomicUsize,
    verdict: Option<AnalysisResult>,
}

impl StubClient {
    fn new(verdict: Option<AnalysisResult>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            verdict,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AiClient for StubClient {
    fn analyze<'a>(
        &'a self,
        _input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AnalysisResult>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let out = self.verdict.clone();
        Box::pin(async move { out })
    }
    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

fn llm_verdict() -> AnalysisResult {
    AnalysisResult {
        score: 0.12,
        is_hate_speech: false,
        categories: vec![],
        severity: Severity::None,
        method: AnalysisMethod::Llm,
        target_group: None,
        emotional_tone: Some(EmotionalTone::Condemning),
        intent: Some("condemn racism".into()),
        explanation: Some("counter-speech".into()),
    }
}

fn configured() -> ProviderConfig {
    ProviderConfig::new(ProviderKind::OpenRouter, Some("test-key".into()), None)
}

const COUNTER_SPEECH: &str = "white supremacy must be stopped";

#[tokio::test]
async fn provider_none_never_calls_the_llm() {
    let stub = StubClient::new(Some(llm_verdict()));
    let policy = AnalysisPolicy::new(ProviderConfig::disabled(), stub.clone());

    let out = policy.analyze(COUNTER_SPEECH).await;
    assert_eq!(out.result.method, AnalysisMethod::Dictionary);
    assert_eq!(out.provider, None);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn key_without_provider_and_provider_without_key_are_unavailable() {
    for cfg in [
        ProviderConfig::new(ProviderKind::None, Some("k".into()), None),
        ProviderConfig::new(ProviderKind::Anthropic, None, None),
    ] {
        let stub = StubClient::new(Some(llm_verdict()));
        let policy = AnalysisPolicy::new(cfg, stub.clone());
        let out = policy.analyze("anything").await;
        assert_eq!(out.result.method, AnalysisMethod::Dictionary);
        assert_eq!(stub.calls(), 0);
    }
}

#[tokio::test]
async fn llm_none_falls_back_to_dictionary() {
    let stub = StubClient::new(None);
    let policy = AnalysisPolicy::new(configured(), stub.clone());

    let out = policy.analyze(COUNTER_SPEECH).await;
    assert_eq!(stub.calls(), 1, "exactly one LLM attempt, no retry");
    assert_eq!(out.result.method, AnalysisMethod::Dictionary);
    assert!(out.result.is_hate_speech);
    assert_eq!(out.result.is_hate_speech, out.result.score > 0.3);
    assert_eq!(out.result.categories, vec![CategoryTag::Racial]);
    assert_eq!(out.dictionary_matches.len(), 2);
}

#[tokio::test]
async fn llm_verdict_is_authoritative() {
    let stub = StubClient::new(Some(llm_verdict()));
    let policy = AnalysisPolicy::new(configured(), stub.clone());

    let out = policy.analyze(COUNTER_SPEECH).await;
    assert_eq!(stub.calls(), 1);
    assert_eq!(out.result, llm_verdict());
    assert_eq!(out.provider.as_deref(), Some("openrouter"));
    // Display-only keyword spans; they did not move the score.
    assert_eq!(out.dictionary_matches.len(), 2);
    assert!(!out.result.is_hate_speech);
}

#[tokio::test]
async fn display_matches_can_be_skipped() {
    let stub = StubClient::new(Some(llm_verdict()));
    let policy = AnalysisPolicy::new(configured(), stub).with_dictionary_matches(false);
    let out = policy.analyze(COUNTER_SPEECH).await;
    assert_eq!(out.result.method, AnalysisMethod::Llm);
    assert!(out.dictionary_matches.is_empty());
}

#[tokio::test]
async fn dictionary_only_mode_skips_the_llm() {
    let stub = StubClient::new(Some(llm_verdict()));
    let policy = AnalysisPolicy::new(configured(), stub.clone());
    let out = policy
        .analyze_with(COUNTER_SPEECH, AnalysisMode::DictionaryOnly)
        .await;
    assert_eq!(out.result.method, AnalysisMethod::Dictionary);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn concurrent_analyses_share_one_policy() {
    let stub = StubClient::new(None);
    let policy = Arc::new(AnalysisPolicy::new(configured(), stub.clone()));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let p = policy.clone();
            tokio::spawn(async move { p.analyze(&format!("post {i} about racism")).await })
        })
        .collect();

    for h in handles {
        let out = h.await.unwrap();
        assert_eq!(out.result.method, AnalysisMethod::Dictionary);
        assert!((0.0..=1.0).contains(&out.result.score));
    }
    assert_eq!(stub.calls(), 16);
}

#[tokio::test]
async fn serialized_outcome_is_flat_and_camel_case() {
    let policy = AnalysisPolicy::new(ProviderConfig::disabled(), StubClient::new(None));
    let out = policy.analyze("you bigot").await;
    let v = serde_json::to_value(&out).unwrap();
    assert_eq!(v["method"], "dictionary");
    assert!(v.get("isHateSpeech").is_some());
    assert_eq!(v["dictionaryMatches"][0]["category"], "other");
    assert!(v.get("provider").is_none());
}
