// src/analyze/mod.rs
//! Analysis pipeline: dictionary matcher, LLM intent classifier, and the policy that
//! chooses between them.

pub mod ai_adapter;
pub mod dictionary;
pub mod policy;
pub mod prompt;
pub mod providers;
pub mod response_parse;
pub mod types;

// Re-export convenient types.
pub use crate::analyze::ai_adapter::{AiClient, DisabledClient, DynAiClient, IntentClassifier};
pub use crate::analyze::dictionary::{analyze_text, DictionaryMatcher, DictionaryReport};
pub use crate::analyze::policy::{AnalysisMode, AnalysisPolicy, PolicyOutcome};
pub use crate::analyze::types::{
    AnalysisMethod, AnalysisResult, CategoryTag, DictionaryMatch, EmotionalTone, MatchSeverity,
    Severity,
};

/// Short anonymized id for log lines. Raw post text is never logged.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
