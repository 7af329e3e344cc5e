// src/analyze/dictionary.rs
//! Lexicon/pattern matcher: the deterministic, zero-cost analysis path.
//!
//! Every entry groups a few case-insensitive patterns under one category and severity.
//! Each pattern contributes at most one match (its first hit). Overlapping patterns are
//! counted independently, so redundant alarm phrases raise the score additively.
//!
//! score = min(1, Σ weight(severity) / 3)

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::types::{
    push_unique, AnalysisMethod, AnalysisResult, CategoryTag, DictionaryMatch, MatchSeverity,
    Severity,
};

/// Dictionary results above this score are labelled hate speech.
pub const HATE_SPEECH_THRESHOLD: f32 = 0.3;
/// Above this score the dictionary severity bucket is `high`.
pub const HIGH_SEVERITY_THRESHOLD: f32 = 0.7;
/// Three high-severity matches saturate the score.
pub const SATURATION_DIVISOR: f32 = 3.0;
/// Characters of surrounding text kept on each side of a match.
pub const CONTEXT_CHARS: usize = 30;

struct DictionaryEntry {
    patterns: Vec<Regex>,
    category: CategoryTag,
    severity: MatchSeverity,
}

const ENTRIES: &[(&[&str], CategoryTag, MatchSeverity)] = &[
    (
        &[r"\bracis[tm]\b", r"\bwhite\s*suprem", r"\bethnic\s*cleansing", r"\brace\s*war"],
        CategoryTag::Racial,
        MatchSeverity::High,
    ),
    (
        &[r"\bracial\s*slur", r"\bskin\s*color", r"\bcoloris[tm]"],
        CategoryTag::Racial,
        MatchSeverity::Medium,
    ),
    (
        &[r"\bxenophob", r"\bgo\s*back\s*to\s*your", r"\billegal\s*alien", r"\bforeigner"],
        CategoryTag::Xenophobic,
        MatchSeverity::Medium,
    ),
    (
        &[r"\banti[\s-]*semit", r"\bislamophob", r"\breligious\s*hate"],
        CategoryTag::Religious,
        MatchSeverity::High,
    ),
    (
        &[r"\bsexis[tm]\b", r"\bmisogyn", r"\bmisandr"],
        CategoryTag::Gender,
        MatchSeverity::Medium,
    ),
    (
        &[r"\bhomophob", r"\btransphob", r"\banti[\s-]*lgbtq?"],
        CategoryTag::SexualOrientation,
        MatchSeverity::High,
    ),
    (
        &[r"\bableism\b", r"\bableist\b"],
        CategoryTag::Disability,
        MatchSeverity::Medium,
    ),
    (
        &[r"\bhate\s*speech", r"\bbigot", r"\bdiscriminat", r"\bprejudic"],
        CategoryTag::Other,
        MatchSeverity::Medium,
    ),
    (
        &[r"\bsupremac", r"\bgenocid", r"\bethnocid"],
        CategoryTag::Racial,
        MatchSeverity::High,
    ),
];

static DICTIONARY: Lazy<Vec<DictionaryEntry>> = Lazy::new(|| {
    ENTRIES
        .iter()
        .map(|(patterns, category, severity)| DictionaryEntry {
            patterns: patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){p}")).expect("dictionary pattern"))
                .collect(),
            category: *category,
            severity: *severity,
        })
        .collect()
});

/// Output of a single dictionary scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryReport {
    pub score: f32,
    pub matches: Vec<DictionaryMatch>,
    pub categories: Vec<CategoryTag>,
}

impl DictionaryReport {
    pub fn is_hate_speech(&self) -> bool {
        self.score > HATE_SPEECH_THRESHOLD
    }

    pub fn severity(&self) -> Severity {
        severity_bucket(self.score)
    }

    /// Canonical result plus the matches that explain it.
    pub fn into_result(self) -> (AnalysisResult, Vec<DictionaryMatch>) {
        let result = AnalysisResult {
            score: self.score,
            is_hate_speech: self.is_hate_speech(),
            categories: self.categories.clone(),
            severity: self.severity(),
            method: AnalysisMethod::Dictionary,
            target_group: None,
            emotional_tone: None,
            intent: None,
            explanation: None,
        };
        (result, self.matches)
    }
}

/// Stateless matcher over the built-in lexicon.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictionaryMatcher;

impl DictionaryMatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, text: &str) -> DictionaryReport {
        analyze_text(text)
    }
}

/// Scan `text` against every dictionary pattern.
pub fn analyze_text(text: &str) -> DictionaryReport {
    let mut matches = Vec::new();

    for entry in DICTIONARY.iter() {
        for pattern in &entry.patterns {
            if let Some(m) = pattern.find(text) {
                matches.push(DictionaryMatch {
                    word: m.as_str().to_string(),
                    category: entry.category,
                    severity: entry.severity,
                    context: context_window(text, m.start(), m.end()),
                });
            }
        }
    }

    let mut categories = Vec::new();
    for m in &matches {
        push_unique(&mut categories, m.category);
    }

    let raw: f32 = matches.iter().map(|m| m.severity.weight()).sum();
    let score = (raw / SATURATION_DIVISOR).min(1.0);

    DictionaryReport {
        score,
        matches,
        categories,
    }
}

/// `>0.7 → high`, `>0.3 → medium`, otherwise `low`.
pub fn severity_bucket(score: f32) -> Severity {
    if score > HIGH_SEVERITY_THRESHOLD {
        Severity::High
    } else if score > HATE_SPEECH_THRESHOLD {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Up to [`CONTEXT_CHARS`] characters on each side of the byte span `start..end`.
fn context_window(text: &str, start: usize, end: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let to = text[end..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    text[from..to].to_string()
}
