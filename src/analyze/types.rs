// src/analyze/types.rs
//! Canonical result shapes shared by the dictionary path, the LLM path and the policy.

use serde::{Deserialize, Serialize};

/// Protected-identity target categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryTag {
    Racial,
    Religious,
    Gender,
    SexualOrientation,
    Disability,
    Xenophobic,
    Other,
}

impl CategoryTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryTag::Racial => "racial",
            CategoryTag::Religious => "religious",
            CategoryTag::Gender => "gender",
            CategoryTag::SexualOrientation => "sexual_orientation",
            CategoryTag::Disability => "disability",
            CategoryTag::Xenophobic => "xenophobic",
            CategoryTag::Other => "other",
        }
    }

    /// Lenient parse used on model output: case, spaces and hyphens are ignored.
    /// Anything unrecognized lands in `Other`.
    pub fn from_loose(raw: &str) -> Self {
        let key: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        match key.as_str() {
            "racial" | "race" | "racism" => CategoryTag::Racial,
            "religious" | "religion" => CategoryTag::Religious,
            "gender" | "sexism" => CategoryTag::Gender,
            "sexual_orientation" | "lgbtq" | "lgbt" => CategoryTag::SexualOrientation,
            "disability" | "ableism" => CategoryTag::Disability,
            "xenophobic" | "xenophobia" => CategoryTag::Xenophobic,
            _ => CategoryTag::Other,
        }
    }
}

/// Severity attached to a single dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSeverity {
    Low,
    Medium,
    High,
}

impl MatchSeverity {
    /// Contribution of one match to the raw dictionary score.
    pub fn weight(&self) -> f32 {
        match self {
            MatchSeverity::Low => 0.2,
            MatchSeverity::Medium => 0.5,
            MatchSeverity::High => 1.0,
        }
    }
}

/// Coarse severity tier of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_loose(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Severity::Low,
            "medium" | "moderate" => Severity::Medium,
            "high" | "severe" | "critical" => Severity::High,
            _ => Severity::None,
        }
    }
}

/// Which path produced an [`AnalysisResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMethod {
    Dictionary,
    Llm,
}

impl AnalysisMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMethod::Dictionary => "dictionary",
            AnalysisMethod::Llm => "llm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalTone {
    Hateful,
    Hostile,
    #[default]
    Neutral,
    Supportive,
    Condemning,
}

impl EmotionalTone {
    pub fn from_loose(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hateful" => EmotionalTone::Hateful,
            "hostile" => EmotionalTone::Hostile,
            "supportive" => EmotionalTone::Supportive,
            "condemning" => EmotionalTone::Condemning,
            _ => EmotionalTone::Neutral,
        }
    }
}

/// One lexicon hit. Lives only for the duration of a single scan of a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryMatch {
    pub word: String,
    pub category: CategoryTag,
    pub severity: MatchSeverity,
    pub context: String,
}

/// Canonical assessment returned by both analysis paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub score: f32,
    pub is_hate_speech: bool,
    pub categories: Vec<CategoryTag>,
    pub severity: Severity,
    pub method: AnalysisMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_tone: Option<EmotionalTone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Push `tag` unless it is already present, keeping first-seen order.
pub fn push_unique(categories: &mut Vec<CategoryTag>, tag: CategoryTag) {
    if !categories.contains(&tag) {
        categories.push(tag);
    }
}
