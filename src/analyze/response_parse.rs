// src/analyze/response_parse.rs
//! Tolerant extraction of the classifier's JSON verdict from raw model output.
//!
//! Models wrap JSON in code fences, prepend prose, return numbers as strings or omit
//! fields. Steps:
//! 1) strip a ```/```json fence if present
//! 2) take the first balanced `{...}` block (string-literal aware)
//! 3) parse into `serde_json::Value`
//! 4) coerce every field on its own, falling back to neutral defaults
//!
//! Only steps 2–3 can fail; a bad individual field never does.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::types::{
    push_unique, AnalysisMethod, AnalysisResult, CategoryTag, EmotionalTone, Severity,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no JSON object found in model output")]
    NoObject,
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("top-level JSON value is not an object")]
    NotAnObject,
}

static RE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("fence regex"));

/// Remove a markdown code fence, returning the fenced body (or the trimmed input).
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match RE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => trimmed,
    }
}

/// First balanced `{...}` block. Braces inside string literals are ignored.
pub fn first_balanced_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in s[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&s[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Full chain: fence → balanced object → JSON → coerced verdict.
pub fn parse_llm_response(raw: &str) -> Result<AnalysisResult, ParseError> {
    let body = strip_code_fence(raw);
    let object = first_balanced_object(body).ok_or(ParseError::NoObject)?;
    let value: Value =
        serde_json::from_str(object).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(coerce_verdict(&map)),
        _ => Err(ParseError::NotAnObject),
    }
}

fn coerce_verdict(map: &Map<String, Value>) -> AnalysisResult {
    let score = field(map, &["confidence", "score"])
        .and_then(as_f32)
        .map(clamp01)
        .unwrap_or(0.0);

    let is_hate_speech = field(map, &["isHateSpeech", "is_hate_speech"])
        .and_then(as_bool)
        .unwrap_or(false);

    let categories = field(map, &["categories", "category"])
        .map(as_categories)
        .unwrap_or_default();

    let severity = field(map, &["severity"])
        .and_then(Value::as_str)
        .map(Severity::from_loose)
        .unwrap_or_default();

    let emotional_tone = field(map, &["emotionalTone", "emotional_tone", "tone"])
        .and_then(Value::as_str)
        .map(EmotionalTone::from_loose)
        .unwrap_or_default();

    AnalysisResult {
        score,
        is_hate_speech,
        categories,
        severity,
        method: AnalysisMethod::Llm,
        target_group: field(map, &["targetGroup", "target_group"]).and_then(as_text),
        emotional_tone: Some(emotional_tone),
        intent: Some(
            field(map, &["intent"])
                .and_then(as_text)
                .unwrap_or_default(),
        ),
        explanation: Some(
            field(map, &["explanation", "reason"])
                .and_then(as_text)
                .unwrap_or_default(),
        ),
    }
}

fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| map.get(*k)).filter(|v| !v.is_null())
}

fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

fn as_f32(v: &Value) -> Option<f32> {
    match v {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        Value::String(s) => s.trim().parse::<f32>().ok(),
        _ => None,
    }
}

fn as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    }
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn as_categories(v: &Value) -> Vec<CategoryTag> {
    let mut out = Vec::new();
    match v {
        Value::Array(items) => {
            for tag in items.iter().filter_map(Value::as_str) {
                if !tag.trim().is_empty() {
                    push_unique(&mut out, CategoryTag::from_loose(tag));
                }
            }
        }
        Value::String(s) if !s.trim().is_empty() => {
            push_unique(&mut out, CategoryTag::from_loose(s));
        }
        _ => {}
    }
    out
}
