// src/config/llm.rs
use serde::{Deserialize, Serialize};
use std::{env, fmt};

pub const ENV_LLM_PROVIDER: &str = "LLM_PROVIDER";
pub const ENV_LLM_API_KEY: &str = "LLM_API_KEY";
pub const ENV_LLM_MODEL: &str = "LLM_MODEL";
pub const ENV_LLM_BASE_URL: &str = "LLM_BASE_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    None,
    OpenRouter,
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// Case-insensitive. Unknown names are treated as `None` (unavailable).
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "openrouter" => ProviderKind::OpenRouter,
            "openai" => ProviderKind::OpenAi,
            "anthropic" | "claude" => ProviderKind::Anthropic,
            "" | "none" => ProviderKind::None,
            other => {
                tracing::warn!(target: "config", provider = other, "unknown LLM provider; LLM path disabled");
                ProviderKind::None
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::None => "none",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            ProviderKind::None => None,
            ProviderKind::OpenRouter => Some("arcee-ai/trinity-large-preview:free"),
            ProviderKind::OpenAi => Some("gpt-4o-mini"),
            ProviderKind::Anthropic => Some("claude-sonnet-4-6"),
        }
    }

    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ProviderKind::None => None,
            ProviderKind::OpenRouter => Some("https://openrouter.ai/api/v1"),
            ProviderKind::OpenAi => Some("https://api.openai.com/v1"),
            ProviderKind::Anthropic => Some("https://api.anthropic.com/v1"),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which LLM provider to call and with what credentials. Read-only once built.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

// Hand-written so the key never reaches logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_key_len", &self.api_key.as_ref().map(String::len))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(provider: ProviderKind, api_key: Option<String>, model: Option<String>) -> Self {
        Self {
            provider,
            api_key: non_empty(api_key),
            model: non_empty(model),
            base_url: None,
        }
    }

    /// No provider at all: the dictionary path is the only path.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = non_empty(Some(url.into()));
        self
    }

    /// Read `LLM_PROVIDER`, `LLM_API_KEY`, `LLM_MODEL`, `LLM_BASE_URL`.
    /// Empty values count as absent.
    pub fn from_env() -> Self {
        let provider = env::var(ENV_LLM_PROVIDER)
            .map(|p| ProviderKind::parse(&p))
            .unwrap_or_default();
        let mut cfg = Self::new(
            provider,
            env::var(ENV_LLM_API_KEY).ok(),
            env::var(ENV_LLM_MODEL).ok(),
        );
        cfg.base_url = non_empty(env::var(ENV_LLM_BASE_URL).ok());
        cfg
    }

    /// `provider != none && api_key present`.
    pub fn is_available(&self) -> bool {
        self.provider != ProviderKind::None && self.api_key.is_some()
    }

    pub fn effective_model(&self) -> Option<&str> {
        self.model
            .as_deref()
            .or_else(|| self.provider.default_model())
    }

    pub fn effective_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .or_else(|| self.provider.default_base_url())
            .map(|u| u.trim_end_matches('/'))
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
