// src/config/service.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

pub const ENV_SERVICE_CONFIG_PATH: &str = "SERVICE_CONFIG_PATH";
pub const DEFAULT_SERVICE_CONFIG_PATH: &str = "config/service.toml";

const ENV_LLM_TIMEOUT_MS: &str = "LLM_TIMEOUT_MS";
const ENV_SCAN_CONCURRENCY: &str = "SCAN_CONCURRENCY";
const ENV_SCAN_MAX_TWEETS: &str = "SCAN_MAX_TWEETS";
const ENV_TWEET_FIXTURE_PATH: &str = "TWEET_FIXTURE_PATH";

// Provider calls must never stall a scan: keep the hard timeout in single-digit seconds.
const MIN_LLM_TIMEOUT_MS: u64 = 250;
const MAX_LLM_TIMEOUT_MS: u64 = 9_000;
const MAX_SCAN_CONCURRENCY: usize = 16;
const MAX_SCAN_TWEETS: usize = 100;

fn default_llm_timeout_ms() -> u64 {
    8_000
}
fn default_scan_concurrency() -> usize {
    4
}
fn default_scan_max_tweets() -> usize {
    20
}
fn default_true() -> bool {
    true
}

/// Runtime knobs that are not provider credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_llm_timeout_ms")]
    pub llm_timeout_ms: u64,
    #[serde(default = "default_scan_concurrency")]
    pub scan_concurrency: usize,
    #[serde(default = "default_scan_max_tweets")]
    pub scan_max_tweets: usize,
    /// Attach dictionary matches to LLM results for display.
    #[serde(default = "default_true")]
    pub attach_dictionary_matches: bool,
    #[serde(default)]
    pub tweet_fixture_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            llm_timeout_ms: default_llm_timeout_ms(),
            scan_concurrency: default_scan_concurrency(),
            scan_max_tweets: default_scan_max_tweets(),
            attach_dictionary_matches: true,
            tweet_fixture_path: None,
        }
    }
}

impl ServiceConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading service config from {}", path.display()))?;
        let cfg: ServiceConfig = toml::from_str(&content)
            .with_context(|| format!("parsing service config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Resolution order:
    /// 1) $SERVICE_CONFIG_PATH (must exist)
    /// 2) config/service.toml (optional)
    /// 3) built-in defaults
    ///
    /// Env overrides are applied on top, then values are clamped.
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = env::var(ENV_SERVICE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("SERVICE_CONFIG_PATH points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else {
            let pb = PathBuf::from(DEFAULT_SERVICE_CONFIG_PATH);
            if pb.exists() {
                Self::load_from_file(&pb)?
            } else {
                Self::default()
            }
        };
        Ok(base.with_env_overrides().sanitized())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(v) = parse_env::<u64>(ENV_LLM_TIMEOUT_MS) {
            self.llm_timeout_ms = v;
        }
        if let Some(v) = parse_env::<usize>(ENV_SCAN_CONCURRENCY) {
            self.scan_concurrency = v;
        }
        if let Some(v) = parse_env::<usize>(ENV_SCAN_MAX_TWEETS) {
            self.scan_max_tweets = v;
        }
        if let Ok(p) = env::var(ENV_TWEET_FIXTURE_PATH) {
            if !p.trim().is_empty() {
                self.tweet_fixture_path = Some(PathBuf::from(p.trim()));
            }
        }
        self
    }

    fn sanitized(mut self) -> Self {
        self.llm_timeout_ms = self
            .llm_timeout_ms
            .clamp(MIN_LLM_TIMEOUT_MS, MAX_LLM_TIMEOUT_MS);
        self.scan_concurrency = self.scan_concurrency.clamp(1, MAX_SCAN_CONCURRENCY);
        self.scan_max_tweets = self.scan_max_tweets.clamp(1, MAX_SCAN_TWEETS);
        self
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_millis(self.llm_timeout_ms)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(target: "config", var = name, value = %raw, "ignoring unparsable env override");
            None
        }
    }
}
