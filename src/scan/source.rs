// src/scan/source.rs
//! Tweet sources available in-process. The live guest-token client lives outside this
//! crate and plugs in through [`TweetSource`].

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::fs;
use std::path::Path;

use crate::scan::types::{TweetRecord, TweetSource};

/// Tweets loaded from a JSON array (fixture file or inline content).
/// Search returns tweets containing any query term, case-insensitively.
pub struct FixtureTweetSource {
    tweets: Vec<TweetRecord>,
}

impl FixtureTweetSource {
    pub fn new(tweets: Vec<TweetRecord>) -> Self {
        Self { tweets }
    }

    pub fn from_fixture(content: &str) -> Result<Self> {
        let tweets: Vec<TweetRecord> =
            serde_json::from_str(content).context("parsing tweet fixture json")?;
        Ok(Self::new(tweets))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading tweet fixture from {}", path.display()))?;
        Self::from_fixture(&content)
    }
}

#[async_trait]
impl TweetSource for FixtureTweetSource {
    async fn search(&self, query: &str, max_count: usize) -> Result<Vec<TweetRecord>> {
        let terms = query_terms(query);
        Ok(self
            .tweets
            .iter()
            .filter(|t| {
                let text = t.text.to_lowercase();
                terms.is_empty() || terms.iter().any(|term| text.contains(term.as_str()))
            })
            .take(max_count)
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

/// Stand-in when no tweet source is configured: every search fails.
pub struct UnavailableSource;

#[async_trait]
impl TweetSource for UnavailableSource {
    async fn search(&self, _query: &str, _max_count: usize) -> Result<Vec<TweetRecord>> {
        Err(anyhow!("no tweet source configured"))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

/// Split an `A OR B` query into lowercase terms without quotes or leading `#`.
fn query_terms(query: &str) -> Vec<String> {
    query
        .split(" OR ")
        .map(|t| t.trim().trim_matches('"').trim_start_matches('#').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
