// src/scan/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyze::{AnalysisMethod, AnalysisResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetMetrics {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub retweets: u64,
    #[serde(default)]
    pub replies: u64,
}

/// Normalized tweet as delivered by a [`TweetSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetRecord {
    pub id: String,
    pub text: String,
    pub author_handle: String,
    #[serde(default)]
    pub author_bio: Option<String>,
    #[serde(default)]
    pub author_location: Option<String>,
    pub created_at: String, // as reported by the source
    #[serde(default)]
    pub metrics: TweetMetrics,
}

/// External tweet search. May fail or return nothing when rate-limited; the aggregator
/// treats both as "unavailable", never as "no matches".
#[async_trait::async_trait]
pub trait TweetSource: Send + Sync {
    async fn search(&self, query: &str, max_count: usize) -> Result<Vec<TweetRecord>>;
    fn name(&self) -> &'static str;
}

/// Campaign targets for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorInfo {
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// One ranked entry of a scan. Owned by the caller; nothing here is retained.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedItem {
    pub source_id: String,
    pub text: String,
    pub author: AuthorInfo,
    pub created_at: String,
    pub metrics: TweetMetrics,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    /// 1-based position after ranking.
    pub rank: usize,
}

impl FlaggedItem {
    pub fn new(tweet: TweetRecord, analysis: AnalysisResult) -> Self {
        Self {
            source_id: tweet.id,
            text: tweet.text,
            author: AuthorInfo {
                handle: tweet.author_handle,
                bio: tweet.author_bio.filter(|s| !s.is_empty()),
                location: tweet.author_location.filter(|s| !s.is_empty()),
            },
            created_at: tweet.created_at,
            metrics: tweet.metrics,
            analysis,
            rank: 0,
        }
    }
}

/// Marker used in place of a source name when the scan could not run.
pub const SOURCE_UNAVAILABLE: &str = "unavailable";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub flagged_items: Vec<FlaggedItem>,
    pub total_searched: usize,
    pub source: String,
    pub analysis_method: AnalysisMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub scanned_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn unavailable(analysis_method: AnalysisMethod) -> Self {
        Self {
            flagged_items: Vec::new(),
            total_searched: 0,
            source: SOURCE_UNAVAILABLE.to_string(),
            analysis_method,
            hint: Some(
                "Tweet source is temporarily unavailable (rate-limited or unreachable). Try again in a few seconds."
                    .to_string(),
            ),
            scanned_at: Utc::now(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.source == SOURCE_UNAVAILABLE
    }
}
