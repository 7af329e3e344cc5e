// src/scan/mod.rs
//! Campaign scan aggregator: search → normalize → analyze (bounded fan-out) → filter → rank.
//!
//! Dedup against previously stored items is the storage layer's job (by tweet id); a
//! scan may legitimately return ids already seen in an earlier run.

pub mod source;
pub mod types;

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use metrics::{counter, gauge};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyze::{AnalysisPolicy, AnalysisResult};
use crate::metrics::ensure_metrics_described;
use crate::scan::types::{FlaggedItem, ScanReport, ScanRequest, TweetRecord, TweetSource};

/// Looser than the hate-speech threshold: borderline posts surface for human review.
pub const FLAG_THRESHOLD: f32 = 0.15;

const MAX_TWEET_CHARS: usize = 1500;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("keywords or hashtags required")]
    EmptyQuery,
}

/// Inclusion rule: `score > 0.15 || categories non-empty`.
pub fn is_flagged(result: &AnalysisResult) -> bool {
    result.score > FLAG_THRESHOLD || !result.categories.is_empty()
}

/// Keywords are double-quoted, hashtags get a `#`, terms are joined with ` OR `.
pub fn build_query(request: &ScanRequest) -> Result<String, ScanError> {
    let keywords = request
        .keywords
        .iter()
        .map(|k| k.trim().replace('"', ""))
        .filter(|k| !k.is_empty())
        .map(|k| format!("\"{k}\""));
    let hashtags = request
        .hashtags
        .iter()
        .map(|h| h.trim())
        .filter(|h| !h.trim_start_matches('#').is_empty())
        .map(|h| {
            if h.starts_with('#') {
                h.to_string()
            } else {
                format!("#{h}")
            }
        });
    let terms: Vec<String> = keywords.chain(hashtags).collect();
    if terms.is_empty() {
        return Err(ScanError::EmptyQuery);
    }
    Ok(terms.join(" OR "))
}

/// Decode HTML entities, collapse whitespace, trim, cap length.
pub fn normalize_tweet_text(s: &str) -> String {
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
    let decoded = html_escape::decode_html_entities(s);
    let collapsed = RE_WS.replace_all(&decoded, " ");
    let trimmed = collapsed.trim();
    if trimmed.chars().count() > MAX_TWEET_CHARS {
        trimmed.chars().take(MAX_TWEET_CHARS).collect()
    } else {
        trimmed.to_string()
    }
}

pub struct ScanAggregator {
    policy: Arc<AnalysisPolicy>,
    concurrency: usize,
    max_tweets: usize,
}

impl ScanAggregator {
    pub fn new(policy: Arc<AnalysisPolicy>, concurrency: usize, max_tweets: usize) -> Self {
        Self {
            policy,
            concurrency: concurrency.max(1),
            max_tweets: max_tweets.max(1),
        }
    }

    /// Full scan against `source`. Only an empty query is an error; a failing or empty
    /// source yields [`ScanReport::unavailable`].
    pub async fn scan(
        &self,
        source: &dyn TweetSource,
        request: &ScanRequest,
    ) -> Result<ScanReport, ScanError> {
        ensure_metrics_described();
        let query = build_query(request)?;
        let analysis_method = self.policy.preferred_method();

        let tweets = match source.search(&query, self.max_tweets).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(target: "scan", source = source.name(), error = ?e, "tweet source failed");
                Vec::new()
            }
        };

        if tweets.is_empty() {
            counter!("scan_runs_total", "source" => "unavailable").increment(1);
            tracing::info!(target: "scan", source = source.name(), "scan could not run: no tweets");
            return Ok(ScanReport::unavailable(analysis_method));
        }

        // Counts what the source returned, including tweets dropped for empty text.
        let total_searched = tweets.len();
        let flagged_items = self.rank(tweets).await;

        counter!("scan_runs_total", "source" => source.name()).increment(1);
        counter!("scan_flagged_total").increment(flagged_items.len() as u64);
        let report = ScanReport {
            flagged_items,
            total_searched,
            source: source.name().to_string(),
            analysis_method,
            hint: None,
            scanned_at: chrono::Utc::now(),
        };
        gauge!("scan_last_run_ts").set(report.scanned_at.timestamp() as f64);

        tracing::info!(
            target: "scan",
            source = source.name(),
            searched = total_searched,
            flagged = report.flagged_items.len(),
            method = analysis_method.as_str(),
            "scan finished"
        );
        Ok(report)
    }

    /// Analyze every tweet once, keep flagged ones, sort by score descending.
    /// Ties keep arrival order.
    pub async fn rank(&self, tweets: Vec<TweetRecord>) -> Vec<FlaggedItem> {
        let policy = self.policy.as_ref();

        let mut analyzed: Vec<(usize, TweetRecord, AnalysisResult)> =
            stream::iter(tweets.into_iter().enumerate())
                .filter_map(|(idx, mut tweet)| async move {
                    tweet.text = normalize_tweet_text(&tweet.text);
                    (!tweet.text.is_empty()).then_some((idx, tweet))
                })
                .map(|(idx, tweet)| async move {
                    let outcome = policy.analyze(&tweet.text).await;
                    (idx, tweet, outcome.result)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        // Completion order is arbitrary; restore arrival order before the stable sort.
        analyzed.sort_by_key(|(idx, _, _)| *idx);

        let mut flagged: Vec<FlaggedItem> = analyzed
            .into_iter()
            .filter(|(_, _, result)| is_flagged(result))
            .map(|(_, tweet, result)| FlaggedItem::new(tweet, result))
            .collect();
        flagged.sort_by(|a, b| b.analysis.score.total_cmp(&a.analysis.score));
        for (i, item) in flagged.iter_mut().enumerate() {
            item.rank = i + 1;
        }
        flagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_quotes_keywords_and_prefixes_hashtags() {
        let req = ScanRequest {
            keywords: vec!["border".into(), "  ".into(), "say \"no\"".into()],
            hashtags: vec!["#unity".into(), "Election2026".into(), "#".into()],
        };
        assert_eq!(
            build_query(&req).unwrap(),
            r#""border" OR "say no" OR #unity OR #Election2026"#
        );
    }

    #[test]
    fn empty_query_is_rejected() {
        assert_eq!(build_query(&ScanRequest::default()), Err(ScanError::EmptyQuery));
        let blanks = ScanRequest {
            keywords: vec![" ".into()],
            hashtags: vec!["#".into()],
        };
        assert_eq!(build_query(&blanks), Err(ScanError::EmptyQuery));
    }

    #[test]
    fn tweet_text_is_decoded_and_collapsed() {
        assert_eq!(
            normalize_tweet_text("  Fish &amp; chips\n\n&lt;3   "),
            "Fish & chips <3"
        );
        assert_eq!(normalize_tweet_text(&"y".repeat(2000)).len(), MAX_TWEET_CHARS);
    }
}
