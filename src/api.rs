// src/api.rs
//! HTTP surface: /health, /status, /analyze, /scan.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::analyze::{AnalysisMode, AnalysisPolicy, PolicyOutcome};
use crate::config::{ProviderConfig, ServiceConfig};
use crate::scan::source::{FixtureTweetSource, UnavailableSource};
use crate::scan::types::{ScanReport, ScanRequest, TweetSource};
use crate::scan::{ScanAggregator, ScanError};

#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<AnalysisPolicy>,
    pub scanner: Arc<ScanAggregator>,
    pub source: Arc<dyn TweetSource>,
}

impl AppState {
    pub fn new(policy: AnalysisPolicy, source: Arc<dyn TweetSource>, service: &ServiceConfig) -> Self {
        let policy = Arc::new(policy);
        let scanner = Arc::new(ScanAggregator::new(
            policy.clone(),
            service.scan_concurrency,
            service.scan_max_tweets,
        ));
        Self {
            policy,
            scanner,
            source,
        }
    }

    /// Wire everything from explicit configs.
    pub fn from_config(provider: ProviderConfig, service: &ServiceConfig) -> anyhow::Result<Self> {
        tracing::info!(
            target: "config",
            provider = %provider.provider,
            available = provider.is_available(),
            model = provider.effective_model().unwrap_or("-"),
            timeout_ms = service.llm_timeout_ms,
            "analysis policy configured"
        );
        let policy = AnalysisPolicy::from_config(provider, service.llm_timeout())
            .with_dictionary_matches(service.attach_dictionary_matches);

        let source: Arc<dyn TweetSource> = match &service.tweet_fixture_path {
            Some(path) => Arc::new(FixtureTweetSource::from_path(path)?),
            None => Arc::new(UnavailableSource),
        };
        Ok(Self::new(policy, source, service))
    }

    /// `LLM_*` env vars + `ServiceConfig::load_default()`.
    pub fn from_env() -> anyhow::Result<Self> {
        let service = ServiceConfig::load_default()?;
        Self::from_config(ProviderConfig::from_env(), &service)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/status", get(status))
        .route("/analyze", post(analyze))
        .route("/scan", post(scan))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ------------------------------------------------------------
// Errors
// ------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl From<ScanError> for ApiError {
    fn from(e: ScanError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

// ------------------------------------------------------------
// Handlers
// ------------------------------------------------------------

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeReq {
    text: String,
    #[serde(default = "default_true")]
    use_llm: bool,
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeReq>, JsonRejection>,
) -> Result<Json<PolicyOutcome>, ApiError> {
    let Json(body) = payload.map_err(|e| {
        tracing::debug!(target: "analysis", error = %e, "rejected /analyze body");
        ApiError::BadRequest("text is required and must be a string".to_string())
    })?;
    let mode = if body.use_llm {
        AnalysisMode::Auto
    } else {
        AnalysisMode::DictionaryOnly
    };
    Ok(Json(state.policy.analyze_with(&body.text, mode).await))
}

async fn scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanReport>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(format!("invalid scan request: {e}")))?;
    let report = state.scanner.scan(state.source.as_ref(), &req).await?;
    Ok(Json(report))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LlmStatus {
    configured: bool,
    provider: &'static str,
    model: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusOut {
    llm: LlmStatus,
    tweet_source: &'static str,
    timestamp: chrono::DateTime<chrono::Utc>,
}

async fn status(State(state): State<AppState>) -> Json<StatusOut> {
    let cfg = state.policy.config();
    Json(StatusOut {
        llm: LlmStatus {
            configured: cfg.is_available(),
            provider: cfg.provider.as_str(),
            model: cfg.effective_model().map(str::to_string),
        },
        tweet_source: state.source.name(),
        timestamp: chrono::Utc::now(),
    })
}
