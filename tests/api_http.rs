// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /status
// - POST /analyze (validation, dictionary path, useLlm opt-out)
// - POST /scan    (validation, unavailable source, ranked fixture results)

use std::sync::Arc;

use serde_json::json;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use hate_speech_monitor::analyze::{AnalysisPolicy, DisabledClient};
use hate_speech_monitor::api;
use hate_speech_monitor::config::{ProviderConfig, ServiceConfig};
use hate_speech_monitor::scan::source::{FixtureTweetSource, UnavailableSource};
use hate_speech_monitor::scan::types::TweetSource;
use hate_speech_monitor::AppState;

const BODY_LIMIT: usize = 1024 * 1024;

const FIXTURE: &str = r#"[
  {"id": "t1", "text": "Calm night at the border crossing", "authorHandle": "calm", "createdAt": "2026-10-18T10:00:00Z"},
  {"id": "t2", "text": "Border towns: go back to your country, foreigner", "authorHandle": "angry", "createdAt": "2026-10-18T10:05:00Z", "metrics": {"likes": 4, "retweets": 1, "replies": 0}},
  {"id": "t3", "text": "Racist genocide chants at the border &amp; worse", "authorHandle": "worst", "authorBio": "", "createdAt": "2026-10-18T10:10:00Z"},
  {"id": "t4", "text": "Cooking pasta tonight", "authorHandle": "chef", "createdAt": "2026-10-18T10:15:00Z"}
]"#;

/// Dictionary-only router over the given tweet source.
fn test_router(source: Arc<dyn TweetSource>) -> Router {
    let policy = AnalysisPolicy::new(ProviderConfig::disabled(), Arc::new(DisabledClient));
    let state = AppState::new(policy, source, &ServiceConfig::default());
    api::router(state)
}

fn fixture_router() -> Router {
    let source = FixtureTweetSource::from_fixture(FIXTURE).expect("fixture parses");
    test_router(Arc::new(source))
}

async fn post_json(app: Router, uri: &str, payload: String) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload))
        .expect("build POST");
    let resp = app.oneshot(req).await.expect("oneshot POST");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("json body");
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router(Arc::new(UnavailableSource));

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "OK");
}

#[tokio::test]
async fn api_status_reports_llm_and_source() {
    let app = fixture_router();
    let req = Request::builder()
        .method("GET")
        .uri("/status")
        .body(Body::empty())
        .expect("build GET /status");

    let resp = app.oneshot(req).await.expect("oneshot /status");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("status json");

    assert_eq!(v["llm"]["configured"], false);
    assert_eq!(v["llm"]["provider"], "none");
    assert!(v["llm"]["model"].is_null());
    assert_eq!(v["tweetSource"], "fixture");
    assert!(v["timestamp"].is_string());
}

#[tokio::test]
async fn api_analyze_rejects_missing_text() {
    let app = test_router(Arc::new(UnavailableSource));
    let (status, v) = post_json(app, "/analyze", json!({}).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "text is required and must be a string");
}

#[tokio::test]
async fn api_analyze_rejects_non_string_text() {
    for payload in [json!({"text": 42}), json!({"text": null}), json!({"text": ["a"]})] {
        let app = test_router(Arc::new(UnavailableSource));
        let (status, v) = post_json(app, "/analyze", payload.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert!(v["error"].is_string());
    }
}

#[tokio::test]
async fn api_analyze_rejects_malformed_json() {
    let app = test_router(Arc::new(UnavailableSource));
    let (status, _) = post_json(app, "/analyze", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn api_analyze_returns_dictionary_verdict() {
    let app = test_router(Arc::new(UnavailableSource));
    let payload = json!({ "text": "white supremacy must be stopped" });
    let (status, v) = post_json(app, "/analyze", payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["method"], "dictionary");
    assert_eq!(v["isHateSpeech"], true);
    assert_eq!(v["severity"], "medium");
    assert_eq!(v["categories"], json!(["racial"]));
    let score = v["score"].as_f64().expect("score");
    assert!((score - 2.0 / 3.0).abs() < 1e-4);
    assert_eq!(v["dictionaryMatches"].as_array().map(Vec::len), Some(2));
    assert!(v.get("provider").is_none());
}

#[tokio::test]
async fn api_analyze_accepts_empty_text() {
    let app = test_router(Arc::new(UnavailableSource));
    let (status, v) = post_json(app, "/analyze", json!({"text": ""}).to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["score"], 0.0);
    assert_eq!(v["isHateSpeech"], false);
}

#[tokio::test]
async fn api_analyze_honours_use_llm_false() {
    let app = test_router(Arc::new(UnavailableSource));
    let payload = json!({ "text": "you bigot", "useLlm": false });
    let (status, v) = post_json(app, "/analyze", payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["method"], "dictionary");
    assert_eq!(v["categories"], json!(["other"]));
}

#[tokio::test]
async fn api_scan_rejects_empty_targets() {
    let app = fixture_router();
    let payload = json!({ "keywords": ["  "], "hashtags": [] });
    let (status, v) = post_json(app, "/scan", payload.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "keywords or hashtags required");
}

#[tokio::test]
async fn api_scan_rejects_wrong_shape() {
    let app = fixture_router();
    let payload = json!({ "keywords": "border" });
    let (status, v) = post_json(app, "/scan", payload.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"]
        .as_str()
        .unwrap_or_default()
        .starts_with("invalid scan request"));
}

#[tokio::test]
async fn api_scan_without_source_is_unavailable() {
    let app = test_router(Arc::new(UnavailableSource));
    let payload = json!({ "keywords": ["border"] });
    let (status, v) = post_json(app, "/scan", payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["source"], "unavailable");
    assert_eq!(v["totalSearched"], 0);
    assert_eq!(v["flaggedItems"], json!([]));
    assert!(v["hint"].is_string());
    assert_eq!(v["analysisMethod"], "dictionary");
}

#[tokio::test]
async fn api_scan_ranks_fixture_matches() {
    let app = fixture_router();
    let payload = json!({ "keywords": ["border"], "hashtags": ["#immigration"] });
    let (status, v) = post_json(app, "/scan", payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["source"], "fixture");
    assert_eq!(v["totalSearched"], 3, "three fixture tweets mention the border");

    let items = v["flaggedItems"].as_array().expect("flaggedItems array");
    let ids: Vec<&str> = items.iter().filter_map(|i| i["sourceId"].as_str()).collect();
    assert_eq!(ids, vec!["t3", "t2"]);
    assert_eq!(items[0]["rank"], 1);
    assert_eq!(items[1]["rank"], 2);
    assert_eq!(items[0]["text"], "Racist genocide chants at the border & worse");
    assert_eq!(items[0]["author"]["handle"], "worst");
    assert!(items[0]["author"].get("bio").is_none());
    assert_eq!(items[1]["metrics"]["likes"], 4);
    assert_eq!(items[1]["categories"], json!(["xenophobic"]));
}
