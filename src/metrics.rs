use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "analysis_total",
            "Texts analyzed, labelled by the method that produced the result."
        );
        describe_counter!(
            "llm_failures_total",
            "LLM calls that ended in fallback (http/status/empty/timeout/parse)."
        );
        describe_histogram!("llm_latency_ms", "LLM round-trip time in milliseconds.");
        describe_counter!("scan_runs_total", "Campaign scans, labelled by tweet source.");
        describe_counter!("scan_flagged_total", "Items flagged across all scans.");
        describe_gauge!("scan_last_run_ts", "Unix ts of the last completed scan.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Call once per process.
    pub fn init() -> anyhow::Result<Self> {
        // Use default buckets to avoid API differences across crate versions.
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
