// src/metrics.rs
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once, from the binary.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe();
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

fn describe() {
    describe_counter!("fetch_attempts_total", "Fetch attempts per source");
    describe_counter!(
        "fetch_not_found_total",
        "Fetches that ended as not found, per source"
    );
    describe_counter!("mirror_failures_total", "Twitter mirrors that failed and were skipped");
    describe_counter!("credential_refresh_total", "Reddit bearer tokens acquired");
    describe_counter!("pipeline_runs_total", "Analysis runs, by mode");
    describe_histogram!("pipeline_ms", Unit::Milliseconds, "End-to-end analysis latency");
}
