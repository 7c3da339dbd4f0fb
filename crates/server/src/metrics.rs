//! Application metrics for Prometheus monitoring.
//!
//! This module provides:
//! - Prometheus metrics recorder initialization
//! - Job metric definitions (item outcomes, run results, item latency)
//! - `/metrics` rendering

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

use crate::jobs::JobKind;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Call once at startup, before any metrics are recorded.
/// Returns `true` if initialization succeeded, `false` if already initialized.
pub fn init_metrics() -> bool {
    if PROMETHEUS_HANDLE.get().is_some() {
        return false;
    }

    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    if metrics::set_global_recorder(recorder).is_err() {
        tracing::warn!("Failed to set global metrics recorder (already set)");
        return false;
    }

    if PROMETHEUS_HANDLE.set(handle).is_err() {
        tracing::warn!("Failed to store Prometheus handle (already set)");
    }

    describe_metrics();

    tracing::info!("Prometheus metrics initialized");
    true
}

fn describe_metrics() {
    describe_counter!(
        "job_items_total",
        "Items processed by background jobs, by job and outcome"
    );
    describe_counter!(
        "job_runs_total",
        "Background job runs, by job and how they ended"
    );
    describe_histogram!(
        "job_item_duration_seconds",
        "Time spent processing a single job item in seconds"
    );
}

/// Render current metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|h| h.render())
}

/// Record one processed item.
///
/// `outcome` is `"succeeded"` or `"failed"`.
pub fn record_job_item(job: JobKind, outcome: &'static str, duration: Duration) {
    counter!("job_items_total", "job" => job.as_str(), "outcome" => outcome).increment(1);
    histogram!("job_item_duration_seconds", "job" => job.as_str()).record(duration.as_secs_f64());
}

/// Record the end of a run.
///
/// `result` is one of `"completed"`, `"cancelled"`, `"failed"`, `"aborted"`.
pub fn record_job_run(job: JobKind, result: &'static str) {
    counter!("job_runs_total", "job" => job.as_str(), "result" => result).increment(1);
}
