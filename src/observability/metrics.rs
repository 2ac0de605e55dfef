//! Metrics for the news feed pipeline
//!
//! Recording functions are grouped by phase. The Prometheus recorder is
//! optional: without it every call is a no-op.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::OnceLock;
use tracing::info;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Source metrics
    SourceFetchSuccess,
    SourceFetchEmpty,
    SourceFetchError,
    SourceFetchDuration,
    SourceRowsFetched,

    // Pipeline metrics
    PipelineRunsProcessed,
    PipelineRunsRaw,
    PipelineRecordsRejected,
    PipelineRecordsPublished,
    PipelineFailures,

    // Moderation metrics
    ModerationCallDuration,
    ModerationBackendErrors,
    ModerationTimeouts,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SourceFetchSuccess => "news_source_fetch_success_total",
            MetricName::SourceFetchEmpty => "news_source_fetch_empty_total",
            MetricName::SourceFetchError => "news_source_fetch_error_total",
            MetricName::SourceFetchDuration => "news_source_fetch_duration_seconds",
            MetricName::SourceRowsFetched => "news_source_rows_fetched_total",

            MetricName::PipelineRunsProcessed => "news_pipeline_runs_processed_total",
            MetricName::PipelineRunsRaw => "news_pipeline_runs_raw_total",
            MetricName::PipelineRecordsRejected => "news_pipeline_records_rejected_total",
            MetricName::PipelineRecordsPublished => "news_pipeline_records_published_total",
            MetricName::PipelineFailures => "news_pipeline_failures_total",

            MetricName::ModerationCallDuration => "news_moderation_call_duration_seconds",
            MetricName::ModerationBackendErrors => "news_moderation_backend_errors_total",
            MetricName::ModerationTimeouts => "news_moderation_timeouts_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    let _ = METRICS_HANDLE.set(handle);
    info!("Metrics recorder installed");
    Ok(())
}

/// Prometheus text exposition, if the recorder is installed
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod source {
    use super::MetricName;

    pub fn fetch_succeeded(rows: usize) {
        ::metrics::counter!(MetricName::SourceFetchSuccess.as_str()).increment(1);
        ::metrics::counter!(MetricName::SourceRowsFetched.as_str()).increment(rows as u64);
    }

    pub fn fetch_empty() {
        ::metrics::counter!(MetricName::SourceFetchEmpty.as_str()).increment(1);
    }

    pub fn fetch_failed(kind: &'static str) {
        ::metrics::counter!(MetricName::SourceFetchError.as_str(), "kind" => kind).increment(1);
    }

    pub fn fetch_duration(secs: f64) {
        ::metrics::histogram!(MetricName::SourceFetchDuration.as_str()).record(secs);
    }
}

pub mod pipeline {
    use super::MetricName;

    pub fn processed_run() {
        ::metrics::counter!(MetricName::PipelineRunsProcessed.as_str()).increment(1);
    }

    pub fn raw_run() {
        ::metrics::counter!(MetricName::PipelineRunsRaw.as_str()).increment(1);
    }

    pub fn record_rejected(reason: &'static str) {
        ::metrics::counter!(MetricName::PipelineRecordsRejected.as_str(), "reason" => reason)
            .increment(1);
    }

    pub fn records_published(count: usize) {
        ::metrics::counter!(MetricName::PipelineRecordsPublished.as_str()).increment(count as u64);
    }

    pub fn failure(endpoint: &'static str) {
        ::metrics::counter!(MetricName::PipelineFailures.as_str(), "endpoint" => endpoint)
            .increment(1);
    }
}

pub mod moderation {
    use super::MetricName;

    pub fn call_duration(secs: f64) {
        ::metrics::histogram!(MetricName::ModerationCallDuration.as_str()).record(secs);
    }

    pub fn backend_error(backend: &'static str) {
        ::metrics::counter!(MetricName::ModerationBackendErrors.as_str(), "backend" => backend)
            .increment(1);
    }

    pub fn timeout(backend: &'static str) {
        ::metrics::counter!(MetricName::ModerationTimeouts.as_str(), "backend" => backend)
            .increment(1);
    }
}
