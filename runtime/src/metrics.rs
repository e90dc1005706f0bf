//! Prometheus metrics for observability and monitoring.
//!
//! The store records request metrics through the `metrics` facade. Nothing is
//! exported until a recorder is installed, so libraries embedding a store pay
//! nothing unless the application opts in.
//!
//! # Example
//!
//! ```rust,no_run
//! use loading_store_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut recorder = MetricsRecorder::new();
//! recorder.install()?;
//!
//! // ... run requests ...
//!
//! if let Some(text) = recorder.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge, histogram};

/// Requests entering the wait gate
pub const REQUESTS_TOTAL: &str = "loading_store_requests_total";
/// Attempts whose action succeeded
pub const REQUESTS_SUCCEEDED_TOTAL: &str = "loading_store_requests_succeeded_total";
/// Attempts whose action failed
pub const REQUESTS_FAILED_TOTAL: &str = "loading_store_requests_failed_total";
/// Attempts dropped before their action finished
pub const REQUESTS_CANCELLED_TOTAL: &str = "loading_store_requests_cancelled_total";
/// Requests rejected because the wait gate timed out
pub const WAIT_TIMEOUTS_TOTAL: &str = "loading_store_wait_timeouts_total";
/// Attempts currently past the wait gate
pub const REQUESTS_IN_FLIGHT: &str = "loading_store_requests_in_flight";
/// Action execution time
pub const REQUEST_DURATION_SECONDS: &str = "loading_store_request_duration_seconds";

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus recorder for store metrics.
#[derive(Default)]
pub struct MetricsRecorder {
    handle: Option<PrometheusHandle>,
}

impl MetricsRecorder {
    /// Create a recorder that is not yet installed.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Register metric descriptions and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a global recorder is already installed (e.g., by another test), this
    /// logs a warning and succeeds without a render handle.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        describe_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Prometheus metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if this recorder was not the one installed.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of requests entering the wait gate");
    describe_counter!(REQUESTS_SUCCEEDED_TOTAL, "Total number of attempts whose action succeeded");
    describe_counter!(REQUESTS_FAILED_TOTAL, "Total number of attempts whose action failed");
    describe_counter!(
        REQUESTS_CANCELLED_TOTAL,
        "Total number of attempts dropped before their action finished"
    );
    describe_counter!(
        WAIT_TIMEOUTS_TOTAL,
        "Total number of requests rejected because a same-type attempt did not finish in time"
    );
    describe_gauge!(REQUESTS_IN_FLIGHT, "Number of attempts currently executing their action");
    describe_histogram!(REQUEST_DURATION_SECONDS, "Time taken by request actions");
}

/// Request metrics recorder.
pub struct RequestMetrics;

impl RequestMetrics {
    /// Record a request entering the wait gate.
    pub fn record_request() {
        counter!(REQUESTS_TOTAL).increment(1);
    }

    /// Record a wait gate timeout.
    pub fn record_wait_timeout() {
        counter!(WAIT_TIMEOUTS_TOTAL).increment(1);
    }

    /// Record an attempt passing the wait gate.
    pub fn record_started() {
        gauge!(REQUESTS_IN_FLIGHT).increment(1.0);
    }

    /// Record a successful attempt.
    pub fn record_success(duration: Duration) {
        gauge!(REQUESTS_IN_FLIGHT).decrement(1.0);
        counter!(REQUESTS_SUCCEEDED_TOTAL).increment(1);
        histogram!(REQUEST_DURATION_SECONDS).record(duration.as_secs_f64());
    }

    /// Record a failed attempt.
    pub fn record_failure(duration: Duration) {
        gauge!(REQUESTS_IN_FLIGHT).decrement(1.0);
        counter!(REQUESTS_FAILED_TOTAL).increment(1);
        histogram!(REQUEST_DURATION_SECONDS).record(duration.as_secs_f64());
    }

    /// Record an attempt dropped mid-action.
    pub fn record_cancelled() {
        gauge!(REQUESTS_IN_FLIGHT).decrement(1.0);
        counter!(REQUESTS_CANCELLED_TOTAL).increment(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_creation() {
        let recorder = MetricsRecorder::new();
        assert!(recorder.handle().is_none());
        assert!(recorder.render().is_none());
    }

    #[test]
    fn test_recorder_install_and_render() {
        let mut recorder = MetricsRecorder::new();
        recorder.install().unwrap();

        RequestMetrics::record_request();
        RequestMetrics::record_started();
        RequestMetrics::record_success(Duration::from_millis(100));
        RequestMetrics::record_wait_timeout();

        // The handle is None if another test installed the global recorder first.
        if let Some(rendered) = recorder.render() {
            assert!(rendered.contains(REQUESTS_TOTAL));
            assert!(rendered.contains(REQUESTS_SUCCEEDED_TOTAL));
            assert!(rendered.contains(WAIT_TIMEOUTS_TOTAL));
        }
    }
}
