//! Observability infrastructure for the insights facades
//!
//! Provides:
//! - Prometheus metrics (operation latency and failures, cache lookups,
//!   SEO scores, forecast runs)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, register_int_counter_vec,
    Histogram, HistogramVec, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

const SCORE_BUCKETS: &[f64] = &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<FacadeMetricsInner> = OnceLock::new();

struct FacadeMetricsInner {
    operation_latency_seconds: HistogramVec,
    operation_failures: IntCounterVec,
    cache_lookups: IntCounterVec,
    seo_score: Histogram,
    optimizations_persisted: IntCounter,
    forecast_runs: IntCounterVec,
}

impl FacadeMetricsInner {
    fn new() -> Self {
        Self {
            operation_latency_seconds: register_histogram_vec!(
                "insights_operation_latency_seconds",
                "Time spent in facade operations",
                &["operation"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register operation_latency_seconds"),

            operation_failures: register_int_counter_vec!(
                "insights_operation_failures_total",
                "Facade operations that ended in an error outcome",
                &["operation"]
            )
            .expect("Failed to register operation_failures"),

            cache_lookups: register_int_counter_vec!(
                "insights_cache_lookups_total",
                "Cache lookups by cache and result",
                &["cache", "result"]
            )
            .expect("Failed to register cache_lookups"),

            seo_score: register_histogram!(
                "insights_seo_overall_score",
                "Overall SEO score of optimized content",
                SCORE_BUCKETS.to_vec()
            )
            .expect("Failed to register seo_score"),

            optimizations_persisted: register_int_counter!(
                "insights_seo_optimizations_persisted_total",
                "SEO optimization records saved"
            )
            .expect("Failed to register optimizations_persisted"),

            forecast_runs: register_int_counter_vec!(
                "insights_forecast_runs_total",
                "Forecast sub-pipeline runs by outcome",
                &["pipeline", "outcome"]
            )
            .expect("Failed to register forecast_runs"),
        }
    }
}

/// Facade metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct FacadeMetrics {
    _private: (),
}

impl Default for FacadeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl FacadeMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(FacadeMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &FacadeMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_operation(&self, operation: &str, duration_secs: f64, failed: bool) {
        self.inner()
            .operation_latency_seconds
            .with_label_values(&[operation])
            .observe(duration_secs);
        if failed {
            self.inner()
                .operation_failures
                .with_label_values(&[operation])
                .inc();
        }
    }

    pub fn inc_cache_lookup(&self, cache: &str, hit: bool) {
        let result = if hit { "hit" } else { "miss" };
        self.inner()
            .cache_lookups
            .with_label_values(&[cache, result])
            .inc();
    }

    pub fn observe_seo_score(&self, score: f64) {
        self.inner().seo_score.observe(score);
    }

    pub fn inc_optimizations_persisted(&self) {
        self.inner().optimizations_persisted.inc();
    }

    pub fn inc_forecast_run(&self, pipeline: &str, succeeded: bool) {
        let outcome = if succeeded { "success" } else { "failure" };
        self.inner()
            .forecast_runs
            .with_label_values(&[pipeline, outcome])
            .inc();
    }
}

/// Structured logger for facade events
///
/// Provides consistent JSON-formatted logging for optimizations,
/// prediction failures, forecast runs and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// Log a prediction operation that ended in an error outcome
    pub fn log_prediction_failure(&self, operation: &str, error: &str) {
        warn!(
            event = "prediction_failed",
            instance = %self.instance,
            operation = %operation,
            error = %error,
            "Prediction operation failed"
        );
    }

    /// Log a completed SEO optimization
    pub fn log_optimization(
        &self,
        optimization_id: i64,
        property_id: &str,
        content_type: &str,
        overall_score: f64,
        grade: &str,
        processing_time_ms: u64,
    ) {
        info!(
            event = "seo_optimized",
            instance = %self.instance,
            optimization_id = optimization_id,
            property_id = %property_id,
            content_type = %content_type,
            overall_score = overall_score,
            grade = %grade,
            processing_time_ms = processing_time_ms,
            "SEO optimization completed"
        );
    }

    /// Log one forecast sub-pipeline run
    pub fn log_forecast_run(&self, pipeline: &str, succeeded: bool, details: &str) {
        if succeeded {
            info!(
                event = "forecast_run",
                instance = %self.instance,
                pipeline = %pipeline,
                details = %details,
                "Forecast pipeline completed"
            );
        } else {
            warn!(
                event = "forecast_run",
                instance = %self.instance,
                pipeline = %pipeline,
                error = %details,
                "Forecast pipeline failed"
            );
        }
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, ai_model: &str) {
        info!(
            event = "service_started",
            instance = %self.instance,
            version = %version,
            ai_model = %ai_model,
            "Insights service started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Insights service shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_metrics_creation() {
        let metrics = FacadeMetrics::new();

        metrics.observe_operation("predict_traffic", 0.01, false);
        metrics.observe_operation("predict_traffic", 0.02, true);
        metrics.inc_cache_lookup("resource_usage", true);
        metrics.observe_seo_score(0.82);
        metrics.inc_optimizations_persisted();
        metrics.inc_forecast_run("property_listings", true);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("test-instance");
        assert_eq!(logger.instance, "test-instance");
    }
}
