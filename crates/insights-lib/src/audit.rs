//! Audit wrapper recording operation name, outcome and duration

use crate::observability::FacadeMetrics;
use crate::predictor::PredictionOutcome;
use std::future::Future;
use std::time::Instant;
use tracing::info;

/// Anything whose success or failure can be audited
pub trait AuditOutcome {
    /// Failure description, `None` on success
    fn failure(&self) -> Option<String>;
}

impl<T> AuditOutcome for PredictionOutcome<T> {
    fn failure(&self) -> Option<String> {
        self.error_message().map(str::to_string)
    }
}

impl<T, E: std::fmt::Display> AuditOutcome for Result<T, E> {
    fn failure(&self) -> Option<String> {
        self.as_ref().err().map(|e| e.to_string())
    }
}

/// Run `operation`, then emit an audit record and latency metrics
pub async fn audited<R, Fut>(operation: &'static str, fut: Fut) -> R
where
    R: AuditOutcome,
    Fut: Future<Output = R>,
{
    let start = Instant::now();
    let result = fut.await;
    let elapsed = start.elapsed();
    let failure = result.failure();

    FacadeMetrics::new().observe_operation(operation, elapsed.as_secs_f64(), failure.is_some());

    match &failure {
        None => info!(
            event = "audit",
            operation = operation,
            outcome = "success",
            duration_ms = elapsed.as_millis() as u64,
            "Operation audited"
        ),
        Some(error) => info!(
            event = "audit",
            operation = operation,
            outcome = "failure",
            error = %error,
            duration_ms = elapsed.as_millis() as u64,
            "Operation audited"
        ),
    }

    result
}
