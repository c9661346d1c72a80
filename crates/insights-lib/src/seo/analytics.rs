//! Post-optimization analytics events

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationEvent {
    pub optimization_id: i64,
    pub property_id: String,
    pub content_type: String,
    pub overall_score: f64,
    pub grade: String,
    pub keyword_count: usize,
    pub processing_time_ms: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Destination of analytics events; delivery failures never reach callers
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, event: OptimizationEvent) -> Result<()>;
}

/// Writes events to the tracing pipeline
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalyticsSink;

#[async_trait]
impl AnalyticsSink for TracingAnalyticsSink {
    async fn record(&self, event: OptimizationEvent) -> Result<()> {
        info!(
            event = "seo_analytics",
            optimization_id = event.optimization_id,
            property_id = %event.property_id,
            content_type = %event.content_type,
            overall_score = event.overall_score,
            keyword_count = event.keyword_count,
            "Optimization analytics recorded"
        );
        Ok(())
    }
}
