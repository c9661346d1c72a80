//! Periodic forecast job
//!
//! Fires every 6 hours by default and runs the forecast sub-pipelines one
//! after another. Each sub-pipeline is fault-isolated and firings never
//! overlap.

use crate::client::PredictionBackend;
use crate::health::{components, HealthRegistry};
use crate::models::{FeatureMap, FeatureValue, PredictionRequest, PredictionType};
use crate::observability::{FacadeMetrics, StructuredLogger};
use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Default forecast interval (6 hours)
pub const DEFAULT_FORECAST_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Configuration for the forecast job
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Seconds between firings
    pub interval_secs: u64,
    /// Market trend label sent with property listing forecasts
    pub market_trend: String,
    /// Days of history the backend should consider
    pub historical_data_days: i64,
    /// Forecast horizon
    pub horizon: String,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_FORECAST_INTERVAL.as_secs(),
            market_trend: "STABLE".to_string(),
            historical_data_days: 365,
            horizon: "30d".to_string(),
        }
    }
}

impl ForecastConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// Forecast sub-pipelines, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastPipeline {
    PropertyListings,
    BookingPatterns,
    Revenue,
    UserEngagement,
}

impl ForecastPipeline {
    pub const ALL: [ForecastPipeline; 4] = [
        ForecastPipeline::PropertyListings,
        ForecastPipeline::BookingPatterns,
        ForecastPipeline::Revenue,
        ForecastPipeline::UserEngagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastPipeline::PropertyListings => "property_listings",
            ForecastPipeline::BookingPatterns => "booking_patterns",
            ForecastPipeline::Revenue => "revenue",
            ForecastPipeline::UserEngagement => "user_engagement",
        }
    }
}

/// Outcome of one sub-pipeline within a firing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub pipeline: ForecastPipeline,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcomes of one firing, in execution order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub started_at: i64,
    pub outcomes: Vec<PipelineOutcome>,
}

impl ForecastReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.succeeded)
    }
}

/// Meteorological season of a month (northern hemisphere)
pub fn season_for_month(month: u32) -> &'static str {
    match month {
        12 | 1 | 2 => "WINTER",
        3..=5 => "SPRING",
        6..=8 => "SUMMER",
        _ => "FALL",
    }
}

/// Clears the in-progress flag even when a firing is cancelled mid-run
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single-flight periodic forecast runner
pub struct ForecastScheduler {
    backend: Arc<dyn PredictionBackend>,
    config: ForecastConfig,
    running: AtomicBool,
    health: Option<HealthRegistry>,
    logger: StructuredLogger,
    metrics: FacadeMetrics,
}

impl ForecastScheduler {
    pub fn new(backend: Arc<dyn PredictionBackend>, config: ForecastConfig) -> Self {
        Self {
            backend,
            config,
            running: AtomicBool::new(false),
            health: None,
            logger: StructuredLogger::new("forecast-scheduler"),
            metrics: FacadeMetrics::new(),
        }
    }

    /// Report firing results to the `forecast_scheduler` health component
    pub fn with_health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    /// Run the forecast loop until shutdown
    pub async fn run(self: Arc<Self>, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        info!(
            interval_secs = self.config.interval().as_secs(),
            "Starting forecast scheduler"
        );

        let mut ticker = interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once().await;
                }
                _ = shutdown.recv() => {
                    info!("Shutting down forecast scheduler");
                    break;
                }
            }
        }
    }

    /// Run every sub-pipeline once; `None` when a firing is already in progress
    pub async fn run_once(&self) -> Option<ForecastReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Forecast run already in progress, skipping");
            return None;
        }
        let guard = RunGuard(&self.running);

        let started_at = Utc::now().timestamp();
        let mut outcomes = Vec::with_capacity(ForecastPipeline::ALL.len());

        for pipeline in ForecastPipeline::ALL {
            let result = self.run_pipeline(pipeline).await;
            let succeeded = result.is_ok();
            self.metrics.inc_forecast_run(pipeline.as_str(), succeeded);

            let error = match result {
                Ok(details) => {
                    self.logger
                        .log_forecast_run(pipeline.as_str(), true, &details);
                    None
                }
                Err(e) => {
                    let message = format!("{:#}", e);
                    self.logger
                        .log_forecast_run(pipeline.as_str(), false, &message);
                    Some(message)
                }
            };

            outcomes.push(PipelineOutcome {
                pipeline,
                succeeded,
                error,
            });
        }

        drop(guard);
        let report = ForecastReport {
            started_at,
            outcomes,
        };

        if let Some(health) = &self.health {
            let failed: Vec<&str> = report
                .outcomes
                .iter()
                .filter(|o| !o.succeeded)
                .map(|o| o.pipeline.as_str())
                .collect();
            if failed.is_empty() {
                health.set_healthy(components::FORECAST_SCHEDULER).await;
            } else {
                health
                    .set_degraded(
                        components::FORECAST_SCHEDULER,
                        format!("Failed pipelines: {}", failed.join(", ")),
                    )
                    .await;
            }
        }

        Some(report)
    }

    /// Whether a firing is currently in progress
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    async fn run_pipeline(&self, pipeline: ForecastPipeline) -> Result<String> {
        match pipeline {
            ForecastPipeline::PropertyListings => self.forecast_property_listings().await,
            // No forecast model exists for these yet
            ForecastPipeline::BookingPatterns
            | ForecastPipeline::Revenue
            | ForecastPipeline::UserEngagement => {
                debug!(pipeline = pipeline.as_str(), "Forecast pipeline has no work");
                Ok("no-op".to_string())
            }
        }
    }

    /// Context features for property listing forecasts
    pub fn property_listing_features(&self, month: u32) -> FeatureMap {
        let mut features = FeatureMap::new();
        features.insert(
            "season".to_string(),
            FeatureValue::from(season_for_month(month)),
        );
        features.insert(
            "marketTrend".to_string(),
            FeatureValue::from(self.config.market_trend.as_str()),
        );
        features.insert(
            "historicalDataDays".to_string(),
            FeatureValue::Integer(self.config.historical_data_days),
        );
        features
    }

    async fn forecast_property_listings(&self) -> Result<String> {
        let request = PredictionRequest::new(PredictionType::PropertyListings)
            .period(self.config.horizon.as_str())
            .features(self.property_listing_features(Utc::now().month()));

        let response = self
            .backend
            .predict(&request)
            .await
            .context("Property listing forecast failed")?;

        Ok(format!(
            "{} predictions, confidence {:.2}",
            response.predictions.len(),
            response.confidence
        ))
    }
}
