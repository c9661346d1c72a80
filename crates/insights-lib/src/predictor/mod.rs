//! Predictive-analytics facade
//!
//! Proxies resource, traffic, anomaly, recommendation, SLA, capacity and
//! cost predictions to the remote backends, and drives the periodic
//! forecast job.

mod mapping;
mod outcome;
mod scheduler;
mod service;

pub use mapping::{parse_local_datetime, series_stats, CAPACITY_HEADROOM, HIGH_PRIORITY};
pub use outcome::{
    AnomalyDetectionResult, CapacityPrediction, CostOptimizationPrediction, PredictionOutcome,
    Recommendations, ResourcePrediction, SlaPrediction, TrafficPoint, TrafficPrediction,
};
pub use scheduler::{
    season_for_month, ForecastConfig, ForecastPipeline, ForecastReport, ForecastScheduler,
    PipelineOutcome, DEFAULT_FORECAST_INTERVAL,
};
pub use service::{PredictionService, ResourceCache};
