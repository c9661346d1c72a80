//! Typed results of the prediction facade
//!
//! Every operation answers with a [`PredictionOutcome`]: a populated
//! payload on success or a message on failure, never both.

use crate::models::{Anomaly, PredictionPoint, RecommendationItem};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Success-or-error union returned by every prediction operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PredictionOutcome<T> {
    Success(T),
    Error { message: String },
}

impl<T> PredictionOutcome<T> {
    pub fn error(message: impl Into<String>) -> Self {
        PredictionOutcome::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PredictionOutcome::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            PredictionOutcome::Success(data) => Some(data),
            PredictionOutcome::Error { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            PredictionOutcome::Success(data) => Some(data),
            PredictionOutcome::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            PredictionOutcome::Success(_) => None,
            PredictionOutcome::Error { message } => Some(message),
        }
    }
}

impl<T> From<anyhow::Result<T>> for PredictionOutcome<T> {
    fn from(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(data) => PredictionOutcome::Success(data),
            Err(e) => PredictionOutcome::error(format!("{:#}", e)),
        }
    }
}

/// Resource usage forecast with series statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePrediction {
    pub resource_type: String,
    pub period: String,
    pub predictions: Vec<PredictionPoint>,
    pub average_usage: f64,
    pub peak_usage: f64,
    pub min_usage: f64,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

/// Traffic volume at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPoint {
    pub timestamp: NaiveDateTime,
    pub expected_requests: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPrediction {
    pub service: String,
    pub target_date: String,
    pub points: Vec<TrafficPoint>,
    pub peak_requests: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_time: Option<NaiveDateTime>,
    pub total_requests: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyDetectionResult {
    pub metric: String,
    pub has_anomalies: bool,
    pub anomalies: Vec<Anomaly>,
    /// Highest severity among the anomalies, 0 when there are none
    pub severity: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub category: String,
    pub items: Vec<RecommendationItem>,
    pub high_priority_count: usize,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaPrediction {
    pub service: String,
    pub period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance_probability: Option<f64>,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityPrediction {
    pub resource_type: String,
    pub target_date: String,
    pub predictions: Vec<PredictionPoint>,
    pub peak_demand: f64,
    pub recommended_capacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_capacity: Option<f64>,
    pub scale_up_required: bool,
    /// Timestamp of the first point reaching the current capacity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhaustion_time: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostOptimizationPrediction {
    pub service: String,
    pub period: String,
    pub projected_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_cost: Option<f64>,
    pub potential_savings: f64,
    pub opportunities: Vec<String>,
    pub confidence: f64,
}
