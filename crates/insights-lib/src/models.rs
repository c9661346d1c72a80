//! Wire models shared with the prediction, anomaly and recommendation backends

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Open key/value bag passed to the backends as model input
pub type FeatureMap = BTreeMap<String, FeatureValue>;

/// Closed set of values a feature bag may carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    List(Vec<FeatureValue>),
}

impl FeatureValue {
    /// Numeric view of the value, if it is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Integer(v) => Some(*v as f64),
            FeatureValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text entries of a list value; non-text entries are skipped
    pub fn as_text_list(&self) -> Vec<String> {
        match self {
            FeatureValue::List(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            FeatureValue::Text(s) => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        FeatureValue::Bool(v)
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Integer(v)
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Number(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Text(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::Text(v)
    }
}

impl<T: Into<FeatureValue>> From<Vec<T>> for FeatureValue {
    fn from(v: Vec<T>) -> Self {
        FeatureValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// Prediction kinds understood by the prediction backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredictionType {
    ResourceUsage,
    Traffic,
    Sla,
    Capacity,
    Cost,
    PropertyListings,
}

impl std::fmt::Display for PredictionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictionType::ResourceUsage => write!(f, "RESOURCE_USAGE"),
            PredictionType::Traffic => write!(f, "TRAFFIC"),
            PredictionType::Sla => write!(f, "SLA"),
            PredictionType::Capacity => write!(f, "CAPACITY"),
            PredictionType::Cost => write!(f, "COST"),
            PredictionType::PropertyListings => write!(f, "PROPERTY_LISTINGS"),
        }
    }
}

/// Provider-agnostic prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    #[serde(rename = "type")]
    pub prediction_type: PredictionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    #[serde(default)]
    pub features: FeatureMap,
}

impl PredictionRequest {
    pub fn new(prediction_type: PredictionType) -> Self {
        Self {
            prediction_type,
            resource: None,
            service: None,
            period: None,
            target_date: None,
            features: FeatureMap::new(),
        }
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    pub fn target_date(mut self, target_date: impl Into<String>) -> Self {
        self.target_date = Some(target_date.into());
        self
    }

    pub fn features(mut self, features: FeatureMap) -> Self {
        self.features = features;
        self
    }
}

/// A single point returned by the prediction backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub value: f64,
    #[serde(default)]
    pub confidence: f64,
    /// Backend-specific extras (risk factors, opportunities, ...)
    #[serde(default, skip_serializing_if = "FeatureMap::is_empty")]
    pub details: FeatureMap,
}

impl PredictionPoint {
    pub fn new(timestamp: Option<&str>, value: f64, confidence: f64) -> Self {
        Self {
            timestamp: timestamp.map(str::to_string),
            value,
            confidence,
            details: FeatureMap::new(),
        }
    }
}

/// Generic prediction backend response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    #[serde(default)]
    pub predictions: Vec<PredictionPoint>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

/// Anomaly detection request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyDetectionRequest {
    pub metric: String,
    pub values: Vec<f64>,
    #[serde(default)]
    pub context: FeatureMap,
}

/// Anomaly reported by the anomaly backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<f64>,
    pub severity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyDetectionResponse {
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
    #[serde(default)]
    pub confidence: f64,
}

/// Recommendation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub category: String,
    #[serde(default)]
    pub context: FeatureMap,
}

/// Recommendation item returned by the recommendation backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_impact: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    #[serde(default)]
    pub recommendations: Vec<RecommendationItem>,
    #[serde(default)]
    pub confidence: f64,
}
