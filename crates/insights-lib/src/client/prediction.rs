//! Prediction, anomaly and recommendation backend adapters

use super::JsonClient;
use crate::models::{
    AnomalyDetectionRequest, AnomalyDetectionResponse, PredictionRequest, PredictionResponse,
    RecommendationRequest, RecommendationResponse,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Remote backends used by the prediction facade
#[async_trait]
pub trait PredictionBackend: Send + Sync {
    /// Run a prediction on the prediction backend
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse>;

    /// Run anomaly detection on the anomaly backend
    async fn detect_anomalies(
        &self,
        request: &AnomalyDetectionRequest,
    ) -> Result<AnomalyDetectionResponse>;

    /// Ask the recommendation backend for recommendations
    async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResponse>;
}

/// Endpoints of the three prediction backends
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub prediction_url: String,
    pub anomaly_url: String,
    pub recommendation_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            prediction_url: "http://prediction-service:8000".to_string(),
            anomaly_url: "http://anomaly-service:8001".to_string(),
            recommendation_url: "http://recommendation-service:8002".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// HTTP implementation of [`PredictionBackend`]
pub struct HttpPredictionBackend {
    prediction: JsonClient,
    anomaly: JsonClient,
    recommendation: JsonClient,
}

impl HttpPredictionBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            prediction: JsonClient::with_client(client.clone(), &config.prediction_url)
                .context("Invalid prediction backend URL")?,
            anomaly: JsonClient::with_client(client.clone(), &config.anomaly_url)
                .context("Invalid anomaly backend URL")?,
            recommendation: JsonClient::with_client(client, &config.recommendation_url)
                .context("Invalid recommendation backend URL")?,
        })
    }
}

#[async_trait]
impl PredictionBackend for HttpPredictionBackend {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        debug!(prediction_type = %request.prediction_type, "Calling prediction backend");
        self.prediction.post("predict", request).await
    }

    async fn detect_anomalies(
        &self,
        request: &AnomalyDetectionRequest,
    ) -> Result<AnomalyDetectionResponse> {
        debug!(metric = %request.metric, samples = request.values.len(), "Calling anomaly backend");
        self.anomaly.post("detect", request).await
    }

    async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResponse> {
        debug!(category = %request.category, "Calling recommendation backend");
        self.recommendation.post("recommend", request).await
    }
}
