//! Prediction facade
//!
//! Builds provider-agnostic requests, calls the remote backends and maps
//! the generic responses into typed results. Failures never escape: they
//! are logged and returned as [`PredictionOutcome::Error`].

use super::mapping::{
    map_anomalies, map_capacity, map_cost, map_recommendations, map_resource, map_sla,
    map_traffic,
};
use super::outcome::{
    AnomalyDetectionResult, CapacityPrediction, CostOptimizationPrediction, PredictionOutcome,
    Recommendations, ResourcePrediction, SlaPrediction, TrafficPrediction,
};
use crate::audit::audited;
use crate::cache::{cached, resource_usage_key, InMemoryCache, ResultCache};
use crate::client::PredictionBackend;
use crate::models::{
    AnomalyDetectionRequest, FeatureMap, PredictionRequest, PredictionType, RecommendationRequest,
};
use crate::observability::StructuredLogger;
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Cache of resource usage outcomes keyed by `(resource type, period)`
pub type ResourceCache = dyn ResultCache<PredictionOutcome<ResourcePrediction>>;

/// Facade over the prediction, anomaly and recommendation backends
#[derive(Clone)]
pub struct PredictionService {
    backend: Arc<dyn PredictionBackend>,
    resource_cache: Arc<ResourceCache>,
    logger: StructuredLogger,
}

impl PredictionService {
    pub fn new(backend: Arc<dyn PredictionBackend>) -> Self {
        Self::with_cache(backend, Arc::new(InMemoryCache::new()))
    }

    pub fn with_cache(backend: Arc<dyn PredictionBackend>, resource_cache: Arc<ResourceCache>) -> Self {
        Self {
            backend,
            resource_cache,
            logger: StructuredLogger::new("prediction-facade"),
        }
    }

    /// Submit an operation to the runtime and return a handle to await
    pub fn submit<F, Fut, T>(&self, operation: F) -> JoinHandle<T>
    where
        F: FnOnce(PredictionService) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        tokio::spawn(operation(self.clone()))
    }

    /// Resource usage forecast, cached per `(resource_type, period)`
    pub async fn predict_resource_usage(
        &self,
        resource_type: &str,
        period: &str,
        features: FeatureMap,
    ) -> PredictionOutcome<ResourcePrediction> {
        let compute = audited("predict_resource_usage", async {
            let request = PredictionRequest::new(PredictionType::ResourceUsage)
                .resource(resource_type)
                .period(period)
                .features(features);
            let result = self
                .backend
                .predict(&request)
                .await
                .context("Resource usage prediction failed")
                .map(|response| map_resource(resource_type, period, response));
            self.finish("predict_resource_usage", result)
        });

        cached(
            self.resource_cache.as_ref(),
            "resource_usage",
            resource_usage_key(resource_type, period),
            compute,
            |outcome| {
                outcome
                    .data()
                    .map(|d| !d.predictions.is_empty())
                    .unwrap_or(false)
            },
        )
        .await
    }

    pub async fn predict_traffic(
        &self,
        service: &str,
        target_date: &str,
        features: FeatureMap,
    ) -> PredictionOutcome<TrafficPrediction> {
        audited("predict_traffic", async {
            let request = PredictionRequest::new(PredictionType::Traffic)
                .service(service)
                .target_date(target_date)
                .features(features);
            let result = async {
                let response = self
                    .backend
                    .predict(&request)
                    .await
                    .context("Traffic prediction failed")?;
                map_traffic(service, target_date, response)
            }
            .await;
            self.finish("predict_traffic", result)
        })
        .await
    }

    pub async fn detect_anomalies(
        &self,
        metric: &str,
        values: Vec<f64>,
        context: FeatureMap,
    ) -> PredictionOutcome<AnomalyDetectionResult> {
        audited("detect_anomalies", async {
            let request = AnomalyDetectionRequest {
                metric: metric.to_string(),
                values,
                context,
            };
            let result = self
                .backend
                .detect_anomalies(&request)
                .await
                .context("Anomaly detection failed")
                .map(|response| map_anomalies(metric, response));
            self.finish("detect_anomalies", result)
        })
        .await
    }

    pub async fn get_recommendations(
        &self,
        category: &str,
        context: FeatureMap,
    ) -> PredictionOutcome<Recommendations> {
        audited("get_recommendations", async {
            let request = RecommendationRequest {
                category: category.to_string(),
                context,
            };
            let result = self
                .backend
                .recommend(&request)
                .await
                .context("Recommendation request failed")
                .map(|response| map_recommendations(category, response));
            self.finish("get_recommendations", result)
        })
        .await
    }

    pub async fn predict_sla(
        &self,
        service: &str,
        period: &str,
        features: FeatureMap,
    ) -> PredictionOutcome<SlaPrediction> {
        audited("predict_sla", async {
            let request = PredictionRequest::new(PredictionType::Sla)
                .service(service)
                .period(period)
                .features(features);
            let result = self
                .backend
                .predict(&request)
                .await
                .context("SLA prediction failed")
                .map(|response| map_sla(service, period, response));
            self.finish("predict_sla", result)
        })
        .await
    }

    pub async fn predict_capacity(
        &self,
        resource_type: &str,
        target_date: &str,
        features: FeatureMap,
    ) -> PredictionOutcome<CapacityPrediction> {
        audited("predict_capacity", async {
            let request = PredictionRequest::new(PredictionType::Capacity)
                .resource(resource_type)
                .target_date(target_date)
                .features(features);
            let result = self
                .backend
                .predict(&request)
                .await
                .context("Capacity prediction failed")
                .map(|response| {
                    map_capacity(resource_type, target_date, &request.features, response)
                });
            self.finish("predict_capacity", result)
        })
        .await
    }

    pub async fn predict_cost_optimization(
        &self,
        service: &str,
        period: &str,
        features: FeatureMap,
    ) -> PredictionOutcome<CostOptimizationPrediction> {
        audited("predict_cost_optimization", async {
            let request = PredictionRequest::new(PredictionType::Cost)
                .service(service)
                .period(period)
                .features(features);
            let result = self
                .backend
                .predict(&request)
                .await
                .context("Cost optimization prediction failed")
                .map(|response| map_cost(service, period, &request.features, response));
            self.finish("predict_cost_optimization", result)
        })
        .await
    }

    fn finish<T>(&self, operation: &str, result: Result<T>) -> PredictionOutcome<T> {
        if let Err(e) = &result {
            self.logger
                .log_prediction_failure(operation, &format!("{:#}", e));
        }
        result.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Anomaly, AnomalyDetectionResponse, FeatureValue, PredictionPoint, PredictionResponse,
        RecommendationItem, RecommendationResponse,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Backend returning canned responses and recording requests
    #[derive(Default)]
    struct StubBackend {
        prediction: Mutex<Option<PredictionResponse>>,
        fail: bool,
        calls: AtomicUsize,
        last_request: Mutex<Option<PredictionRequest>>,
    }

    impl StubBackend {
        fn returning(points: Vec<PredictionPoint>) -> Self {
            Self {
                prediction: Mutex::new(Some(PredictionResponse {
                    predictions: points,
                    confidence: 0.8,
                    model_version: None,
                })),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl PredictionBackend for StubBackend {
        async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            if self.fail {
                anyhow::bail!("connection refused");
            }
            Ok(self.prediction.lock().unwrap().clone().unwrap_or_default())
        }

        async fn detect_anomalies(
            &self,
            _request: &AnomalyDetectionRequest,
        ) -> Result<AnomalyDetectionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("connection refused");
            }
            Ok(AnomalyDetectionResponse {
                anomalies: vec![
                    Anomaly {
                        timestamp: None,
                        value: 5.0,
                        expected_value: None,
                        severity: 0.4,
                        description: None,
                    },
                    Anomaly {
                        timestamp: None,
                        value: 9.0,
                        expected_value: None,
                        severity: 0.95,
                        description: Some("spike".to_string()),
                    },
                ],
                confidence: 0.9,
            })
        }

        async fn recommend(
            &self,
            _request: &RecommendationRequest,
        ) -> Result<RecommendationResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("connection refused");
            }
            let item = |priority: &str| RecommendationItem {
                id: None,
                title: "Adjust pricing".to_string(),
                description: String::new(),
                priority: priority.to_string(),
                estimated_impact: Some(0.1),
            };
            Ok(RecommendationResponse {
                recommendations: vec![item("HIGH"), item("MEDIUM"), item("Medium")],
                confidence: 0.7,
            })
        }
    }

    fn point(ts: &str, value: f64) -> PredictionPoint {
        PredictionPoint::new(Some(ts), value, 0.9)
    }

    #[tokio::test]
    async fn test_resource_usage_success_and_request_shape() {
        let backend = Arc::new(StubBackend::returning(vec![
            point("2024-01-01T00:00:00", 1.0),
            point("2024-01-01T01:00:00", 3.0),
        ]));
        let service = PredictionService::new(backend.clone());

        let outcome = service
            .predict_resource_usage("cpu", "24h", FeatureMap::new())
            .await;
        let data = outcome.data().unwrap();
        assert_eq!(data.average_usage, 2.0);
        assert_eq!(data.peak_usage, 3.0);

        let request = backend.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.prediction_type, PredictionType::ResourceUsage);
        assert_eq!(request.resource.as_deref(), Some("cpu"));
        assert_eq!(request.period.as_deref(), Some("24h"));
    }

    #[tokio::test]
    async fn test_resource_usage_is_cached_per_key() {
        let backend = Arc::new(StubBackend::returning(vec![point("2024-01-01T00:00:00", 1.0)]));
        let service = PredictionService::new(backend.clone());

        service.predict_resource_usage("cpu", "24h", FeatureMap::new()).await;
        service.predict_resource_usage("cpu", "24h", FeatureMap::new()).await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        service.predict_resource_usage("cpu", "7d", FeatureMap::new()).await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resource_usage_errors_are_not_cached() {
        let backend = Arc::new(StubBackend::failing());
        let service = PredictionService::new(backend.clone());

        let first = service
            .predict_resource_usage("cpu", "24h", FeatureMap::new())
            .await;
        assert!(first.error_message().unwrap().contains("connection refused"));
        service.predict_resource_usage("cpu", "24h", FeatureMap::new()).await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resource_usage_empty_series_not_cached() {
        let backend = Arc::new(StubBackend::returning(vec![]));
        let service = PredictionService::new(backend.clone());

        let outcome = service
            .predict_resource_usage("disk", "24h", FeatureMap::new())
            .await;
        assert_eq!(outcome.data().unwrap().average_usage, 0.0);
        service.predict_resource_usage("disk", "24h", FeatureMap::new()).await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_traffic_malformed_timestamp_is_error_outcome() {
        let backend = Arc::new(StubBackend::returning(vec![
            point("2024-01-01T00:00:00", 10.0),
            point("yesterday", 20.0),
        ]));
        let service = PredictionService::new(backend);

        let outcome = service
            .predict_traffic("search", "2024-01-01", FeatureMap::new())
            .await;
        assert!(!outcome.is_success());
        assert!(outcome.error_message().unwrap().contains("yesterday"));
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_error_outcome() {
        let service = PredictionService::new(Arc::new(StubBackend::failing()));

        assert!(!service
            .predict_traffic("search", "2024-01-01", FeatureMap::new())
            .await
            .is_success());
        assert!(!service
            .detect_anomalies("latency", vec![1.0], FeatureMap::new())
            .await
            .is_success());
        assert!(!service
            .get_recommendations("pricing", FeatureMap::new())
            .await
            .is_success());
        assert!(!service
            .predict_sla("booking", "30d", FeatureMap::new())
            .await
            .is_success());
        assert!(!service
            .predict_capacity("storage", "2024-09-01", FeatureMap::new())
            .await
            .is_success());
        assert!(!service
            .predict_cost_optimization("search", "30d", FeatureMap::new())
            .await
            .is_success());
    }

    #[tokio::test]
    async fn test_anomalies_and_recommendations_mapping() {
        let service = PredictionService::new(Arc::new(StubBackend::default()));

        let anomalies = service
            .detect_anomalies("latency", vec![1.0, 5.0, 9.0], FeatureMap::new())
            .await
            .into_data()
            .unwrap();
        assert!(anomalies.has_anomalies);
        assert_eq!(anomalies.severity, 0.95);

        let recommendations = service
            .get_recommendations("pricing", FeatureMap::new())
            .await
            .into_data()
            .unwrap();
        assert_eq!(recommendations.high_priority_count, 1);
    }

    #[tokio::test]
    async fn test_capacity_uses_request_features() {
        let backend = Arc::new(StubBackend::returning(vec![point("2024-08-01T00:00:00", 150.0)]));
        let service = PredictionService::new(backend);
        let mut features = FeatureMap::new();
        features.insert("currentCapacity".to_string(), FeatureValue::Integer(100));

        let capacity = service
            .predict_capacity("storage", "2024-09-01", features)
            .await
            .into_data()
            .unwrap();
        assert!(capacity.scale_up_required);
        assert_eq!(capacity.exhaustion_time.as_deref(), Some("2024-08-01T00:00:00"));
    }

    #[tokio::test]
    async fn test_submit_returns_awaitable_handle() {
        let backend = Arc::new(StubBackend::returning(vec![point("2024-01-01T00:00:00", 4.0)]));
        let service = PredictionService::new(backend);

        let handle = service.submit(|svc| async move {
            svc.predict_sla("booking", "30d", FeatureMap::new()).await
        });
        let outcome = handle.await.unwrap();
        assert_eq!(outcome.data().unwrap().compliance_probability, Some(4.0));
    }
}
