//! Integration tests for the insights API endpoints

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use insights_lib::{
    client::{ChatClient, PredictionBackend},
    health::{components, HealthRegistry},
    models::{
        AnomalyDetectionRequest, AnomalyDetectionResponse, PredictionPoint, PredictionRequest,
        PredictionResponse, RecommendationRequest, RecommendationResponse,
    },
    predictor::{ForecastConfig, ForecastScheduler, PredictionService},
    seo::{
        ContentAnalysis, KeywordResearch, KeywordResearcher, SeoOptimizationRequest,
        SeoOptimizationService,
    },
    storage::InMemorySeoRepository,
    ComponentStatus,
};
use realty_insights::api::{create_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const AI_REPLY: &str = "\
# Modern Condo in Denver
A bright two-bedroom condo steps from Union Station.
## Location
Walk to restaurants and light rail. See [Denver listings](/listings/denver).
## Amenities
Rooftop deck, fitness center and secure parking.
## Financing
Read our [buyer guide](/guides/buyers) before you make an offer.
CTA: Book a private tour this weekend.";

struct StubBackend {
    fail: bool,
}

#[async_trait]
impl PredictionBackend for StubBackend {
    async fn predict(&self, _request: &PredictionRequest) -> Result<PredictionResponse> {
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        Ok(PredictionResponse {
            predictions: vec![
                PredictionPoint::new(Some("2026-01-01T00:00:00"), 40.0, 0.9),
                PredictionPoint::new(Some("2026-01-01T01:00:00"), 60.0, 0.9),
            ],
            confidence: 0.9,
            model_version: Some("v3".to_string()),
        })
    }

    async fn detect_anomalies(
        &self,
        _request: &AnomalyDetectionRequest,
    ) -> Result<AnomalyDetectionResponse> {
        Ok(AnomalyDetectionResponse::default())
    }

    async fn recommend(&self, _request: &RecommendationRequest) -> Result<RecommendationResponse> {
        Ok(RecommendationResponse::default())
    }
}

struct StubChat;

#[async_trait]
impl ChatClient for StubChat {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(AI_REPLY.to_string())
    }
}

struct FailingResearcher;

#[async_trait]
impl KeywordResearcher for FailingResearcher {
    async fn research(
        &self,
        _request: &SeoOptimizationRequest,
        _analysis: &ContentAnalysis,
        _max_keywords: usize,
    ) -> Result<KeywordResearch> {
        Err(anyhow!("keyword provider unavailable"))
    }
}

struct SilentChat;

#[async_trait]
impl ChatClient for SilentChat {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("chat quota exceeded"))
    }
}

async fn setup_test_app(backend_fails: bool) -> (Router, Arc<AppState>) {
    let seo = SeoOptimizationService::builder(
        Arc::new(StubChat),
        Arc::new(InMemorySeoRepository::new()),
    )
    .build();
    setup_app_with_seo(backend_fails, seo).await
}

async fn setup_app_with_seo(
    backend_fails: bool,
    seo: SeoOptimizationService,
) -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register_all().await;
    health_registry.set_ready(true).await;

    let backend = Arc::new(StubBackend {
        fail: backend_fails,
    });
    let predictions = PredictionService::new(backend.clone());
    let scheduler = Arc::new(
        ForecastScheduler::new(backend, ForecastConfig::default())
            .with_health(health_registry.clone()),
    );

    let state = Arc::new(AppState::new(health_registry, predictions, seo).with_scheduler(scheduler));
    (create_router(state.clone()), state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, value)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn optimize_body() -> Value {
    json!({
        "property_id": "listing-42",
        "content_type": "property listing",
        "original_content": "Bright condo near Union Station with rooftop deck and parking.",
        "location": "Denver",
        "property_type": "Condo"
    })
}

#[tokio::test]
async fn test_healthz_returns_ok_when_healthy() {
    let (app, _state) = setup_test_app(false).await;

    let (status, health) = send(app, get("/healthz")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["components"]["repository"]["status"], "healthy");
}

#[tokio::test]
async fn test_healthz_returns_503_when_unhealthy() {
    let (app, state) = setup_test_app(false).await;
    state
        .health_registry
        .set_unhealthy(components::REPOSITORY, "database locked")
        .await;

    let (status, health) = send(app, get("/healthz")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["status"], "unhealthy");
}

#[tokio::test]
async fn test_readyz_ignores_degraded_chat_backend() {
    let (app, state) = setup_test_app(false).await;
    state
        .health_registry
        .set_unhealthy(components::CHAT_BACKEND, "quota exceeded")
        .await;

    let (status, readiness) = send(app, get("/readyz")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_readyz_returns_503_before_initialization() {
    let (app, state) = setup_test_app(false).await;
    state.health_registry.set_ready(false).await;

    let (status, readiness) = send(app, get("/readyz")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readiness["ready"], false);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _state) = setup_test_app(false).await;

    let response = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/plain; charset=utf-8"
    );
}

#[tokio::test]
async fn test_resource_usage_prediction() {
    let (app, _state) = setup_test_app(false).await;

    let (status, body) = send(
        app,
        post_json(
            "/api/v1/predictions/resource-usage",
            json!({"resourceType": "cpu", "period": "24h"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["average_usage"], 50.0);
    assert_eq!(body["peak_usage"], 60.0);
}

#[tokio::test]
async fn test_backend_failure_is_error_outcome_and_degrades_health() {
    let (app, state) = setup_test_app(true).await;

    let (status, body) = send(
        app,
        post_json(
            "/api/v1/predictions/sla",
            json!({"service": "listing-api", "period": "7d"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("connection refused"));

    let health = state.health_registry.health().await;
    assert_eq!(
        health.components[components::PREDICTION_BACKEND].status,
        ComponentStatus::Degraded
    );
}

#[tokio::test]
async fn test_empty_anomaly_series_succeeds() {
    let (app, _state) = setup_test_app(false).await;

    let (status, body) = send(
        app,
        post_json(
            "/api/v1/predictions/anomalies",
            json!({"metric": "page_views", "values": []}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn test_forecast_run_returns_report() {
    let (app, _state) = setup_test_app(false).await;

    let (status, report) = send(app, post_json("/api/v1/forecasts/run", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(report["outcomes"].is_array());
}

#[tokio::test]
async fn test_optimize_then_fetch_and_audit() {
    let (app, _state) = setup_test_app(false).await;

    let (status, response) = send(
        app.clone(),
        post_json("/api/v1/seo/optimize", optimize_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["content_type"], "PROPERTY_LISTING");
    assert_eq!(response["content"]["title"], "Modern Condo in Denver");
    let id = response["optimization_id"].as_i64().unwrap();

    let (status, record) = send(app.clone(), get(&format!("/api/v1/seo/optimizations/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["property_id"], "listing-42");

    let (status, audit) = send(
        app.clone(),
        get(&format!("/api/v1/seo/optimizations/{id}/audit")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audit["optimization_id"], id);

    let (status, history) = send(
        app,
        get("/api/v1/seo/properties/listing-42/history?page=0&size=5"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["total_count"], 1);
}

#[tokio::test]
async fn test_optimize_rejects_empty_content() {
    let (app, _state) = setup_test_app(false).await;
    let mut body = optimize_body();
    body["original_content"] = json!("   ");

    let (status, error) = send(app, post_json("/api/v1/seo/optimize", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["kind"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_unknown_optimization_is_404() {
    let (app, _state) = setup_test_app(false).await;

    let (status, error) = send(app, get("/api/v1/seo/optimizations/999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["kind"], "NOT_FOUND");
}

#[tokio::test]
async fn test_local_seo_report() {
    let (app, _state) = setup_test_app(false).await;

    let (status, report) = send(
        app,
        post_json(
            "/api/v1/seo/local",
            json!({"property_id": "listing-42", "location": "Denver"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["location"], "Denver");
    assert_eq!(report["place_schema"]["@type"], "Place");
}

#[tokio::test]
async fn test_keyword_failure_leaves_chat_backend_healthy() {
    let seo = SeoOptimizationService::builder(
        Arc::new(StubChat),
        Arc::new(InMemorySeoRepository::new()),
    )
    .keyword_researcher(Arc::new(FailingResearcher))
    .build();
    let (app, state) = setup_app_with_seo(false, seo).await;

    let (status, error) = send(app, post_json("/api/v1/seo/optimize", optimize_body())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error["kind"], "OPTIMIZATION");
    let health = state.health_registry.health().await;
    assert_eq!(
        health.components[components::CHAT_BACKEND].status,
        ComponentStatus::Healthy
    );
}

#[tokio::test]
async fn test_chat_failure_degrades_chat_backend() {
    let seo = SeoOptimizationService::builder(
        Arc::new(SilentChat),
        Arc::new(InMemorySeoRepository::new()),
    )
    .build();
    let (app, state) = setup_app_with_seo(false, seo).await;

    let (status, _error) = send(app, post_json("/api/v1/seo/optimize", optimize_body())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let health = state.health_registry.health().await;
    let chat = &health.components[components::CHAT_BACKEND];
    assert_eq!(chat.status, ComponentStatus::Degraded);
    assert!(chat
        .message
        .as_deref()
        .unwrap()
        .contains("chat quota exceeded"));
    assert_eq!(
        health.components[components::REPOSITORY].status,
        ComponentStatus::Healthy
    );
}

#[tokio::test]
async fn test_out_of_range_history_page_is_empty() {
    let (app, _state) = setup_test_app(false).await;

    let (status, page) = send(
        app,
        get("/api/v1/seo/properties/listing-42/history?page=18446744073709551615"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(page["items"].as_array().unwrap().is_empty());
    assert_eq!(page["has_more"], false);
}
