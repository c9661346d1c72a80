//! HTTP API: facade routes, health checks and Prometheus metrics

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use insights_lib::{
    health::{components, ComponentStatus, HealthRegistry},
    models::FeatureMap,
    predictor::{ForecastScheduler, PredictionOutcome, PredictionService},
    seo::{KeywordResearch, SeoError, SeoOptimizationRequest, SeoOptimizationService},
    storage::PageRequest,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub predictions: PredictionService,
    pub seo: SeoOptimizationService,
    pub scheduler: Option<Arc<ForecastScheduler>>,
}

impl AppState {
    pub fn new(
        health_registry: HealthRegistry,
        predictions: PredictionService,
        seo: SeoOptimizationService,
    ) -> Self {
        Self {
            health_registry,
            predictions,
            seo,
            scheduler: None,
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<ForecastScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    error: String,
}

/// `SeoError` as an HTTP response
pub struct ApiError(SeoError);

impl From<SeoError> for ApiError {
    fn from(e: SeoError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SeoError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SeoError::NotFound(_) => StatusCode::NOT_FOUND,
            SeoError::LocalSeo(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SeoError::Optimization(_)
            | SeoError::KeywordResearch(_)
            | SeoError::CompetitorAnalysis(_)
            | SeoError::TechnicalAudit(_) => StatusCode::BAD_GATEWAY,
            SeoError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            kind: self.0.kind(),
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

// Prediction routes

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUsageBody {
    pub resource_type: String,
    pub period: String,
    #[serde(default)]
    pub features: FeatureMap,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceWindowBody {
    pub service: String,
    #[serde(alias = "targetDate")]
    pub period: String,
    #[serde(default)]
    pub features: FeatureMap,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityBody {
    pub resource_type: String,
    pub target_date: String,
    #[serde(default)]
    pub features: FeatureMap,
}

#[derive(Debug, Deserialize)]
pub struct AnomalyBody {
    pub metric: String,
    pub values: Vec<f64>,
    #[serde(default)]
    pub context: FeatureMap,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationBody {
    pub category: String,
    #[serde(default)]
    pub context: FeatureMap,
}

/// Record backend health from a prediction outcome
async fn observed<T>(state: &AppState, outcome: PredictionOutcome<T>) -> Json<PredictionOutcome<T>> {
    match outcome.error_message() {
        None => state.health_registry.set_healthy(components::PREDICTION_BACKEND).await,
        Some(message) => {
            state
                .health_registry
                .set_degraded(components::PREDICTION_BACKEND, message)
                .await
        }
    }
    Json(outcome)
}

async fn resource_usage(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResourceUsageBody>,
) -> impl IntoResponse {
    let outcome = state
        .predictions
        .predict_resource_usage(&body.resource_type, &body.period, body.features)
        .await;
    observed(&state, outcome).await
}

async fn traffic(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ServiceWindowBody>,
) -> impl IntoResponse {
    let outcome = state
        .predictions
        .predict_traffic(&body.service, &body.period, body.features)
        .await;
    observed(&state, outcome).await
}

async fn anomalies(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnomalyBody>,
) -> impl IntoResponse {
    let outcome = state
        .predictions
        .detect_anomalies(&body.metric, body.values, body.context)
        .await;
    observed(&state, outcome).await
}

async fn recommendations(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecommendationBody>,
) -> impl IntoResponse {
    let outcome = state
        .predictions
        .get_recommendations(&body.category, body.context)
        .await;
    observed(&state, outcome).await
}

async fn sla(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ServiceWindowBody>,
) -> impl IntoResponse {
    let outcome = state
        .predictions
        .predict_sla(&body.service, &body.period, body.features)
        .await;
    observed(&state, outcome).await
}

async fn capacity(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CapacityBody>,
) -> impl IntoResponse {
    let outcome = state
        .predictions
        .predict_capacity(&body.resource_type, &body.target_date, body.features)
        .await;
    observed(&state, outcome).await
}

async fn cost(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ServiceWindowBody>,
) -> impl IntoResponse {
    let outcome = state
        .predictions
        .predict_cost_optimization(&body.service, &body.period, body.features)
        .await;
    observed(&state, outcome).await
}

/// Trigger one forecast firing; 409 while one is in progress
async fn run_forecast(State(state): State<Arc<AppState>>) -> Response {
    let Some(scheduler) = &state.scheduler else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorBody {
                kind: "FORECAST_DISABLED",
                error: "Forecast job is disabled".to_string(),
            }),
        )
            .into_response();
    };

    match scheduler.run_once().await {
        Some(report) => Json(report).into_response(),
        None => (
            StatusCode::CONFLICT,
            Json(ErrorBody {
                kind: "FORECAST_RUNNING",
                error: "Forecast run already in progress".to_string(),
            }),
        )
            .into_response(),
    }
}

// SEO routes

/// Mark the repository from storage outcomes
async fn track_repository<T>(state: &AppState, result: &Result<T, SeoError>) {
    match result {
        Err(SeoError::Storage(e)) => {
            state
                .health_registry
                .set_unhealthy(components::REPOSITORY, e.to_string())
                .await
        }
        Ok(_) => state.health_registry.set_healthy(components::REPOSITORY).await,
        Err(_) => {}
    }
}

async fn optimize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SeoOptimizationRequest>,
) -> ApiResult<insights_lib::seo::SeoOptimizationResponse> {
    let result = state.seo.optimize(request).await;
    track_repository(&state, &result).await;
    // Only the generation stage talks to the chat backend
    let chat_involved = match &result {
        Ok(_) => true,
        Err(e) => e.is_generation_failure(),
    };
    if chat_involved {
        state
            .health_registry
            .record(components::CHAT_BACKEND, &result)
            .await;
    }
    Ok(Json(result?))
}

async fn research_keywords(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SeoOptimizationRequest>,
) -> ApiResult<KeywordResearch> {
    Ok(Json(state.seo.research_keywords(&request).await?))
}

#[derive(Debug, Deserialize)]
pub struct CompetitorBody {
    pub request: SeoOptimizationRequest,
    pub keywords: KeywordResearch,
}

async fn analyze_competitors(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CompetitorBody>,
) -> ApiResult<insights_lib::seo::CompetitorAnalysis> {
    Ok(Json(
        state
            .seo
            .analyze_competitors(&body.request, &body.keywords)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct LocalSeoBody {
    pub property_id: String,
    pub location: String,
}

async fn local_seo(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LocalSeoBody>,
) -> ApiResult<insights_lib::seo::LocalSeoReport> {
    Ok(Json(
        state
            .seo
            .optimize_local_seo(&body.property_id, &body.location)
            .await?,
    ))
}

async fn score_content(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SeoOptimizationRequest>,
) -> ApiResult<insights_lib::seo::ContentScoreReport> {
    Ok(Json(state.seo.score_content(&request).await?))
}

async fn get_optimization(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<insights_lib::storage::SeoOptimization> {
    let result = state.seo.get_optimization(id).await;
    track_repository(&state, &result).await;
    Ok(Json(result?))
}

async fn technical_audit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<insights_lib::seo::TechnicalAuditReport> {
    Ok(Json(state.seo.technical_audit(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub size: usize,
}

fn default_page_size() -> usize {
    PageRequest::default().size
}

async fn optimization_history(
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<insights_lib::storage::Page<insights_lib::storage::SeoOptimization>> {
    let result = state
        .seo
        .optimization_history(&property_id, PageRequest::new(query.page, query.size))
        .await;
    track_repository(&state, &result).await;
    Ok(Json(result?))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/predictions/resource-usage", post(resource_usage))
        .route("/api/v1/predictions/traffic", post(traffic))
        .route("/api/v1/predictions/anomalies", post(anomalies))
        .route("/api/v1/predictions/recommendations", post(recommendations))
        .route("/api/v1/predictions/sla", post(sla))
        .route("/api/v1/predictions/capacity", post(capacity))
        .route("/api/v1/predictions/cost", post(cost))
        .route("/api/v1/forecasts/run", post(run_forecast))
        .route("/api/v1/seo/optimize", post(optimize))
        .route("/api/v1/seo/keywords", post(research_keywords))
        .route("/api/v1/seo/competitors", post(analyze_competitors))
        .route("/api/v1/seo/local", post(local_seo))
        .route("/api/v1/seo/score", post(score_content))
        .route("/api/v1/seo/optimizations/:id", get(get_optimization))
        .route("/api/v1/seo/optimizations/:id/audit", get(technical_audit))
        .route(
            "/api/v1/seo/properties/:property_id/history",
            get(optimization_history),
        )
        .with_state(state)
}

/// Start the API server
pub async fn serve(
    port: u16,
    state: Arc<AppState>,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    Ok(())
}
