//! Realty insights server
//!
//! Serves the prediction and SEO facades over HTTP and runs the periodic
//! forecast job.

use anyhow::{Context, Result};
use insights_lib::{
    cache::InMemoryCache,
    client::{HttpPredictionBackend, OpenAiChatClient},
    health::HealthRegistry,
    observability::StructuredLogger,
    predictor::{ForecastScheduler, PredictionService},
    seo::SeoOptimizationService,
    storage::{InMemorySeoRepository, SeoRepository, SqliteSeoRepository},
};
use realty_insights::{api, config};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting insights-server");

    let config = config::AppConfig::load()?;
    info!(instance = %config.instance, port = config.api_port, "Service configured");

    let health_registry = HealthRegistry::new();
    health_registry.register_all().await;

    let backend = Arc::new(
        HttpPredictionBackend::new(&config.backends).context("Failed to build prediction backend")?,
    );
    let chat = OpenAiChatClient::new(config.chat.clone()).context("Failed to build chat client")?;
    let ai_model = chat.model().to_string();

    let repository: Arc<dyn SeoRepository> = match &config.storage.database_path {
        Some(path) => Arc::new(
            SqliteSeoRepository::open(path)
                .with_context(|| format!("Failed to open database {}", path.display()))?,
        ),
        None => Arc::new(InMemorySeoRepository::new()),
    };

    let predictions = PredictionService::with_cache(
        backend.clone(),
        Arc::new(InMemoryCache::from_config(&config.cache)),
    );
    let seo = SeoOptimizationService::builder(Arc::new(chat), repository)
        .config(config.seo.clone())
        .build();

    let logger = StructuredLogger::new(&config.instance);
    logger.log_startup(SERVICE_VERSION, &ai_model);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let mut app_state = api::AppState::new(health_registry.clone(), predictions, seo);
    if config.forecast_enabled {
        let scheduler = Arc::new(
            ForecastScheduler::new(backend, config.forecast.clone())
                .with_health(health_registry.clone()),
        );
        tokio::spawn(scheduler.clone().run(shutdown_tx.subscribe()));
        app_state = app_state.with_scheduler(scheduler);
    }

    health_registry.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(
        config.api_port,
        Arc::new(app_state),
        shutdown_tx.subscribe(),
    ));

    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    let _ = shutdown_tx.send(());

    match api_handle.await {
        Ok(Err(e)) => error!(error = %e, "API server exited with error"),
        Err(e) => error!(error = %e, "API server task panicked"),
        Ok(Ok(())) => {}
    }

    info!("Shutdown complete");
    Ok(())
}
