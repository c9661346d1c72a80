//! Server configuration

use anyhow::{Context, Result};
use insights_lib::cache::CacheConfig;
use insights_lib::client::{BackendConfig, ChatConfig};
use insights_lib::predictor::ForecastConfig;
use insights_lib::seo::SeoConfig;
use insights_lib::storage::StorageConfig;
use serde::Deserialize;

/// Environment variable naming an optional configuration file
pub const CONFIG_FILE_ENV: &str = "INSIGHTS_CONFIG";

/// Server configuration
///
/// Every field has a default. Environment variables override them using
/// the `INSIGHTS` prefix and `__` as the section separator, e.g.
/// `INSIGHTS__CHAT__MODEL` or `INSIGHTS__SEO__MAX_KEYWORDS`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Instance name attached to structured log records
    pub instance: String,

    /// API server port for facade routes, health and metrics
    pub api_port: u16,

    /// Run the periodic forecast job
    pub forecast_enabled: bool,

    pub backends: BackendConfig,
    pub chat: ChatConfig,
    pub seo: SeoConfig,
    pub forecast: ForecastConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            instance: std::env::var("HOSTNAME").unwrap_or_else(|_| "insights".to_string()),
            api_port: 8080,
            forecast_enabled: true,
            backends: BackendConfig::default(),
            chat: ChatConfig::default(),
            seo: SeoConfig::default(),
            forecast: ForecastConfig::default(),
            cache: CacheConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the optional file and the environment
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.add_source(config::File::with_name(&path).required(true));
        }

        Self::from_builder(builder.add_source(
            config::Environment::with_prefix("INSIGHTS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        ))
    }

    fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}
