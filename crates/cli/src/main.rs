//! Realty Insights CLI
//!
//! A command-line tool for running SEO optimizations, querying the
//! prediction facade and checking the health of the insights server.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{predict, seo, system};
use predict::PredictionQuery;

/// Realty Insights CLI
#[derive(Parser)]
#[command(name = "realty")]
#[command(author, version, about = "CLI for the Realty Insights server", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via REALTY_API_URL env var)
    #[arg(long, env = "REALTY_API_URL")]
    pub api_url: Option<String>,

    /// Output format [default: table]
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// SEO content optimization
    #[command(subcommand)]
    Seo(SeoCommands),

    /// Prediction, anomaly and recommendation queries
    #[command(subcommand)]
    Predict(PredictCommands),

    /// Forecast job commands
    #[command(subcommand)]
    Forecast(ForecastCommands),

    /// Show server health and readiness
    Health,

    /// Manage local CLI defaults
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum SeoCommands {
    /// Optimize content and store the result
    Optimize(seo::ContentArgs),

    /// Research keywords for content
    Keywords(seo::ContentArgs),

    /// Compare researched keywords against competitors
    Competitors(seo::ContentArgs),

    /// Score content without rewriting it
    Score(seo::ContentArgs),

    /// Local SEO report for a property
    Local {
        /// Property identifier
        property_id: String,

        /// Location, e.g. "Austin, TX"
        #[arg(long, short)]
        location: String,
    },

    /// Show a stored optimization
    Show {
        /// Optimization ID
        id: i64,
    },

    /// List stored optimizations for a property
    History {
        /// Property identifier
        property_id: String,

        /// Zero-based page number
        #[arg(long, default_value = "0")]
        page: usize,

        /// Page size (defaults to the configured size, then 20)
        #[arg(long)]
        size: Option<usize>,
    },

    /// Technical audit of a stored optimization
    Audit {
        /// Optimization ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum PredictCommands {
    /// Forecast resource usage
    ResourceUsage {
        /// Resource type, e.g. cpu or listing_slots
        resource_type: String,

        /// Forecast period, e.g. 24h or 7d
        #[arg(long, default_value = "24h")]
        period: String,

        #[command(flatten)]
        features: FeatureArgs,
    },

    /// Forecast traffic for a service
    Traffic {
        /// Service name
        service: String,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        #[command(flatten)]
        features: FeatureArgs,
    },

    /// Detect anomalies in a metric series
    Anomalies {
        /// Metric name
        metric: String,

        /// Comma-separated values
        #[arg(long, value_delimiter = ',')]
        values: Vec<f64>,

        #[command(flatten)]
        features: FeatureArgs,
    },

    /// Get recommendations for a category
    Recommendations {
        /// Recommendation category, e.g. pricing
        category: String,

        #[command(flatten)]
        features: FeatureArgs,
    },

    /// Predict SLA compliance
    Sla {
        /// Service name
        service: String,

        /// Period, e.g. 30d
        #[arg(long, default_value = "30d")]
        period: String,

        #[command(flatten)]
        features: FeatureArgs,
    },

    /// Predict capacity needs
    Capacity {
        /// Resource type
        resource_type: String,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        #[command(flatten)]
        features: FeatureArgs,
    },

    /// Predict cost optimization opportunities
    Cost {
        /// Service name
        service: String,

        /// Period, e.g. 30d
        #[arg(long, default_value = "30d")]
        period: String,

        #[command(flatten)]
        features: FeatureArgs,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct FeatureArgs {
    /// Model input as key=value (repeatable)
    #[arg(long = "feature", short = 'F')]
    pub features: Vec<String>,
}

#[derive(Subcommand)]
pub enum ForecastCommands {
    /// Run every forecast pipeline once
    Run,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the saved configuration
    Show,

    /// Save defaults to the configuration file
    Set {
        /// API endpoint URL
        #[arg(long)]
        api_url: Option<String>,

        /// Default output format
        #[arg(long)]
        format: Option<output::OutputFormat>,

        /// Default history page size
        #[arg(long)]
        page_size: Option<usize>,
    },
}

impl PredictCommands {
    fn into_query(self) -> (PredictionQuery, Vec<String>) {
        match self {
            PredictCommands::ResourceUsage {
                resource_type,
                period,
                features,
            } => (
                PredictionQuery::ResourceUsage {
                    resource_type,
                    period,
                },
                features.features,
            ),
            PredictCommands::Traffic {
                service,
                date,
                features,
            } => (
                PredictionQuery::Traffic {
                    service,
                    target_date: date,
                },
                features.features,
            ),
            PredictCommands::Anomalies {
                metric,
                values,
                features,
            } => (
                PredictionQuery::Anomalies { metric, values },
                features.features,
            ),
            PredictCommands::Recommendations { category, features } => (
                PredictionQuery::Recommendations { category },
                features.features,
            ),
            PredictCommands::Sla {
                service,
                period,
                features,
            } => (PredictionQuery::Sla { service, period }, features.features),
            PredictCommands::Capacity {
                resource_type,
                date,
                features,
            } => (
                PredictionQuery::Capacity {
                    resource_type,
                    target_date: date,
                },
                features.features,
            ),
            PredictCommands::Cost {
                service,
                period,
                features,
            } => (PredictionQuery::Cost { service, period }, features.features),
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Local config commands never reach the server
    if let Commands::Config(config_cmd) = cli.command {
        return match config_cmd {
            ConfigCommands::Show => system::show_config(),
            ConfigCommands::Set {
                api_url,
                format,
                page_size,
            } => system::set_config(api_url, format, page_size),
        };
    }

    let config = config::Config::load()?;
    let format = config.resolve_format(cli.format);
    let client = client::ApiClient::new(&config.resolve_api_url(cli.api_url))?;

    match cli.command {
        Commands::Seo(seo_cmd) => match seo_cmd {
            SeoCommands::Optimize(args) => seo::optimize(&client, args, format).await?,
            SeoCommands::Keywords(args) => seo::keywords(&client, args, format).await?,
            SeoCommands::Competitors(args) => seo::competitors(&client, args, format).await?,
            SeoCommands::Score(args) => seo::score(&client, args, format).await?,
            SeoCommands::Local {
                property_id,
                location,
            } => seo::local(&client, &property_id, &location, format).await?,
            SeoCommands::Show { id } => seo::show(&client, id, format).await?,
            SeoCommands::History {
                property_id,
                page,
                size,
            } => {
                let size = size.or(config.page_size).unwrap_or(20);
                seo::history(&client, &property_id, page, size, format).await?
            }
            SeoCommands::Audit { id } => seo::audit(&client, id, format).await?,
        },
        Commands::Predict(predict_cmd) => {
            let (query, pairs) = predict_cmd.into_query();
            let features = commands::parse_features(&pairs)?;
            predict::run(&client, query, features, format).await?;
        }
        Commands::Forecast(ForecastCommands::Run) => system::run_forecast(&client, format).await?,
        Commands::Health => system::health(&client, format).await?,
        Commands::Config(_) => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        if let Some(api_error) = e.downcast_ref::<client::ApiError>() {
            if api_error.status() == 404 {
                output::print_warning("Not found; check the ID or property and try again");
            }
        }
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
