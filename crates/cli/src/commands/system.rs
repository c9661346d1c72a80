//! Server health, forecast and local config commands

use anyhow::Result;
use chrono::{TimeZone, Utc};
use colored::Colorize;
use insights_lib::{predictor::ForecastReport, HealthResponse, ReadinessResponse};
use tabled::Tabled;

use super::label;
use crate::client::ApiClient;
use crate::config::Config;
use crate::output::{
    color_status, print_heading, print_json, print_rows, print_success, print_warning,
    OutputFormat,
};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Last Check")]
    last_check: String,
}

#[derive(Tabled)]
struct PipelineRow {
    #[tabled(rename = "Pipeline")]
    pipeline: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Error")]
    error: String,
}

fn format_timestamp(secs: i64) -> String {
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Show component health and readiness
pub async fn health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health: HealthResponse = client.get("healthz").await.or_else(|e| {
        // 503 still carries the component table
        match e.downcast_ref::<crate::client::ApiError>() {
            Some(crate::client::ApiError::Http { status: 503, body }) => {
                serde_json::from_str(body).map_err(anyhow::Error::from)
            }
            _ => Err(e),
        }
    })?;
    let readiness: Option<ReadinessResponse> = client.get("readyz").await.ok();

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "health": health,
            "readiness": readiness,
        }))?,
        OutputFormat::Table => {
            print_heading("Insights Server Health");
            println!("Status: {}", color_status(&label(&health.status)));
            match &readiness {
                Some(r) if r.ready => println!("Ready:  {}", "yes".green()),
                Some(r) => println!(
                    "Ready:  {} ({})",
                    "no".red(),
                    r.reason.as_deref().unwrap_or("unknown")
                ),
                None => println!("Ready:  {}", "no".red()),
            }
            println!();

            let rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, component)| ComponentRow {
                    name: name.clone(),
                    status: color_status(&label(&component.status)),
                    message: component.message.clone().unwrap_or_default(),
                    last_check: format_timestamp(component.last_check_timestamp),
                })
                .collect();
            print_rows(rows);
        }
    }

    Ok(())
}

/// Trigger one forecast run on the server
pub async fn run_forecast(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let report: ForecastReport = client
        .post("api/v1/forecasts/run", &serde_json::json!({}))
        .await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_heading("Forecast Run");
            println!("Started: {}\n", format_timestamp(report.started_at));
            let rows: Vec<PipelineRow> = report
                .outcomes
                .iter()
                .map(|o| PipelineRow {
                    pipeline: o.pipeline.as_str().to_string(),
                    result: color_status(if o.succeeded { "success" } else { "failed" }),
                    error: o.error.clone().unwrap_or_default(),
                })
                .collect();
            print_rows(rows);

            if report.all_succeeded() {
                print_success("All forecast pipelines completed");
            } else {
                print_warning("Some forecast pipelines failed");
            }
        }
    }

    Ok(())
}

/// Persist CLI defaults to the config file
pub fn set_config(
    api_url: Option<String>,
    default_format: Option<OutputFormat>,
    page_size: Option<usize>,
) -> Result<()> {
    let mut config = Config::load()?;
    if api_url.is_some() {
        config.api_url = api_url;
    }
    if default_format.is_some() {
        config.default_format = default_format;
    }
    if page_size.is_some() {
        config.page_size = page_size;
    }

    let path = config.save()?;
    print_success(&format!("Saved configuration to {}", path.display()));
    Ok(())
}

/// Print the effective config file contents
pub fn show_config() -> Result<()> {
    print_json(&Config::load()?)
}
