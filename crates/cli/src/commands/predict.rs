//! Prediction facade CLI commands

use anyhow::Result;
use colored::Colorize;
use insights_lib::{
    models::FeatureMap,
    predictor::{
        AnomalyDetectionResult, CapacityPrediction, CostOptimizationPrediction, PredictionOutcome,
        Recommendations, ResourcePrediction, SlaPrediction, TrafficPrediction,
    },
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_score, color_status, format_count, print_error, print_heading, print_json, print_rows,
    print_warning, truncate, OutputFormat,
};

/// A prediction route and its request body
pub enum PredictionQuery {
    ResourceUsage {
        resource_type: String,
        period: String,
    },
    Traffic {
        service: String,
        target_date: String,
    },
    Anomalies {
        metric: String,
        values: Vec<f64>,
    },
    Recommendations {
        category: String,
    },
    Sla {
        service: String,
        period: String,
    },
    Capacity {
        resource_type: String,
        target_date: String,
    },
    Cost {
        service: String,
        period: String,
    },
}

impl PredictionQuery {
    /// Route path and JSON body
    pub fn request(&self, features: &FeatureMap) -> (&'static str, serde_json::Value) {
        match self {
            PredictionQuery::ResourceUsage {
                resource_type,
                period,
            } => (
                "api/v1/predictions/resource-usage",
                json!({"resourceType": resource_type, "period": period, "features": features}),
            ),
            PredictionQuery::Traffic {
                service,
                target_date,
            } => (
                "api/v1/predictions/traffic",
                json!({"service": service, "targetDate": target_date, "features": features}),
            ),
            PredictionQuery::Anomalies { metric, values } => (
                "api/v1/predictions/anomalies",
                json!({"metric": metric, "values": values, "context": features}),
            ),
            PredictionQuery::Recommendations { category } => (
                "api/v1/predictions/recommendations",
                json!({"category": category, "context": features}),
            ),
            PredictionQuery::Sla { service, period } => (
                "api/v1/predictions/sla",
                json!({"service": service, "period": period, "features": features}),
            ),
            PredictionQuery::Capacity {
                resource_type,
                target_date,
            } => (
                "api/v1/predictions/capacity",
                json!({"resourceType": resource_type, "targetDate": target_date, "features": features}),
            ),
            PredictionQuery::Cost { service, period } => (
                "api/v1/predictions/cost",
                json!({"service": service, "period": period, "features": features}),
            ),
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn row(field: &str, value: impl Into<String>) -> FieldRow {
    FieldRow {
        field: field.to_string(),
        value: value.into(),
    }
}

fn optional(value: Option<f64>, render: impl Fn(f64) -> String) -> String {
    value.map(render).unwrap_or_else(|| "-".dimmed().to_string())
}

/// Post the query and unwrap the outcome; error outcomes are reported, not failed
async fn fetch<T: DeserializeOwned + Serialize>(
    client: &ApiClient,
    query: &PredictionQuery,
    features: &FeatureMap,
    format: OutputFormat,
) -> Result<Option<T>> {
    let (path, body) = query.request(features);
    let outcome: PredictionOutcome<T> = client.post(path, &body).await?;

    if let OutputFormat::Json = format {
        print_json(&outcome)?;
        return Ok(None);
    }

    match outcome {
        PredictionOutcome::Success(data) => Ok(Some(data)),
        PredictionOutcome::Error { message } => {
            print_error(&format!("Prediction failed: {}", message));
            Ok(None)
        }
    }
}

/// Run a prediction query and render the result
pub async fn run(
    client: &ApiClient,
    query: PredictionQuery,
    features: FeatureMap,
    format: OutputFormat,
) -> Result<()> {
    match &query {
        PredictionQuery::ResourceUsage { .. } => {
            if let Some(p) = fetch::<ResourcePrediction>(client, &query, &features, format).await? {
                print_heading(&format!("Resource Usage: {} ({})", p.resource_type, p.period));
                print_rows(vec![
                    row("Average", format!("{:.2}", p.average_usage)),
                    row("Peak", format!("{:.2}", p.peak_usage)),
                    row("Minimum", format!("{:.2}", p.min_usage)),
                    row("Points", p.predictions.len().to_string()),
                    row("Confidence", color_score(p.confidence)),
                    row("Model", p.model_version.unwrap_or_else(|| "-".to_string())),
                ]);
            }
        }
        PredictionQuery::Traffic { .. } => {
            if let Some(p) = fetch::<TrafficPrediction>(client, &query, &features, format).await? {
                print_heading(&format!("Traffic: {} on {}", p.service, p.target_date));
                print_rows(vec![
                    row("Total requests", format_count(p.total_requests)),
                    row("Peak requests", format_count(p.peak_requests)),
                    row(
                        "Peak time",
                        p.peak_time
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    row("Confidence", color_score(p.confidence)),
                ]);
            }
        }
        PredictionQuery::Anomalies { .. } => {
            if let Some(r) = fetch::<AnomalyDetectionResult>(client, &query, &features, format).await? {
                print_heading(&format!("Anomalies: {}", r.metric));
                if !r.has_anomalies {
                    println!("{}", "No anomalies detected".green());
                    return Ok(());
                }
                for anomaly in &r.anomalies {
                    println!(
                        "{} value={:.2} severity={} {}",
                        anomaly.timestamp.as_deref().unwrap_or("-"),
                        anomaly.value,
                        color_score(anomaly.severity),
                        anomaly.description.as_deref().unwrap_or("")
                    );
                }
                println!("\nMax severity: {}", color_score(r.severity));
            }
        }
        PredictionQuery::Recommendations { .. } => {
            if let Some(r) = fetch::<Recommendations>(client, &query, &features, format).await? {
                print_heading(&format!("Recommendations: {}", r.category));
                if r.items.is_empty() {
                    print_warning("No recommendations returned");
                    return Ok(());
                }
                let rows: Vec<FieldRow> = r
                    .items
                    .iter()
                    .map(|item| row(&color_status(&item.priority), truncate(&item.title, 70)))
                    .collect();
                print_rows(rows);
                println!("\nHigh priority: {}", r.high_priority_count);
            }
        }
        PredictionQuery::Sla { .. } => {
            if let Some(p) = fetch::<SlaPrediction>(client, &query, &features, format).await? {
                print_heading(&format!("SLA: {} ({})", p.service, p.period));
                print_rows(vec![
                    row("Compliance", optional(p.compliance_probability, color_score)),
                    row("Risk factors", p.risk_factors.join(", ")),
                    row("Recommendations", p.recommendations.join("; ")),
                    row("Confidence", color_score(p.confidence)),
                ]);
            }
        }
        PredictionQuery::Capacity { .. } => {
            if let Some(p) = fetch::<CapacityPrediction>(client, &query, &features, format).await? {
                print_heading(&format!("Capacity: {} by {}", p.resource_type, p.target_date));
                print_rows(vec![
                    row("Peak demand", format!("{:.2}", p.peak_demand)),
                    row("Recommended", format!("{:.2}", p.recommended_capacity)),
                    row("Current", optional(p.current_capacity, |c| format!("{:.2}", c))),
                    row(
                        "Scale up",
                        color_status(if p.scale_up_required { "high" } else { "healthy" }),
                    ),
                    row("Exhausted at", p.exhaustion_time.unwrap_or_else(|| "-".to_string())),
                    row("Confidence", color_score(p.confidence)),
                ]);
            }
        }
        PredictionQuery::Cost { .. } => {
            if let Some(p) =
                fetch::<CostOptimizationPrediction>(client, &query, &features, format).await?
            {
                print_heading(&format!("Cost: {} ({})", p.service, p.period));
                print_rows(vec![
                    row("Projected", format!("{:.2}", p.projected_cost)),
                    row("Current", optional(p.current_cost, |c| format!("{:.2}", c))),
                    row("Savings", format!("{:.2}", p.potential_savings)),
                    row("Opportunities", p.opportunities.join("; ")),
                    row("Confidence", color_score(p.confidence)),
                ]);
            }
        }
    }

    Ok(())
}
