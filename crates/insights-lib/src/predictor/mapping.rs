//! Mapping of generic backend responses into typed prediction results

use super::outcome::{
    AnomalyDetectionResult, CapacityPrediction, CostOptimizationPrediction, Recommendations,
    ResourcePrediction, SlaPrediction, TrafficPoint, TrafficPrediction,
};
use crate::models::{
    AnomalyDetectionResponse, FeatureMap, PredictionResponse, RecommendationResponse,
};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;

/// Headroom added on top of peak demand for capacity recommendations
pub const CAPACITY_HEADROOM: f64 = 0.2;

/// Priority marker counted as high priority (exact match)
pub const HIGH_PRIORITY: &str = "HIGH";

const SLA_RISK_FACTORS: &str = "riskFactors";
const SLA_RECOMMENDATIONS: &str = "recommendations";
const CURRENT_CAPACITY: &str = "currentCapacity";
const CURRENT_COST: &str = "currentCost";
const COST_OPPORTUNITIES: &str = "opportunities";

/// Average, maximum and minimum of a series; all zero when empty
pub fn series_stats(values: &[f64]) -> (f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let sum: f64 = values.iter().sum();
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let min = values.iter().copied().fold(f64::MAX, f64::min);
    (sum / values.len() as f64, max, min)
}

/// Parse an ISO-8601 local date-time (`2024-01-01T10:00[:00[.000]]`)
pub fn parse_local_datetime(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .with_context(|| format!("Invalid ISO-8601 local date-time: {}", raw))
}

pub fn map_resource(
    resource_type: &str,
    period: &str,
    response: PredictionResponse,
) -> ResourcePrediction {
    let values: Vec<f64> = response.predictions.iter().map(|p| p.value).collect();
    let (average_usage, peak_usage, min_usage) = series_stats(&values);

    ResourcePrediction {
        resource_type: resource_type.to_string(),
        period: period.to_string(),
        predictions: response.predictions,
        average_usage,
        peak_usage,
        min_usage,
        confidence: response.confidence,
        model_version: response.model_version,
    }
}

/// Fails as a whole when any timestamp is missing or malformed
pub fn map_traffic(
    service: &str,
    target_date: &str,
    response: PredictionResponse,
) -> Result<TrafficPrediction> {
    let points = response
        .predictions
        .iter()
        .map(|p| {
            let raw = p
                .timestamp
                .as_deref()
                .ok_or_else(|| anyhow!("Traffic prediction point without timestamp"))?;
            Ok(TrafficPoint {
                timestamp: parse_local_datetime(raw)?,
                expected_requests: p.value,
                confidence: p.confidence,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let peak = points
        .iter()
        .max_by(|a, b| {
            a.expected_requests
                .partial_cmp(&b.expected_requests)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|p| (p.expected_requests, p.timestamp));

    Ok(TrafficPrediction {
        service: service.to_string(),
        target_date: target_date.to_string(),
        total_requests: points.iter().map(|p| p.expected_requests).sum(),
        peak_requests: peak.map(|(v, _)| v).unwrap_or(0.0),
        peak_time: peak.map(|(_, t)| t),
        points,
        confidence: response.confidence,
    })
}

pub fn map_anomalies(metric: &str, response: AnomalyDetectionResponse) -> AnomalyDetectionResult {
    let has_anomalies = !response.anomalies.is_empty();
    let severity = if has_anomalies {
        response
            .anomalies
            .iter()
            .map(|a| a.severity)
            .fold(f64::MIN, f64::max)
    } else {
        0.0
    };

    AnomalyDetectionResult {
        metric: metric.to_string(),
        has_anomalies,
        anomalies: response.anomalies,
        severity,
        confidence: response.confidence,
    }
}

pub fn map_recommendations(category: &str, response: RecommendationResponse) -> Recommendations {
    let high_priority_count = response
        .recommendations
        .iter()
        .filter(|r| r.priority == HIGH_PRIORITY)
        .count();

    Recommendations {
        category: category.to_string(),
        items: response.recommendations,
        high_priority_count,
        confidence: response.confidence,
    }
}

/// Only the first point carries SLA data
pub fn map_sla(service: &str, period: &str, response: PredictionResponse) -> SlaPrediction {
    let first = response.predictions.first();

    SlaPrediction {
        service: service.to_string(),
        period: period.to_string(),
        compliance_probability: first.map(|p| p.value),
        risk_factors: first
            .and_then(|p| p.details.get(SLA_RISK_FACTORS))
            .map(|v| v.as_text_list())
            .unwrap_or_default(),
        recommendations: first
            .and_then(|p| p.details.get(SLA_RECOMMENDATIONS))
            .map(|v| v.as_text_list())
            .unwrap_or_default(),
        confidence: response.confidence,
    }
}

pub fn map_capacity(
    resource_type: &str,
    target_date: &str,
    features: &FeatureMap,
    response: PredictionResponse,
) -> CapacityPrediction {
    let values: Vec<f64> = response.predictions.iter().map(|p| p.value).collect();
    let (_, peak_demand, _) = series_stats(&values);
    let recommended_capacity = peak_demand * (1.0 + CAPACITY_HEADROOM);
    let current_capacity = features.get(CURRENT_CAPACITY).and_then(|v| v.as_f64());

    let (scale_up_required, exhaustion_time) = match current_capacity {
        Some(current) => (
            recommended_capacity > current,
            response
                .predictions
                .iter()
                .find(|p| p.value >= current)
                .and_then(|p| p.timestamp.clone()),
        ),
        None => (false, None),
    };

    CapacityPrediction {
        resource_type: resource_type.to_string(),
        target_date: target_date.to_string(),
        predictions: response.predictions,
        peak_demand,
        recommended_capacity,
        current_capacity,
        scale_up_required,
        exhaustion_time,
        confidence: response.confidence,
    }
}

pub fn map_cost(
    service: &str,
    period: &str,
    features: &FeatureMap,
    response: PredictionResponse,
) -> CostOptimizationPrediction {
    let projected_cost: f64 = response.predictions.iter().map(|p| p.value).sum();
    let current_cost = features.get(CURRENT_COST).and_then(|v| v.as_f64());
    let potential_savings = current_cost
        .map(|current| (current - projected_cost).max(0.0))
        .unwrap_or(0.0);

    let mut opportunities: Vec<String> = Vec::new();
    for point in &response.predictions {
        if let Some(value) = point.details.get(COST_OPPORTUNITIES) {
            for item in value.as_text_list() {
                if !opportunities.contains(&item) {
                    opportunities.push(item);
                }
            }
        }
    }

    CostOptimizationPrediction {
        service: service.to_string(),
        period: period.to_string(),
        projected_cost,
        current_cost,
        potential_savings,
        opportunities,
        confidence: response.confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Anomaly, FeatureValue, PredictionPoint, RecommendationItem};

    fn response(points: Vec<PredictionPoint>) -> PredictionResponse {
        PredictionResponse {
            predictions: points,
            confidence: 0.85,
            model_version: Some("v2".to_string()),
        }
    }

    fn point(ts: &str, value: f64) -> PredictionPoint {
        PredictionPoint::new(Some(ts), value, 0.9)
    }

    fn anomaly(severity: f64) -> Anomaly {
        Anomaly {
            timestamp: None,
            value: 10.0,
            expected_value: Some(2.0),
            severity,
            description: None,
        }
    }

    fn item(priority: &str) -> RecommendationItem {
        RecommendationItem {
            id: None,
            title: "t".to_string(),
            description: String::new(),
            priority: priority.to_string(),
            estimated_impact: None,
        }
    }

    #[test]
    fn test_resource_empty_series_is_zero() {
        let result = map_resource("cpu", "24h", response(vec![]));
        assert_eq!(result.average_usage, 0.0);
        assert_eq!(result.peak_usage, 0.0);
        assert_eq!(result.min_usage, 0.0);
        assert_eq!(result.confidence, 0.85);
    }

    #[test]
    fn test_resource_series_stats() {
        let result = map_resource(
            "memory",
            "7d",
            response(vec![
                point("2024-01-01T00:00:00", 2.0),
                point("2024-01-01T01:00:00", 6.0),
                point("2024-01-01T02:00:00", 4.0),
            ]),
        );
        assert_eq!(result.average_usage, 4.0);
        assert_eq!(result.peak_usage, 6.0);
        assert_eq!(result.min_usage, 2.0);
        assert_eq!(result.model_version.as_deref(), Some("v2"));
    }

    #[test]
    fn test_resource_negative_values() {
        let (avg, max, min) = series_stats(&[-3.0, -1.0]);
        assert_eq!(avg, -2.0);
        assert_eq!(max, -1.0);
        assert_eq!(min, -3.0);
    }

    #[test]
    fn test_traffic_parses_local_datetimes() {
        let result = map_traffic(
            "search",
            "2024-03-01",
            response(vec![
                point("2024-03-01T08:00:00", 120.0),
                point("2024-03-01T09:30", 300.0),
                point("2024-03-01T10:00:00.250", 80.0),
            ]),
        )
        .unwrap();

        assert_eq!(result.points.len(), 3);
        assert_eq!(result.peak_requests, 300.0);
        assert_eq!(
            result.peak_time,
            Some(parse_local_datetime("2024-03-01T09:30:00").unwrap())
        );
        assert_eq!(result.total_requests, 500.0);
    }

    #[test]
    fn test_traffic_malformed_timestamp_fails_whole_call() {
        let result = map_traffic(
            "search",
            "2024-03-01",
            response(vec![
                point("2024-03-01T08:00:00", 120.0),
                point("03/01/2024 09:00", 300.0),
            ]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_traffic_offset_timestamp_is_not_local() {
        assert!(parse_local_datetime("2024-03-01T08:00:00Z").is_err());
        assert!(parse_local_datetime("2024-03-01").is_err());
    }

    #[test]
    fn test_traffic_missing_timestamp_fails() {
        let result = map_traffic(
            "search",
            "2024-03-01",
            response(vec![PredictionPoint::new(None, 1.0, 0.5)]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_anomalies_flag_and_max_severity() {
        let result = map_anomalies(
            "latency",
            AnomalyDetectionResponse {
                anomalies: vec![anomaly(0.3), anomaly(0.9), anomaly(0.5)],
                confidence: 0.7,
            },
        );
        assert!(result.has_anomalies);
        assert_eq!(result.severity, 0.9);

        let none = map_anomalies("latency", AnomalyDetectionResponse::default());
        assert!(!none.has_anomalies);
        assert_eq!(none.severity, 0.0);
    }

    #[test]
    fn test_high_priority_count_is_case_sensitive() {
        let result = map_recommendations(
            "pricing",
            RecommendationResponse {
                recommendations: vec![item("HIGH"), item("high"), item("HIGH"), item("LOW")],
                confidence: 0.6,
            },
        );
        assert_eq!(result.high_priority_count, 2);
        assert_eq!(result.items.len(), 4);
    }

    #[test]
    fn test_sla_reads_first_point_only() {
        let mut first = point("2024-01-01T00:00:00", 0.97);
        first.details.insert(
            "riskFactors".to_string(),
            FeatureValue::from(vec!["db latency", "peak season"]),
        );
        first.details.insert(
            "recommendations".to_string(),
            FeatureValue::from(vec!["add replica"]),
        );
        let mut second = point("2024-01-02T00:00:00", 0.5);
        second
            .details
            .insert("riskFactors".to_string(), FeatureValue::from(vec!["ignored"]));

        let result = map_sla("booking", "30d", response(vec![first, second]));
        assert_eq!(result.compliance_probability, Some(0.97));
        assert_eq!(result.risk_factors, vec!["db latency", "peak season"]);
        assert_eq!(result.recommendations, vec!["add replica"]);
    }

    #[test]
    fn test_sla_empty_keeps_confidence() {
        let result = map_sla("booking", "30d", response(vec![]));
        assert!(result.compliance_probability.is_none());
        assert!(result.risk_factors.is_empty());
        assert!(result.recommendations.is_empty());
        assert_eq!(result.confidence, 0.85);
    }

    #[test]
    fn test_capacity_against_current_capacity() {
        let mut features = FeatureMap::new();
        features.insert("currentCapacity".to_string(), FeatureValue::Integer(100));

        let result = map_capacity(
            "storage",
            "2024-09-01",
            &features,
            response(vec![
                point("2024-08-01T00:00:00", 60.0),
                point("2024-08-15T00:00:00", 100.0),
                point("2024-08-31T00:00:00", 90.0),
            ]),
        );

        assert_eq!(result.peak_demand, 100.0);
        assert!((result.recommended_capacity - 120.0).abs() < 1e-9);
        assert!(result.scale_up_required);
        assert_eq!(result.exhaustion_time.as_deref(), Some("2024-08-15T00:00:00"));
    }

    #[test]
    fn test_capacity_without_current_capacity() {
        let result = map_capacity(
            "storage",
            "2024-09-01",
            &FeatureMap::new(),
            response(vec![point("2024-08-01T00:00:00", 10.0)]),
        );
        assert!(!result.scale_up_required);
        assert!(result.exhaustion_time.is_none());
        assert!(result.current_capacity.is_none());
    }

    #[test]
    fn test_cost_savings_and_opportunities() {
        let mut features = FeatureMap::new();
        features.insert("currentCost".to_string(), FeatureValue::Number(1000.0));

        let mut a = point("2024-01-01T00:00:00", 300.0);
        a.details.insert(
            "opportunities".to_string(),
            FeatureValue::from(vec!["rightsize db", "reserved instances"]),
        );
        let mut b = point("2024-02-01T00:00:00", 400.0);
        b.details.insert(
            "opportunities".to_string(),
            FeatureValue::from(vec!["rightsize db"]),
        );

        let result = map_cost("search", "60d", &features, response(vec![a, b]));
        assert_eq!(result.projected_cost, 700.0);
        assert_eq!(result.potential_savings, 300.0);
        assert_eq!(result.opportunities, vec!["rightsize db", "reserved instances"]);
    }

    #[test]
    fn test_cost_savings_never_negative() {
        let mut features = FeatureMap::new();
        features.insert("currentCost".to_string(), FeatureValue::Number(100.0));
        let result = map_cost(
            "search",
            "30d",
            &features,
            response(vec![point("2024-01-01T00:00:00", 500.0)]),
        );
        assert_eq!(result.potential_savings, 0.0);
    }
}
