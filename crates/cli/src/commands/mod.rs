//! Subcommand implementations

pub mod predict;
pub mod seo;
pub mod system;

use anyhow::{Context, Result};
use insights_lib::models::{FeatureMap, FeatureValue};
use serde::Serialize;

/// Wire label of a serde enum, e.g. `LOCAL_SEO`
pub(crate) fn label<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Parse `key=value` pairs into a feature bag
///
/// Values are read as JSON when they parse (numbers, booleans, lists) and
/// as text otherwise.
pub fn parse_features(pairs: &[String]) -> Result<FeatureMap> {
    let mut features = FeatureMap::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("Feature '{}' is not in key=value form", pair))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Feature '{}' has an empty key", pair);
        }
        let value = serde_json::from_str::<FeatureValue>(raw)
            .unwrap_or_else(|_| FeatureValue::Text(raw.to_string()));
        features.insert(key.to_string(), value);
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_features() {
        let features = parse_features(&[
            "bedrooms=3".to_string(),
            "price=425000.5".to_string(),
            "waterfront=true".to_string(),
            "city=Austin".to_string(),
            "amenities=[\"pool\",\"gym\"]".to_string(),
        ])
        .unwrap();

        assert_eq!(features["bedrooms"], FeatureValue::Integer(3));
        assert_eq!(features["price"], FeatureValue::Number(425000.5));
        assert_eq!(features["waterfront"], FeatureValue::Bool(true));
        assert_eq!(features["city"], FeatureValue::Text("Austin".to_string()));
        assert_eq!(features["amenities"].as_text_list(), vec!["pool", "gym"]);
    }

    #[test]
    fn test_parse_features_rejects_bad_pairs() {
        assert!(parse_features(&["bedrooms".to_string()]).is_err());
        assert!(parse_features(&["=3".to_string()]).is_err());
    }

    #[test]
    fn test_label_uses_wire_name() {
        assert_eq!(label(&insights_lib::seo::RecommendationType::LocalSeo), "LOCAL_SEO");
    }
}
