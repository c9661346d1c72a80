//! Competitor analysis collaborator

use super::model::{Competitor, CompetitorAnalysis, KeywordResearch, SeoOptimizationRequest};
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

#[async_trait]
pub trait CompetitorAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        request: &SeoOptimizationRequest,
        keywords: &KeywordResearch,
    ) -> Result<CompetitorAnalysis>;
}

/// A known competing site; `{location}` in keywords is substituted
#[derive(Debug, Clone, Deserialize)]
pub struct CompetitorProfile {
    pub domain: String,
    pub strength: f64,
    pub keyword_patterns: Vec<String>,
}

impl CompetitorProfile {
    fn new(domain: &str, strength: f64, keyword_patterns: &[&str]) -> Self {
        Self {
            domain: domain.to_string(),
            strength,
            keyword_patterns: keyword_patterns.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Analysis against a fixed list of competitor profiles
pub struct BaselineCompetitorAnalyzer {
    profiles: Vec<CompetitorProfile>,
}

impl BaselineCompetitorAnalyzer {
    pub fn new(profiles: Vec<CompetitorProfile>) -> Self {
        Self { profiles }
    }

    /// The large national listing portals
    pub fn national_portals() -> Self {
        Self::new(vec![
            CompetitorProfile::new(
                "zillow.com",
                92.0,
                &["{location} real estate", "homes for sale in {location}", "home values", "mortgage calculator"],
            ),
            CompetitorProfile::new(
                "realtor.com",
                88.0,
                &["homes for sale in {location}", "open houses {location}", "new construction", "real estate agents"],
            ),
            CompetitorProfile::new(
                "redfin.com",
                85.0,
                &["{location} housing market", "recently sold homes", "home tours", "real estate agents"],
            ),
        ])
    }
}

impl Default for BaselineCompetitorAnalyzer {
    fn default() -> Self {
        Self::national_portals()
    }
}

#[async_trait]
impl CompetitorAnalyzer for BaselineCompetitorAnalyzer {
    async fn analyze(
        &self,
        request: &SeoOptimizationRequest,
        keywords: &KeywordResearch,
    ) -> Result<CompetitorAnalysis> {
        let location = request.location.trim().to_lowercase();
        let ours: Vec<String> = keywords.all_keywords().map(|k| k.to_lowercase()).collect();

        let competitors: Vec<Competitor> = self
            .profiles
            .iter()
            .map(|p| Competitor {
                domain: p.domain.clone(),
                strength: p.strength.clamp(0.0, 100.0),
                ranking_keywords: p
                    .keyword_patterns
                    .iter()
                    .map(|k| k.replace("{location}", &location).trim().to_lowercase())
                    .collect(),
            })
            .collect();

        let mut keyword_gaps: Vec<String> = Vec::new();
        for keyword in competitors.iter().flat_map(|c| c.ranking_keywords.iter()) {
            if !ours.contains(keyword) && !keyword_gaps.contains(keyword) {
                keyword_gaps.push(keyword.clone());
            }
        }

        let average_strength = if competitors.is_empty() {
            0.0
        } else {
            competitors.iter().map(|c| c.strength).sum::<f64>() / competitors.len() as f64
        };

        let insights = if competitors.is_empty() {
            "No competitor data available.".to_string()
        } else {
            let leaders = competitors
                .iter()
                .map(|c| format!("{} ({:.0})", c.domain, c.strength))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "Top competitors: {}. Average domain strength {:.1}. {} keyword gaps to target.",
                leaders,
                average_strength,
                keyword_gaps.len()
            )
        };

        Ok(CompetitorAnalysis {
            competitors,
            average_strength,
            keyword_gaps,
            insights,
        })
    }
}
