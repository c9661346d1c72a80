//! Keyword research collaborator

use super::model::{ContentAnalysis, KeywordResearch, SeoOptimizationRequest};
use super::templates::TemplateCatalog;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait KeywordResearcher: Send + Sync {
    /// Research keywords for a request, returning at most `max_keywords`
    /// keywords across all groups
    async fn research(
        &self,
        request: &SeoOptimizationRequest,
        analysis: &ContentAnalysis,
        max_keywords: usize,
    ) -> Result<KeywordResearch>;
}

/// Keyword set derived from template seeds, tags and the content itself
pub struct TemplateKeywordResearcher {
    templates: Arc<TemplateCatalog>,
}

impl TemplateKeywordResearcher {
    pub fn new(templates: Arc<TemplateCatalog>) -> Self {
        Self { templates }
    }
}

fn push_unique(target: &mut Vec<String>, seen: &mut Vec<String>, keyword: String) {
    let normalized = keyword.trim().to_lowercase();
    if normalized.is_empty() || seen.contains(&normalized) {
        return;
    }
    seen.push(normalized.clone());
    target.push(normalized);
}

#[async_trait]
impl KeywordResearcher for TemplateKeywordResearcher {
    async fn research(
        &self,
        request: &SeoOptimizationRequest,
        analysis: &ContentAnalysis,
        max_keywords: usize,
    ) -> Result<KeywordResearch> {
        if max_keywords == 0 {
            bail!("max_keywords must be positive");
        }

        let template = self.templates.select(&request.content_type);
        let property_type = request.property_type_or_default().to_lowercase();
        let location = request.location.trim();

        let mut seen = Vec::new();
        let mut primary = Vec::new();
        let mut long_tail = Vec::new();
        let mut local = Vec::new();

        for tag in &request.existing_tags {
            push_unique(&mut primary, &mut seen, tag.clone());
        }
        for seed in &template.seed_keywords {
            push_unique(&mut primary, &mut seen, seed.clone());
        }
        for term in &analysis.top_terms {
            push_unique(&mut primary, &mut seen, term.clone());
        }

        push_unique(&mut long_tail, &mut seen, format!("{} with modern amenities", property_type));
        push_unique(&mut long_tail, &mut seen, format!("best {} to buy", property_type));
        for term in analysis
            .top_terms
            .iter()
            .filter(|t| **t != property_type)
            .take(2)
        {
            push_unique(&mut long_tail, &mut seen, format!("{} {}", property_type, term));
        }

        if !location.is_empty() {
            push_unique(&mut local, &mut seen, format!("{} in {}", property_type, location));
            push_unique(&mut local, &mut seen, format!("{} real estate", location));
            push_unique(&mut local, &mut seen, format!("homes for sale in {}", location));
            push_unique(&mut local, &mut seen, format!("{} neighborhoods", location));
        }

        // Local keywords survive truncation first, then primary, then long tail
        let local_len = local.len().min(max_keywords);
        local.truncate(local_len);
        let primary_len = primary.len().min(max_keywords - local_len);
        primary.truncate(primary_len);
        long_tail.truncate(max_keywords - local_len - primary_len);

        // More long-tail and local phrases mean less contested terms
        let specific = (long_tail.len() + local.len()) as f64;
        let total = (primary.len() + long_tail.len() + local.len()).max(1) as f64;
        let opportunity_score = (0.4 + 0.5 * specific / total).clamp(0.0, 1.0);

        Ok(KeywordResearch {
            primary_keywords: primary,
            long_tail_keywords: long_tail,
            local_keywords: local,
            opportunity_score,
        })
    }
}
