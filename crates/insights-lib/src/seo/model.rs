//! Request, artifact and response types of the SEO facade

use serde::{Deserialize, Serialize};

/// Content optimization request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoOptimizationRequest {
    pub property_id: String,
    pub content_type: String,
    pub original_content: String,
    pub location: String,
    #[serde(default)]
    pub existing_tags: Vec<String>,
    /// Property type used in prompts and titles, e.g. "Condo"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    /// Target length in words; the configured default applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_length: Option<usize>,
}

impl SeoOptimizationRequest {
    pub fn property_type_or_default(&self) -> &str {
        self.property_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Property")
    }
}

/// Heuristic measurements of a text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub word_count: usize,
    pub sentence_count: usize,
    /// Normalized Flesch reading ease in [0, 1]
    pub readability_score: f64,
    /// Share of words belonging to the tracked keywords
    pub keyword_density: f64,
    pub heading_count: usize,
    /// Most frequent significant terms, most frequent first
    pub top_terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordResearch {
    pub primary_keywords: Vec<String>,
    pub long_tail_keywords: Vec<String>,
    pub local_keywords: Vec<String>,
    /// How much ranking room the keyword set offers, in [0, 1]
    pub opportunity_score: f64,
}

impl KeywordResearch {
    pub fn all_keywords(&self) -> impl Iterator<Item = &String> {
        self.primary_keywords
            .iter()
            .chain(self.long_tail_keywords.iter())
            .chain(self.local_keywords.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub domain: String,
    /// Domain strength on a 0-100 scale
    pub strength: f64,
    pub ranking_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorAnalysis {
    pub competitors: Vec<Competitor>,
    /// Mean competitor strength on a 0-100 scale
    pub average_strength: f64,
    /// Keywords competitors rank for that the research did not produce
    pub keyword_gaps: Vec<String>,
    /// One-paragraph summary fed to the generation prompt
    pub insights: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalLink {
    pub anchor: String,
    pub href: String,
}

/// Content mined from the AI response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub title: String,
    pub body: String,
    pub headings: Vec<String>,
    pub internal_links: Vec<InternalLink>,
    pub call_to_action: String,
    pub word_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaTags {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub og_title: String,
    pub og_description: String,
    pub og_type: String,
    pub canonical_url: String,
    pub robots: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationType {
    Content,
    Technical,
    LocalSeo,
    Keywords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoRecommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoScore {
    pub content: f64,
    pub technical: f64,
    pub authority: f64,
    pub local: f64,
    pub overall: f64,
    pub grade: String,
    pub improvement_needed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstimatedImpact {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for EstimatedImpact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimatedImpact::High => write!(f, "HIGH"),
            EstimatedImpact::Medium => write!(f, "MEDIUM"),
            EstimatedImpact::Low => write!(f, "LOW"),
        }
    }
}

/// Aggregate result of one optimize call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoOptimizationResponse {
    pub optimization_id: i64,
    pub property_id: String,
    pub content_type: String,
    pub template: String,
    pub keywords: KeywordResearch,
    pub competitor_analysis: CompetitorAnalysis,
    pub content: GeneratedContent,
    pub meta_tags: MetaTags,
    pub structured_data: Vec<serde_json::Value>,
    pub score: SeoScore,
    pub recommendations: Vec<SeoRecommendation>,
    pub estimated_impact: EstimatedImpact,
    pub processing_time_ms: u64,
}

/// Score of existing content without generation or persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentScoreReport {
    pub analysis: ContentAnalysis,
    pub score: SeoScore,
    pub recommendations: Vec<SeoRecommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSeoReport {
    pub property_id: String,
    pub location: String,
    pub local_keywords: Vec<String>,
    pub place_schema: serde_json::Value,
    pub local_score: f64,
    pub recommendations: Vec<SeoRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditCheck {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalAuditReport {
    pub optimization_id: i64,
    pub checks: Vec<AuditCheck>,
    /// Share of passed checks in [0, 1]
    pub score: f64,
}
