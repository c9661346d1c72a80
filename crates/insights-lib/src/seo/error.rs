use super::generation::GenerationFailed;
use crate::storage::RepositoryError;

/// Error type for SEO facade operations
#[derive(Debug, thiserror::Error)]
pub enum SeoError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("SEO optimization failed: {0:#}")]
    Optimization(#[source] anyhow::Error),

    #[error("Keyword research failed: {0:#}")]
    KeywordResearch(#[source] anyhow::Error),

    #[error("Competitor analysis failed: {0:#}")]
    CompetitorAnalysis(#[source] anyhow::Error),

    #[error("Local SEO optimization failed: {0:#}")]
    LocalSeo(#[source] anyhow::Error),

    #[error("Technical audit failed: {0:#}")]
    TechnicalAudit(#[source] anyhow::Error),

    #[error("SEO optimization {0} not found")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl SeoError {
    /// Stable kind name for logs and API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            SeoError::InvalidRequest(_) => "INVALID_REQUEST",
            SeoError::Optimization(_) => "OPTIMIZATION",
            SeoError::KeywordResearch(_) => "KEYWORD_RESEARCH",
            SeoError::CompetitorAnalysis(_) => "COMPETITOR_ANALYSIS",
            SeoError::LocalSeo(_) => "LOCAL_SEO",
            SeoError::TechnicalAudit(_) => "TECHNICAL_AUDIT",
            SeoError::NotFound(_) => "NOT_FOUND",
            SeoError::Storage(_) => "STORAGE",
        }
    }

    /// Whether the optimization failed in the chat-backed generation stage
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, SeoError::Optimization(e) if e.downcast_ref::<GenerationFailed>().is_some())
    }
}
