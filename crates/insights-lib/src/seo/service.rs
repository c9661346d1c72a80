//! Content-SEO facade
//!
//! `optimize` runs the full pipeline: validation, content analysis,
//! keyword research, competitor analysis, template selection, AI content
//! generation, meta tags, structured data, scoring and persistence. Any
//! stage failure aborts the rest; nothing is persisted unless every
//! earlier stage succeeded.

use super::analysis::{analyze_content, keyword_density, readability_score, word_count};
use super::analytics::{AnalyticsSink, OptimizationEvent, TracingAnalyticsSink};
use super::competitors::{BaselineCompetitorAnalyzer, CompetitorAnalyzer};
use super::error::SeoError;
use super::generation::{
    ContentGenerator, GenerationFailed, MarkdownResponseParser, PromptInput, ResponseParser,
};
use super::keywords::{KeywordResearcher, TemplateKeywordResearcher};
use super::meta::generate_meta_tags;
use super::model::{
    CompetitorAnalysis, ContentScoreReport, KeywordResearch, LocalSeoReport, Priority,
    RecommendationType, SeoOptimizationRequest, SeoOptimizationResponse, SeoRecommendation,
    SeoScore, TechnicalAuditReport,
};
use super::recommendations::generate_recommendations;
use super::scoring::{compute_score, estimated_impact, local_score, ScoreInputs};
use super::structured_data::{generate_structured_data, place_schema};
use super::technical::audit_record;
use super::templates::{normalize_content_type, TemplateCatalog, DEFAULT_CONTENT_TYPE};
use super::validation::{BasicContentValidator, ContentValidator};
use crate::audit::audited;
use crate::client::ChatClient;
use crate::observability::{FacadeMetrics, StructuredLogger};
use crate::storage::{
    NewSeoOptimization, Page, PageRequest, RepositoryError, SeoOptimization, SeoRepository,
};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// SEO facade settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeoConfig {
    /// Upper bound on keywords returned by one research call
    pub max_keywords: usize,
    /// Generation target in words when the request sets none
    pub target_content_length: usize,
    /// Site root used for canonical URLs
    pub site_base_url: String,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            max_keywords: 20,
            target_content_length: 800,
            site_base_url: "https://www.example-realty.com".to_string(),
        }
    }
}

/// Builder for [`SeoOptimizationService`]; unset collaborators get the
/// bundled defaults
pub struct SeoServiceBuilder {
    config: SeoConfig,
    chat: Arc<dyn ChatClient>,
    repository: Arc<dyn SeoRepository>,
    templates: Arc<TemplateCatalog>,
    validator: Option<Arc<dyn ContentValidator>>,
    keyword_researcher: Option<Arc<dyn KeywordResearcher>>,
    competitor_analyzer: Option<Arc<dyn CompetitorAnalyzer>>,
    response_parser: Option<Arc<dyn ResponseParser>>,
    analytics: Option<Arc<dyn AnalyticsSink>>,
}

impl SeoServiceBuilder {
    pub fn config(mut self, config: SeoConfig) -> Self {
        self.config = config;
        self
    }

    pub fn templates(mut self, templates: Arc<TemplateCatalog>) -> Self {
        self.templates = templates;
        self
    }

    pub fn validator(mut self, validator: Arc<dyn ContentValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn keyword_researcher(mut self, researcher: Arc<dyn KeywordResearcher>) -> Self {
        self.keyword_researcher = Some(researcher);
        self
    }

    pub fn competitor_analyzer(mut self, analyzer: Arc<dyn CompetitorAnalyzer>) -> Self {
        self.competitor_analyzer = Some(analyzer);
        self
    }

    pub fn response_parser(mut self, parser: Arc<dyn ResponseParser>) -> Self {
        self.response_parser = Some(parser);
        self
    }

    pub fn analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(sink);
        self
    }

    pub fn build(self) -> SeoOptimizationService {
        let templates = self.templates;
        SeoOptimizationService {
            keyword_researcher: self
                .keyword_researcher
                .unwrap_or_else(|| Arc::new(TemplateKeywordResearcher::new(templates.clone()))),
            competitor_analyzer: self
                .competitor_analyzer
                .unwrap_or_else(|| Arc::new(BaselineCompetitorAnalyzer::default())),
            validator: self
                .validator
                .unwrap_or_else(|| Arc::new(BasicContentValidator::default())),
            generator: ContentGenerator::with_parser(
                self.chat,
                self.response_parser
                    .unwrap_or_else(|| Arc::new(MarkdownResponseParser)),
            ),
            analytics: self
                .analytics
                .unwrap_or_else(|| Arc::new(TracingAnalyticsSink)),
            repository: self.repository,
            templates,
            config: self.config,
            logger: StructuredLogger::new("seo-facade"),
            metrics: FacadeMetrics::new(),
        }
    }
}

/// Facade over keyword research, AI generation, scoring and persistence
#[derive(Clone)]
pub struct SeoOptimizationService {
    config: SeoConfig,
    templates: Arc<TemplateCatalog>,
    validator: Arc<dyn ContentValidator>,
    keyword_researcher: Arc<dyn KeywordResearcher>,
    competitor_analyzer: Arc<dyn CompetitorAnalyzer>,
    generator: ContentGenerator,
    repository: Arc<dyn SeoRepository>,
    analytics: Arc<dyn AnalyticsSink>,
    logger: StructuredLogger,
    metrics: FacadeMetrics,
}

impl SeoOptimizationService {
    pub fn builder(chat: Arc<dyn ChatClient>, repository: Arc<dyn SeoRepository>) -> SeoServiceBuilder {
        SeoServiceBuilder {
            config: SeoConfig::default(),
            chat,
            repository,
            templates: Arc::new(TemplateCatalog::standard()),
            validator: None,
            keyword_researcher: None,
            competitor_analyzer: None,
            response_parser: None,
            analytics: None,
        }
    }

    pub fn config(&self) -> &SeoConfig {
        &self.config
    }

    /// Submit an operation to the runtime and return a handle to await
    pub fn submit<F, Fut, T>(&self, operation: F) -> JoinHandle<T>
    where
        F: FnOnce(SeoOptimizationService) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        tokio::spawn(operation(self.clone()))
    }

    /// Run the full optimization pipeline and persist the result
    pub async fn optimize(
        &self,
        request: SeoOptimizationRequest,
    ) -> Result<SeoOptimizationResponse, SeoError> {
        audited("seo_optimize", async {
            self.validator
                .validate(&request)
                .map_err(SeoError::InvalidRequest)?;

            let response = self.run_pipeline(&request).await.map_err(|e| {
                error!(
                    property_id = %request.property_id,
                    content_type = %request.content_type,
                    error = %format!("{:#}", e),
                    "SEO optimization failed"
                );
                match e.downcast::<RepositoryError>() {
                    Ok(storage) => SeoError::Storage(storage),
                    Err(e) => SeoError::Optimization(e),
                }
            })?;

            self.fire_analytics(&response);
            Ok(response)
        })
        .await
    }

    async fn run_pipeline(&self, request: &SeoOptimizationRequest) -> Result<SeoOptimizationResponse> {
        let start = Instant::now();

        let analysis = analyze_content(&request.original_content, &request.existing_tags);
        debug!(
            property_id = %request.property_id,
            word_count = analysis.word_count,
            readability = analysis.readability_score,
            "Content analyzed"
        );

        let keywords = self
            .keyword_researcher
            .research(request, &analysis, self.config.max_keywords)
            .await
            .context("Keyword research failed")?;

        let competitors = self
            .competitor_analyzer
            .analyze(request, &keywords)
            .await
            .context("Competitor analysis failed")?;

        let template = self.templates.select(&request.content_type);
        let target_length = request
            .target_length
            .unwrap_or(self.config.target_content_length);

        let content = self
            .generator
            .generate(
                &PromptInput {
                    request,
                    keywords: &keywords,
                    competitors: &competitors,
                    target_length,
                },
                template,
            )
            .await
            .context(GenerationFailed)?;

        let meta_tags = generate_meta_tags(
            template,
            request,
            &content,
            &keywords,
            &self.config.site_base_url,
        );
        let structured_data = generate_structured_data(template, request, &content, &meta_tags);

        let score = score_text(
            &content.body,
            content.headings.len(),
            content.internal_links.len(),
            &keywords,
            &competitors,
            &request.location,
        );
        let recommendations = generate_recommendations(&score, &competitors);

        let record = NewSeoOptimization {
            property_id: request.property_id.clone(),
            content_type: normalize_content_type(&request.content_type),
            original_content: request.original_content.clone(),
            optimized_content: serde_json::to_string(&content)
                .context("Failed to serialize optimized content")?,
            meta_tags: serde_json::to_string(&meta_tags).context("Failed to serialize meta tags")?,
            structured_data: serde_json::to_string(&structured_data)
                .context("Failed to serialize structured data")?,
            seo_score: score.overall,
            recommendations: serde_json::to_string(&recommendations)
                .context("Failed to serialize recommendations")?,
        };
        let saved = self
            .repository
            .save(record)
            .await
            .context("Failed to persist SEO optimization")?;

        self.metrics.inc_optimizations_persisted();
        self.metrics.observe_seo_score(score.overall);

        let processing_time_ms = start.elapsed().as_millis() as u64;
        self.logger.log_optimization(
            saved.id,
            &saved.property_id,
            &saved.content_type,
            score.overall,
            &score.grade,
            processing_time_ms,
        );

        Ok(SeoOptimizationResponse {
            optimization_id: saved.id,
            property_id: saved.property_id,
            content_type: saved.content_type,
            template: template.content_type.clone(),
            estimated_impact: estimated_impact(score.overall),
            keywords,
            competitor_analysis: competitors,
            content,
            meta_tags,
            structured_data,
            score,
            recommendations,
            processing_time_ms,
        })
    }

    fn fire_analytics(&self, response: &SeoOptimizationResponse) {
        let sink = self.analytics.clone();
        let event = OptimizationEvent {
            optimization_id: response.optimization_id,
            property_id: response.property_id.clone(),
            content_type: response.content_type.clone(),
            overall_score: response.score.overall,
            grade: response.score.grade.clone(),
            keyword_count: response.keywords.all_keywords().count(),
            processing_time_ms: response.processing_time_ms,
            occurred_at: Utc::now(),
        };

        tokio::spawn(async move {
            let optimization_id = event.optimization_id;
            if let Err(e) = sink.record(event).await {
                warn!(
                    optimization_id = optimization_id,
                    error = %e,
                    "Failed to record optimization analytics"
                );
            }
        });
    }

    pub async fn research_keywords(
        &self,
        request: &SeoOptimizationRequest,
    ) -> Result<KeywordResearch, SeoError> {
        audited("seo_research_keywords", async {
            self.validator
                .validate(request)
                .map_err(SeoError::InvalidRequest)?;
            let analysis = analyze_content(&request.original_content, &request.existing_tags);
            self.keyword_researcher
                .research(request, &analysis, self.config.max_keywords)
                .await
                .map_err(SeoError::KeywordResearch)
        })
        .await
    }

    pub async fn analyze_competitors(
        &self,
        request: &SeoOptimizationRequest,
        keywords: &KeywordResearch,
    ) -> Result<CompetitorAnalysis, SeoError> {
        audited("seo_analyze_competitors", async {
            self.competitor_analyzer
                .analyze(request, keywords)
                .await
                .map_err(SeoError::CompetitorAnalysis)
        })
        .await
    }

    /// Local keyword set, Place schema and local recommendations
    pub async fn optimize_local_seo(
        &self,
        property_id: &str,
        location: &str,
    ) -> Result<LocalSeoReport, SeoError> {
        audited("seo_optimize_local", async {
            if property_id.trim().is_empty() {
                return Err(SeoError::InvalidRequest("property_id is required".to_string()));
            }
            if location.trim().is_empty() {
                return Err(SeoError::LocalSeo(anyhow!("location is required")));
            }

            let request = SeoOptimizationRequest {
                property_id: property_id.to_string(),
                content_type: DEFAULT_CONTENT_TYPE.to_string(),
                original_content: String::new(),
                location: location.to_string(),
                existing_tags: Vec::new(),
                property_type: None,
                target_length: None,
            };
            let analysis = analyze_content("", &[] as &[&str]);
            let keywords = self
                .keyword_researcher
                .research(&request, &analysis, self.config.max_keywords)
                .await
                .context("Local keyword research failed")
                .map_err(SeoError::LocalSeo)?;

            let local_score = local_score(&keywords.local_keywords, location);
            Ok(LocalSeoReport {
                property_id: property_id.to_string(),
                location: location.to_string(),
                recommendations: local_recommendations(location, local_score),
                local_keywords: keywords.local_keywords,
                place_schema: place_schema(location),
                local_score,
            })
        })
        .await
    }

    /// Checks over a stored optimization
    pub async fn technical_audit(&self, optimization_id: i64) -> Result<TechnicalAuditReport, SeoError> {
        audited("seo_technical_audit", async {
            let record = self
                .repository
                .find_by_id(optimization_id)
                .await
                .map_err(|e| SeoError::TechnicalAudit(e.into()))?
                .ok_or(SeoError::NotFound(optimization_id))?;
            audit_record(&record).map_err(SeoError::TechnicalAudit)
        })
        .await
    }

    pub async fn get_optimization(&self, optimization_id: i64) -> Result<SeoOptimization, SeoError> {
        audited("seo_get_optimization", async {
            self.repository
                .find_by_id(optimization_id)
                .await?
                .ok_or(SeoError::NotFound(optimization_id))
        })
        .await
    }

    /// Records of one property, newest first
    pub async fn optimization_history(
        &self,
        property_id: &str,
        page: PageRequest,
    ) -> Result<Page<SeoOptimization>, SeoError> {
        audited("seo_optimization_history", async {
            Ok(self.repository.find_by_property_id(property_id, page).await?)
        })
        .await
    }

    /// Score existing content without generation or persistence
    pub async fn score_content(
        &self,
        request: &SeoOptimizationRequest,
    ) -> Result<ContentScoreReport, SeoError> {
        audited("seo_score_content", async {
            self.validator
                .validate(request)
                .map_err(SeoError::InvalidRequest)?;

            let analysis = analyze_content(&request.original_content, &request.existing_tags);
            let keywords = self
                .keyword_researcher
                .research(request, &analysis, self.config.max_keywords)
                .await
                .context("Keyword research failed")
                .map_err(SeoError::Optimization)?;
            let competitors = self
                .competitor_analyzer
                .analyze(request, &keywords)
                .await
                .context("Competitor analysis failed")
                .map_err(SeoError::Optimization)?;

            let links = MarkdownResponseParser
                .extract_internal_links(&request.original_content)
                .len();
            let score = score_text(
                &request.original_content,
                analysis.heading_count,
                links,
                &keywords,
                &competitors,
                &request.location,
            );
            let recommendations = generate_recommendations(&score, &competitors);

            Ok(ContentScoreReport {
                analysis,
                score,
                recommendations,
            })
        })
        .await
    }
}

fn score_text(
    text: &str,
    heading_count: usize,
    internal_link_count: usize,
    keywords: &KeywordResearch,
    competitors: &CompetitorAnalysis,
    location: &str,
) -> SeoScore {
    compute_score(&ScoreInputs {
        word_count: word_count(text),
        keyword_density: keyword_density(text, &keywords.primary_keywords),
        readability: readability_score(text),
        heading_count,
        internal_link_count,
        keyword_opportunity: keywords.opportunity_score,
        competitor_strength: competitors.average_strength,
        keywords: keywords.all_keywords().map(String::as_str).collect(),
        location,
    })
}

fn local_recommendations(location: &str, local_score: f64) -> Vec<SeoRecommendation> {
    let mut recommendations = vec![
        SeoRecommendation {
            kind: RecommendationType::LocalSeo,
            priority: Priority::High,
            title: "Complete the business profile".to_string(),
            description: format!(
                "Listings with a verified profile in {} rank higher in map results",
                location
            ),
            action: "Claim and verify the local business profile with consistent name, address and phone"
                .to_string(),
        },
        SeoRecommendation {
            kind: RecommendationType::LocalSeo,
            priority: Priority::Medium,
            title: "Publish neighborhood content".to_string(),
            description: format!("Area guides for {} attract local search traffic", location),
            action: "Write community guides covering schools, amenities and transport".to_string(),
        },
    ];

    if local_score < super::recommendations::LOCAL_THRESHOLD {
        recommendations.push(SeoRecommendation {
            kind: RecommendationType::Keywords,
            priority: Priority::Medium,
            title: "Add location keywords".to_string(),
            description: format!("No keyword mentions {}", location),
            action: "Target phrases combining the property type with the city name".to_string(),
        });
    }

    recommendations
}
