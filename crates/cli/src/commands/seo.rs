//! SEO optimization CLI commands

use anyhow::{Context, Result};
use colored::Colorize;
use insights_lib::{
    seo::{
        CompetitorAnalysis, ContentScoreReport, KeywordResearch, LocalSeoReport, SeoOptimizationRequest,
        SeoOptimizationResponse, SeoRecommendation, SeoScore, TechnicalAuditReport,
    },
    storage::{Page, SeoOptimization},
};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use super::label;
use crate::client::ApiClient;
use crate::output::{
    color_grade, color_score, color_status, print_heading, print_info, print_json, print_rows,
    print_success, print_warning, truncate, OutputFormat,
};

/// Content source and metadata shared by optimize, keywords and score
#[derive(Debug, Clone, clap::Args)]
pub struct ContentArgs {
    /// Property identifier
    pub property_id: String,

    /// Content type (PROPERTY_LISTING, COMMUNITY_GUIDE, MARKET_REPORT, BLOG_POST)
    #[arg(long, short = 't', default_value = "PROPERTY_LISTING")]
    pub content_type: String,

    /// Location the content targets, e.g. "Austin, TX"
    #[arg(long, short)]
    pub location: String,

    /// Content text
    #[arg(long, conflicts_with = "file")]
    pub content: Option<String>,

    /// Read content from a file
    #[arg(long, short)]
    pub file: Option<PathBuf>,

    /// Existing tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Property type, e.g. Condo
    #[arg(long)]
    pub property_type: Option<String>,

    /// Target length in words
    #[arg(long)]
    pub target_length: Option<usize>,
}

impl ContentArgs {
    pub fn into_request(self) -> Result<SeoOptimizationRequest> {
        let original_content = match (self.content, &self.file) {
            (Some(text), _) => text,
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            (None, None) => anyhow::bail!("Provide content with --content or --file"),
        };

        Ok(SeoOptimizationRequest {
            property_id: self.property_id,
            content_type: self.content_type,
            original_content,
            location: self.location,
            existing_tags: self.tags,
            property_type: self.property_type,
            target_length: self.target_length,
        })
    }
}

#[derive(Serialize)]
struct LocalBody<'a> {
    property_id: &'a str,
    location: &'a str,
}

#[derive(Serialize)]
struct CompetitorBody<'a> {
    request: &'a SeoOptimizationRequest,
    keywords: &'a KeywordResearch,
}

#[derive(Tabled)]
struct ScoreRow {
    #[tabled(rename = "Content")]
    content: String,
    #[tabled(rename = "Technical")]
    technical: String,
    #[tabled(rename = "Authority")]
    authority: String,
    #[tabled(rename = "Local")]
    local: String,
    #[tabled(rename = "Overall")]
    overall: String,
    #[tabled(rename = "Grade")]
    grade: String,
}

impl From<&SeoScore> for ScoreRow {
    fn from(score: &SeoScore) -> Self {
        Self {
            content: color_score(score.content),
            technical: color_score(score.technical),
            authority: color_score(score.authority),
            local: color_score(score.local),
            overall: color_score(score.overall),
            grade: color_grade(&score.grade),
        }
    }
}

#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Action")]
    action: String,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Content Type")]
    content_type: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Created")]
    created_at: String,
}

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "Check")]
    name: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

#[derive(Tabled)]
struct CompetitorRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Strength")]
    strength: String,
    #[tabled(rename = "Ranking Keywords")]
    keywords: String,
}

fn print_recommendations(recommendations: &[SeoRecommendation]) {
    if recommendations.is_empty() {
        print_success("No recommendations, content is in good shape");
        return;
    }

    let rows: Vec<RecommendationRow> = recommendations
        .iter()
        .map(|r| {
            let priority = label(&r.priority);
            RecommendationRow {
                priority: color_status(&priority),
                kind: label(&r.kind),
                title: r.title.clone(),
                action: truncate(&r.action, 60),
            }
        })
        .collect();
    print_rows(rows);
}

fn print_keyword_list(name: &str, keywords: &[String]) {
    if keywords.is_empty() {
        println!("{:<12} {}", name, "-".dimmed());
    } else {
        println!("{:<12} {}", name, keywords.join(", "));
    }
}

/// Run the full optimization pipeline
pub async fn optimize(client: &ApiClient, args: ContentArgs, format: OutputFormat) -> Result<()> {
    let request = args.into_request()?;
    let response: SeoOptimizationResponse = client.post("api/v1/seo/optimize", &request).await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => {
            print_heading("SEO Optimization");
            println!("ID:         {}", response.optimization_id.to_string().cyan());
            println!("Property:   {}", response.property_id.cyan());
            println!("Template:   {}", response.template);
            println!("Title:      {}", response.content.title.bold());
            println!("Words:      {}", response.content.word_count);
            println!("Canonical:  {}", response.meta_tags.canonical_url);
            println!(
                "Impact:     {}",
                color_status(&response.estimated_impact.to_string())
            );
            println!("Took:       {} ms", response.processing_time_ms);
            println!();

            print_rows(vec![ScoreRow::from(&response.score)]);
            println!();
            print_keyword_list("Primary", &response.keywords.primary_keywords);
            print_keyword_list("Long tail", &response.keywords.long_tail_keywords);
            print_keyword_list("Local", &response.keywords.local_keywords);
            println!();
            print_recommendations(&response.recommendations);
        }
    }

    Ok(())
}

/// Research keywords without generating content
pub async fn keywords(client: &ApiClient, args: ContentArgs, format: OutputFormat) -> Result<()> {
    let request = args.into_request()?;
    let research: KeywordResearch = client.post("api/v1/seo/keywords", &request).await?;

    match format {
        OutputFormat::Json => print_json(&research)?,
        OutputFormat::Table => {
            print_heading("Keyword Research");
            print_keyword_list("Primary", &research.primary_keywords);
            print_keyword_list("Long tail", &research.long_tail_keywords);
            print_keyword_list("Local", &research.local_keywords);
            println!();
            println!("Opportunity: {}", color_score(research.opportunity_score));
        }
    }

    Ok(())
}

/// Research keywords, then compare them against competitors
pub async fn competitors(client: &ApiClient, args: ContentArgs, format: OutputFormat) -> Result<()> {
    let request = args.into_request()?;
    let keywords: KeywordResearch = client.post("api/v1/seo/keywords", &request).await?;
    let analysis: CompetitorAnalysis = client
        .post(
            "api/v1/seo/competitors",
            &CompetitorBody {
                request: &request,
                keywords: &keywords,
            },
        )
        .await?;

    match format {
        OutputFormat::Json => print_json(&analysis)?,
        OutputFormat::Table => {
            print_heading("Competitor Analysis");
            let rows: Vec<CompetitorRow> = analysis
                .competitors
                .iter()
                .map(|c| CompetitorRow {
                    domain: c.domain.clone(),
                    strength: format!("{:.0}", c.strength),
                    keywords: truncate(&c.ranking_keywords.join(", "), 60),
                })
                .collect();
            print_rows(rows);
            println!();
            print_keyword_list("Gaps", &analysis.keyword_gaps);
            println!();
            print_info(&analysis.insights);
        }
    }

    Ok(())
}

/// Score existing content
pub async fn score(client: &ApiClient, args: ContentArgs, format: OutputFormat) -> Result<()> {
    let request = args.into_request()?;
    let report: ContentScoreReport = client.post("api/v1/seo/score", &request).await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_heading("Content Score");
            println!(
                "Words: {}  Sentences: {}  Headings: {}  Readability: {}",
                report.analysis.word_count,
                report.analysis.sentence_count,
                report.analysis.heading_count,
                color_score(report.analysis.readability_score)
            );
            println!();
            print_rows(vec![ScoreRow::from(&report.score)]);
            println!();
            print_recommendations(&report.recommendations);
        }
    }

    Ok(())
}

/// Local SEO report for a property
pub async fn local(
    client: &ApiClient,
    property_id: &str,
    location: &str,
    format: OutputFormat,
) -> Result<()> {
    let report: LocalSeoReport = client
        .post(
            "api/v1/seo/local",
            &LocalBody {
                property_id,
                location,
            },
        )
        .await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_heading("Local SEO");
            println!("Location:   {}", report.location.cyan());
            println!("Score:      {}", color_score(report.local_score));
            print_keyword_list("Keywords", &report.local_keywords);
            println!();
            print_recommendations(&report.recommendations);
        }
    }

    Ok(())
}

/// Show a stored optimization record
pub async fn show(client: &ApiClient, id: i64, format: OutputFormat) -> Result<()> {
    let record: SeoOptimization = client
        .get(&format!("api/v1/seo/optimizations/{}", id))
        .await?;

    match format {
        OutputFormat::Json => print_json(&record)?,
        OutputFormat::Table => {
            print_heading("Stored Optimization");
            println!("ID:           {}", record.id.to_string().cyan());
            println!("Property:     {}", record.property_id.cyan());
            println!("Content type: {}", record.content_type);
            println!("Score:        {}", color_score(record.seo_score));
            println!("Created:      {}", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
            println!();

            let content: serde_json::Value = serde_json::from_str(&record.optimized_content)
                .context("Stored content is not valid JSON")?;
            if let Some(title) = content.get("title").and_then(|t| t.as_str()) {
                println!("{}", title.bold());
            }
            if let Some(body) = content.get("body").and_then(|b| b.as_str()) {
                println!("{}", body);
            }
        }
    }

    Ok(())
}

/// List stored optimizations for a property, newest first
pub async fn history(
    client: &ApiClient,
    property_id: &str,
    page: usize,
    size: usize,
    format: OutputFormat,
) -> Result<()> {
    let path = format!(
        "api/v1/seo/properties/{}/history?page={}&size={}",
        property_id, page, size
    );
    let result: Page<SeoOptimization> = client.get(&path).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            if result.items.is_empty() {
                print_warning("No optimizations found for this property");
                return Ok(());
            }

            let rows: Vec<HistoryRow> = result
                .items
                .iter()
                .map(|r| HistoryRow {
                    id: r.id,
                    content_type: r.content_type.clone(),
                    score: color_score(r.seo_score),
                    created_at: r.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            print_rows(rows);
            println!(
                "\nPage {} ({} of {} records){}",
                result.page,
                result.items.len(),
                result.total_count,
                if result.has_more { ", more available" } else { "" }
            );
        }
    }

    Ok(())
}

/// Technical audit of a stored optimization
pub async fn audit(client: &ApiClient, id: i64, format: OutputFormat) -> Result<()> {
    let report: TechnicalAuditReport = client
        .get(&format!("api/v1/seo/optimizations/{}/audit", id))
        .await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_heading("Technical Audit");
            let rows: Vec<CheckRow> = report
                .checks
                .iter()
                .map(|c| CheckRow {
                    name: c.name.clone(),
                    result: color_status(if c.passed { "passed" } else { "failed" }),
                    detail: c.detail.clone(),
                })
                .collect();
            print_rows(rows);
            println!("\nAudit score: {}", color_score(report.score));
        }
    }

    Ok(())
}
