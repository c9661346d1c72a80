//! Technical audit over a stored optimization

use super::meta::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};
use super::model::{AuditCheck, GeneratedContent, MetaTags, TechnicalAuditReport};
use super::scoring::{MIN_HEADINGS, MIN_INTERNAL_LINKS};
use crate::storage::SeoOptimization;
use anyhow::{Context, Result};

pub const MIN_TITLE_CHARS: usize = 30;
pub const MIN_DESCRIPTION_CHARS: usize = 70;

fn check(name: &str, passed: bool, detail: String) -> AuditCheck {
    AuditCheck {
        name: name.to_string(),
        passed,
        detail,
    }
}

pub fn audit_record(record: &SeoOptimization) -> Result<TechnicalAuditReport> {
    let meta: MetaTags =
        serde_json::from_str(&record.meta_tags).context("Stored meta tags are not valid JSON")?;
    let content: GeneratedContent = serde_json::from_str(&record.optimized_content)
        .context("Stored optimized content is not valid JSON")?;
    let structured: Vec<serde_json::Value> = serde_json::from_str(&record.structured_data)
        .context("Stored structured data is not valid JSON")?;

    let title_len = meta.title.chars().count();
    let description_len = meta.description.chars().count();

    let checks = vec![
        check(
            "title_length",
            (MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&title_len),
            format!("{} characters (expected {}-{})", title_len, MIN_TITLE_CHARS, MAX_TITLE_CHARS),
        ),
        check(
            "meta_description_length",
            (MIN_DESCRIPTION_CHARS..=MAX_DESCRIPTION_CHARS).contains(&description_len),
            format!(
                "{} characters (expected {}-{})",
                description_len, MIN_DESCRIPTION_CHARS, MAX_DESCRIPTION_CHARS
            ),
        ),
        check(
            "heading_count",
            content.headings.len() >= MIN_HEADINGS,
            format!("{} headings (expected at least {})", content.headings.len(), MIN_HEADINGS),
        ),
        check(
            "internal_links",
            content.internal_links.len() >= MIN_INTERNAL_LINKS,
            format!(
                "{} internal links (expected at least {})",
                content.internal_links.len(),
                MIN_INTERNAL_LINKS
            ),
        ),
        check(
            "structured_data",
            !structured.is_empty(),
            format!("{} schema objects", structured.len()),
        ),
    ];

    let passed = checks.iter().filter(|c| c.passed).count();
    let score = passed as f64 / checks.len() as f64;

    Ok(TechnicalAuditReport {
        optimization_id: record.id,
        checks,
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seo::model::InternalLink;
    use chrono::Utc;

    fn record(meta: &MetaTags, content: &GeneratedContent, structured: &str) -> SeoOptimization {
        SeoOptimization {
            id: 3,
            property_id: "p1".to_string(),
            content_type: "BLOG_POST".to_string(),
            original_content: "original".to_string(),
            optimized_content: serde_json::to_string(content).unwrap(),
            meta_tags: serde_json::to_string(meta).unwrap(),
            structured_data: structured.to_string(),
            seo_score: 0.7,
            recommendations: "[]".to_string(),
            created_at: Utc::now(),
        }
    }

    fn meta(title: &str, description: &str) -> MetaTags {
        MetaTags {
            title: title.to_string(),
            description: description.to_string(),
            keywords: vec![],
            og_title: title.to_string(),
            og_description: description.to_string(),
            og_type: "article".to_string(),
            canonical_url: "https://example.com/blog-post/p1".to_string(),
            robots: "index, follow".to_string(),
        }
    }

    fn content(headings: usize, links: usize) -> GeneratedContent {
        GeneratedContent {
            title: "Title".to_string(),
            body: "Body".to_string(),
            headings: (0..headings).map(|i| format!("H{}", i)).collect(),
            internal_links: (0..links)
                .map(|i| InternalLink {
                    anchor: format!("link {}", i),
                    href: format!("/page/{}", i),
                })
                .collect(),
            call_to_action: "Call now".to_string(),
            word_count: 1,
        }
    }

    #[test]
    fn test_all_checks_pass() {
        let rec = record(
            &meta(&"t".repeat(45), &"d".repeat(140)),
            &content(3, 2),
            r#"[{"@type":"Article"}]"#,
        );
        let report = audit_record(&rec).unwrap();
        assert_eq!(report.optimization_id, 3);
        assert_eq!(report.checks.len(), 5);
        assert!(report.checks.iter().all(|c| c.passed));
        assert_eq!(report.score, 1.0);
    }

    #[test]
    fn test_failing_checks_reported() {
        let rec = record(&meta("Short", "Too short"), &content(1, 0), "[]");
        let report = audit_record(&rec).unwrap();
        assert_eq!(report.score, 0.0);
        assert_eq!(report.checks[0].detail, "5 characters (expected 30-60)");
    }

    #[test]
    fn test_corrupt_record_is_error() {
        let mut rec = record(&meta("t", "d"), &content(0, 0), "[]");
        rec.meta_tags = "not json".to_string();
        assert!(audit_record(&rec).is_err());
    }
}
