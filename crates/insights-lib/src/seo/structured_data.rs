//! schema.org JSON-LD objects

use super::model::{GeneratedContent, MetaTags, SeoOptimizationRequest};
use super::templates::{SchemaType, SeoTemplate};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

const SCHEMA_CONTEXT: &str = "https://schema.org";

pub fn place_schema(location: &str) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": SchemaType::Place.as_str(),
        "name": location,
        "address": {
            "@type": "PostalAddress",
            "addressLocality": location,
        },
    })
}

fn listing_schema(request: &SeoOptimizationRequest, meta: &MetaTags, now: DateTime<Utc>) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": SchemaType::RealEstateListing.as_str(),
        "name": meta.title,
        "description": meta.description,
        "url": meta.canonical_url,
        "datePosted": now.format("%Y-%m-%d").to_string(),
        "identifier": request.property_id,
        "about": {
            "@type": "Residence",
            "name": request.property_type_or_default(),
            "address": {
                "@type": "PostalAddress",
                "addressLocality": request.location,
            },
        },
    })
}

fn article_schema(content: &GeneratedContent, meta: &MetaTags, now: DateTime<Utc>) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": SchemaType::Article.as_str(),
        "headline": content.title,
        "description": meta.description,
        "keywords": meta.keywords.join(", "),
        "wordCount": content.word_count,
        "datePublished": now.to_rfc3339(),
        "mainEntityOfPage": meta.canonical_url,
    })
}

/// One object per schema type of the template, in template order
pub fn generate_structured_data(
    template: &SeoTemplate,
    request: &SeoOptimizationRequest,
    content: &GeneratedContent,
    meta: &MetaTags,
) -> Vec<Value> {
    let now = Utc::now();
    template
        .schema_types
        .iter()
        .map(|schema| match schema {
            SchemaType::RealEstateListing => listing_schema(request, meta, now),
            SchemaType::Place => place_schema(&request.location),
            SchemaType::Article => article_schema(content, meta, now),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seo::templates::TemplateCatalog;

    fn fixtures() -> (SeoOptimizationRequest, GeneratedContent, MetaTags) {
        let request = SeoOptimizationRequest {
            property_id: "p1".to_string(),
            content_type: "PROPERTY_LISTING".to_string(),
            original_content: String::new(),
            location: "Austin".to_string(),
            existing_tags: vec![],
            property_type: None,
            target_length: None,
        };
        let content = GeneratedContent {
            title: "Austin Living".to_string(),
            body: "Body".to_string(),
            headings: vec![],
            internal_links: vec![],
            call_to_action: String::new(),
            word_count: 1,
        };
        let meta = MetaTags {
            title: "Title".to_string(),
            description: "Description".to_string(),
            keywords: vec!["austin".to_string(), "homes".to_string()],
            og_title: "Title".to_string(),
            og_description: "Description".to_string(),
            og_type: "website".to_string(),
            canonical_url: "https://example.com/x".to_string(),
            robots: "index, follow".to_string(),
        };
        (request, content, meta)
    }

    #[test]
    fn test_listing_template_emits_listing_and_place() {
        let catalog = TemplateCatalog::standard();
        let (request, content, meta) = fixtures();
        let data = generate_structured_data(catalog.select("PROPERTY_LISTING"), &request, &content, &meta);

        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["@type"], "RealEstateListing");
        assert_eq!(data[0]["about"]["address"]["addressLocality"], "Austin");
        assert_eq!(data[1]["@type"], "Place");
        assert_eq!(data[1]["name"], "Austin");
    }

    #[test]
    fn test_article_schema_fields() {
        let catalog = TemplateCatalog::standard();
        let (request, content, meta) = fixtures();
        let data = generate_structured_data(catalog.select("BLOG_POST"), &request, &content, &meta);

        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["@type"], "Article");
        assert_eq!(data[0]["headline"], "Austin Living");
        assert_eq!(data[0]["keywords"], "austin, homes");
    }
}
