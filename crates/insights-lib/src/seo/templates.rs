//! Static SEO template table keyed by content type

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Template used when a content type is unknown
pub const DEFAULT_CONTENT_TYPE: &str = "PROPERTY_LISTING";

/// schema.org types a template may emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaType {
    RealEstateListing,
    Place,
    Article,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::RealEstateListing => "RealEstateListing",
            SchemaType::Place => "Place",
            SchemaType::Article => "Article",
        }
    }
}

/// Formats and seeds for one content type
///
/// Format strings use `{property_type}`, `{location}` and `{title}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoTemplate {
    pub content_type: String,
    pub title_format: String,
    pub description_format: String,
    pub h1_format: String,
    pub seed_keywords: Vec<String>,
    pub local_seo: bool,
    pub schema_types: Vec<SchemaType>,
}

/// Values substituted into template format strings
#[derive(Debug, Clone, Copy)]
pub struct TemplateValues<'a> {
    pub property_type: &'a str,
    pub location: &'a str,
    pub title: &'a str,
}

impl SeoTemplate {
    fn new(
        content_type: &str,
        title_format: &str,
        description_format: &str,
        h1_format: &str,
        seed_keywords: &[&str],
        local_seo: bool,
        schema_types: &[SchemaType],
    ) -> Self {
        Self {
            content_type: content_type.to_string(),
            title_format: title_format.to_string(),
            description_format: description_format.to_string(),
            h1_format: h1_format.to_string(),
            seed_keywords: seed_keywords.iter().map(|s| s.to_string()).collect(),
            local_seo,
            schema_types: schema_types.to_vec(),
        }
    }

    pub fn render_title(&self, values: TemplateValues<'_>) -> String {
        render(&self.title_format, values)
    }

    pub fn render_description(&self, values: TemplateValues<'_>) -> String {
        render(&self.description_format, values)
    }

    pub fn render_h1(&self, values: TemplateValues<'_>) -> String {
        render(&self.h1_format, values)
    }
}

fn render(format: &str, values: TemplateValues<'_>) -> String {
    format
        .replace("{property_type}", values.property_type)
        .replace("{location}", values.location)
        .replace("{title}", values.title)
}

/// `"property listing"` -> `"PROPERTY_LISTING"`
pub fn normalize_content_type(content_type: &str) -> String {
    content_type.trim().to_uppercase().replace(' ', "_")
}

/// Immutable template table, built once at start-up
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: HashMap<String, SeoTemplate>,
}

impl TemplateCatalog {
    /// The four built-in templates
    pub fn standard() -> Self {
        let templates = [
            SeoTemplate::new(
                "PROPERTY_LISTING",
                "{property_type} for Sale in {location} | Premium Real Estate",
                "Discover this {property_type} in {location}. Explore photos, amenities and neighborhood details, then schedule a viewing today.",
                "{property_type} in {location}",
                &["real estate", "property for sale", "homes for sale", "real estate listing"],
                true,
                &[SchemaType::RealEstateListing, SchemaType::Place],
            ),
            SeoTemplate::new(
                "COMMUNITY_GUIDE",
                "Living in {location}: Complete Community Guide",
                "Everything you need to know about living in {location}: schools, amenities, transport and the local real estate market.",
                "Your Guide to Living in {location}",
                &["neighborhood guide", "community", "living in", "local amenities"],
                true,
                &[SchemaType::Place, SchemaType::Article],
            ),
            SeoTemplate::new(
                "MARKET_REPORT",
                "{location} Real Estate Market Report",
                "The latest {location} housing market trends: prices, inventory, days on market and expert outlook.",
                "{location} Housing Market Update",
                &["market trends", "home prices", "real estate market", "housing market"],
                true,
                &[SchemaType::Article],
            ),
            SeoTemplate::new(
                "BLOG_POST",
                "{title} | Real Estate Insights",
                "{title}. Expert real estate advice for buyers, sellers and investors.",
                "{title}",
                &["real estate tips", "home buying", "property investment"],
                false,
                &[SchemaType::Article],
            ),
        ]
        .into_iter()
        .map(|t| (t.content_type.clone(), t))
        .collect();

        Self { templates }
    }

    pub fn get(&self, content_type: &str) -> Option<&SeoTemplate> {
        self.templates.get(content_type)
    }

    /// Template for a content type, falling back to PROPERTY_LISTING
    pub fn select(&self, content_type: &str) -> &SeoTemplate {
        self.templates
            .get(&normalize_content_type(content_type))
            .or_else(|| self.templates.get(DEFAULT_CONTENT_TYPE))
            .expect("standard catalog always contains the default template")
    }

    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
