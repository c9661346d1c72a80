//! Meta and Open Graph tags

use super::model::{GeneratedContent, KeywordResearch, MetaTags, SeoOptimizationRequest};
use super::templates::{SchemaType, SeoTemplate, TemplateValues};

pub const MAX_TITLE_CHARS: usize = 60;
pub const MAX_DESCRIPTION_CHARS: usize = 160;
/// Keywords listed in the keywords meta tag
pub const META_KEYWORDS: usize = 10;

/// Cut at a word boundary so the result, with a trailing `...`, fits `max`
pub fn truncate_chars(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(3);
    let cut: String = text.chars().take(budget).collect();
    let cut = match cut.rfind(' ') {
        Some(idx) if idx > budget / 2 => cut[..idx].to_string(),
        _ => cut,
    };
    format!("{}...", cut.trim_end())
}

/// `"Blog Post"` -> `"blog-post"`
fn slug(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn canonical_url(site_base_url: &str, template: &SeoTemplate, property_id: &str) -> String {
    format!(
        "{}/{}/{}",
        site_base_url.trim_end_matches('/'),
        slug(&template.content_type),
        slug(property_id)
    )
}

pub fn generate_meta_tags(
    template: &SeoTemplate,
    request: &SeoOptimizationRequest,
    content: &GeneratedContent,
    keywords: &KeywordResearch,
    site_base_url: &str,
) -> MetaTags {
    let values = TemplateValues {
        property_type: request.property_type_or_default(),
        location: &request.location,
        title: &content.title,
    };

    let title = truncate_chars(&template.render_title(values), MAX_TITLE_CHARS);
    let description = truncate_chars(&template.render_description(values), MAX_DESCRIPTION_CHARS);
    let keywords: Vec<String> = keywords.all_keywords().take(META_KEYWORDS).cloned().collect();
    let og_type = if template.schema_types.contains(&SchemaType::Article) {
        "article"
    } else {
        "website"
    };

    MetaTags {
        og_title: title.clone(),
        og_description: description.clone(),
        title,
        description,
        keywords,
        og_type: og_type.to_string(),
        canonical_url: canonical_url(site_base_url, template, &request.property_id),
        robots: "index, follow".to_string(),
    }
}
