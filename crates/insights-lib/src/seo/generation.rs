//! AI content generation: prompt assembly and response mining
//!
//! The response parser is a line-oriented heuristic over markdown-ish
//! text. It does not understand arbitrary model output; each extractor
//! is a default trait method so a better one can replace it in isolation.

use super::model::{
    CompetitorAnalysis, GeneratedContent, InternalLink, KeywordResearch, SeoOptimizationRequest,
};
use super::templates::{SeoTemplate, TemplateValues};
use crate::client::ChatClient;
use crate::seo::analysis::word_count;
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::debug;

/// Primary keywords included in the prompt
pub const PROMPT_KEYWORDS: usize = 10;

pub const DEFAULT_CALL_TO_ACTION: &str = "Contact us today to schedule a viewing.";

const PROMPT_TEMPLATE: &str = "\
You are an expert real estate copywriter and SEO specialist.
Rewrite the content below into SEO-optimized copy.

Original content:
{content}

Property type: {property_type}
Location: {location}
Target keywords: {keywords}
Competitor insights: {insights}
Target length: about {target_length} words

Format the answer as markdown:
- first line: '# ' followed by the page title
- section headings starting with '## '
- internal links as [anchor text](/relative-path)
- last line: 'CTA: ' followed by a call to action";

/// Inputs of one generation prompt
pub struct PromptInput<'a> {
    pub request: &'a SeoOptimizationRequest,
    pub keywords: &'a KeywordResearch,
    pub competitors: &'a CompetitorAnalysis,
    pub target_length: usize,
}

pub fn build_prompt(input: &PromptInput<'_>) -> String {
    let keywords = input
        .keywords
        .primary_keywords
        .iter()
        .take(PROMPT_KEYWORDS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    PROMPT_TEMPLATE
        .replace("{content}", &input.request.original_content)
        .replace("{property_type}", input.request.property_type_or_default())
        .replace("{location}", &input.request.location)
        .replace("{keywords}", &keywords)
        .replace("{insights}", &input.competitors.insights)
        .replace("{target_length}", &input.target_length.to_string())
}

fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| line[prefix.len()..].trim())
}

fn cta_line(line: &str) -> Option<&str> {
    let line = line.trim();
    strip_prefix_ci(line, "CTA:").or_else(|| strip_prefix_ci(line, "Call to action:"))
}

fn title_line(line: &str) -> Option<&str> {
    let line = line.trim();
    line.strip_prefix("# ")
        .map(str::trim)
        .or_else(|| strip_prefix_ci(line, "Title:"))
}

/// Mines a raw AI response into content fields
pub trait ResponseParser: Send + Sync {
    /// First `# ` line or `Title:` line
    fn extract_title(&self, raw: &str) -> Option<String> {
        raw.lines()
            .find_map(title_line)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    /// Everything except the title and call-to-action lines
    fn extract_body(&self, raw: &str) -> String {
        let mut title_seen = false;
        raw.lines()
            .filter(|line| {
                if !title_seen && title_line(line).is_some() {
                    title_seen = true;
                    return false;
                }
                cta_line(line).is_none()
            })
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    /// `## ` and `### ` lines
    fn extract_headings(&self, raw: &str) -> Vec<String> {
        raw.lines()
            .map(str::trim)
            .filter_map(|line| {
                line.strip_prefix("### ")
                    .or_else(|| line.strip_prefix("## "))
                    .map(str::trim)
            })
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Markdown links whose target is a relative path
    fn extract_internal_links(&self, raw: &str) -> Vec<InternalLink> {
        let mut links = Vec::new();
        let mut rest = raw;
        while let Some(open) = rest.find('[') {
            let after_open = &rest[open + 1..];
            let Some(close) = after_open.find("](") else {
                break;
            };
            let anchor = &after_open[..close];
            let after_paren = &after_open[close + 2..];
            let Some(end) = after_paren.find(')') else {
                break;
            };
            let href = after_paren[..end].trim();
            if href.starts_with('/') && !anchor.contains('[') && !anchor.trim().is_empty() {
                links.push(InternalLink {
                    anchor: anchor.trim().to_string(),
                    href: href.to_string(),
                });
            }
            rest = &after_paren[end + 1..];
        }
        links
    }

    fn extract_call_to_action(&self, raw: &str) -> Option<String> {
        raw.lines()
            .find_map(cta_line)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}

/// The bundled heuristic parser
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownResponseParser;

impl ResponseParser for MarkdownResponseParser {}

/// Marks the chat-backed generation stage in an optimization error chain
#[derive(Debug, thiserror::Error)]
#[error("Content generation failed")]
pub struct GenerationFailed;

/// Sends the prompt to the chat backend and mines the reply
#[derive(Clone)]
pub struct ContentGenerator {
    chat: Arc<dyn ChatClient>,
    parser: Arc<dyn ResponseParser>,
}

impl ContentGenerator {
    pub fn new(chat: Arc<dyn ChatClient>) -> Self {
        Self::with_parser(chat, Arc::new(MarkdownResponseParser))
    }

    pub fn with_parser(chat: Arc<dyn ChatClient>, parser: Arc<dyn ResponseParser>) -> Self {
        Self { chat, parser }
    }

    pub async fn generate(
        &self,
        input: &PromptInput<'_>,
        template: &SeoTemplate,
    ) -> Result<GeneratedContent> {
        let prompt = build_prompt(input);
        debug!(
            property_id = %input.request.property_id,
            prompt_chars = prompt.len(),
            "Requesting AI content"
        );

        let raw = self
            .chat
            .complete(&prompt)
            .await
            .context("AI content generation failed")?;
        if raw.trim().is_empty() {
            bail!("AI backend returned empty content");
        }

        Ok(self.mine(&raw, input.request, template))
    }

    fn mine(&self, raw: &str, request: &SeoOptimizationRequest, template: &SeoTemplate) -> GeneratedContent {
        let body = self.parser.extract_body(raw);
        let title = self.parser.extract_title(raw).unwrap_or_else(|| {
            template.render_h1(TemplateValues {
                property_type: request.property_type_or_default(),
                location: &request.location,
                title: request.property_type_or_default(),
            })
        });

        GeneratedContent {
            title,
            word_count: word_count(&body),
            headings: self.parser.extract_headings(raw),
            internal_links: self.parser.extract_internal_links(raw),
            call_to_action: self
                .parser
                .extract_call_to_action(raw)
                .unwrap_or_else(|| DEFAULT_CALL_TO_ACTION.to_string()),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seo::templates::TemplateCatalog;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const REPLY: &str = "\
# Modern Condo in Austin
Welcome to this bright condo.
## Features
Open plan living. See [our listings](/listings) and [Austin guide](/guides/austin).
## Neighborhood
Near [external](https://example.com) parks.
CTA: Book a tour today!";

    struct RecordingChat {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatClient for RecordingChat {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn request() -> SeoOptimizationRequest {
        SeoOptimizationRequest {
            property_id: "p1".to_string(),
            content_type: "PROPERTY_LISTING".to_string(),
            original_content: "Nice condo".to_string(),
            location: "Austin".to_string(),
            existing_tags: vec![],
            property_type: Some("Condo".to_string()),
            target_length: None,
        }
    }

    fn keywords(count: usize) -> KeywordResearch {
        KeywordResearch {
            primary_keywords: (0..count).map(|i| format!("kw{}", i)).collect(),
            long_tail_keywords: vec![],
            local_keywords: vec![],
            opportunity_score: 0.5,
        }
    }

    fn competitors() -> CompetitorAnalysis {
        CompetitorAnalysis {
            competitors: vec![],
            average_strength: 0.0,
            keyword_gaps: vec![],
            insights: "Few competitors".to_string(),
        }
    }

    #[test]
    fn test_prompt_limits_keywords_to_ten() {
        let req = request();
        let kw = keywords(15);
        let comp = competitors();
        let prompt = build_prompt(&PromptInput {
            request: &req,
            keywords: &kw,
            competitors: &comp,
            target_length: 500,
        });

        assert!(prompt.contains("Target keywords: kw0, kw1, kw2, kw3, kw4, kw5, kw6, kw7, kw8, kw9\n"));
        assert!(!prompt.contains("kw10"));
        assert!(prompt.contains("Property type: Condo"));
        assert!(prompt.contains("Competitor insights: Few competitors"));
        assert!(prompt.contains("about 500 words"));
    }

    #[test]
    fn test_parser_extracts_fields() {
        let parser = MarkdownResponseParser;
        assert_eq!(parser.extract_title(REPLY).as_deref(), Some("Modern Condo in Austin"));
        assert_eq!(parser.extract_headings(REPLY), vec!["Features", "Neighborhood"]);
        assert_eq!(
            parser.extract_internal_links(REPLY),
            vec![
                InternalLink {
                    anchor: "our listings".to_string(),
                    href: "/listings".to_string()
                },
                InternalLink {
                    anchor: "Austin guide".to_string(),
                    href: "/guides/austin".to_string()
                },
            ]
        );
        assert_eq!(parser.extract_call_to_action(REPLY).as_deref(), Some("Book a tour today!"));

        let body = parser.extract_body(REPLY);
        assert!(body.starts_with("Welcome"));
        assert!(!body.contains("CTA:"));
    }

    #[tokio::test]
    async fn test_generate_falls_back_for_plain_text() {
        let chat = Arc::new(RecordingChat {
            reply: "Just a plain paragraph about the condo.".to_string(),
            prompts: Mutex::new(vec![]),
        });
        let generator = ContentGenerator::new(chat.clone());
        let catalog = TemplateCatalog::standard();
        let req = request();
        let kw = keywords(3);
        let comp = competitors();
        let input = PromptInput {
            request: &req,
            keywords: &kw,
            competitors: &comp,
            target_length: 300,
        };

        let content = generator
            .generate(&input, catalog.select("PROPERTY_LISTING"))
            .await
            .unwrap();
        assert_eq!(content.title, "Condo in Austin");
        assert_eq!(content.call_to_action, DEFAULT_CALL_TO_ACTION);
        assert_eq!(content.word_count, 7);
        assert!(content.headings.is_empty());
        assert_eq!(chat.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_reply() {
        let chat = Arc::new(RecordingChat {
            reply: "   ".to_string(),
            prompts: Mutex::new(vec![]),
        });
        let generator = ContentGenerator::new(chat);
        let req = request();
        let kw = keywords(1);
        let comp = competitors();
        let input = PromptInput {
            request: &req,
            keywords: &kw,
            competitors: &comp,
            target_length: 300,
        };
        let catalog = TemplateCatalog::standard();
        assert!(generator
            .generate(&input, catalog.select("BLOG_POST"))
            .await
            .is_err());
    }
}
