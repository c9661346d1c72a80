//! Content-SEO facade
//!
//! Turns raw listing or blog copy into search-optimized content: keyword
//! research, competitor gaps, AI rewriting, meta tags, schema.org data and
//! a heuristic score. Collaborators sit behind traits so each stage can be
//! swapped independently.

pub mod analysis;
pub mod analytics;
pub mod competitors;
mod error;
pub mod generation;
pub mod keywords;
pub mod meta;
pub mod model;
pub mod recommendations;
pub mod scoring;
mod service;
pub mod structured_data;
pub mod technical;
pub mod templates;
pub mod validation;

pub use analytics::{AnalyticsSink, OptimizationEvent, TracingAnalyticsSink};
pub use competitors::{BaselineCompetitorAnalyzer, CompetitorAnalyzer, CompetitorProfile};
pub use error::SeoError;
pub use generation::{ContentGenerator, MarkdownResponseParser, ResponseParser};
pub use keywords::{KeywordResearcher, TemplateKeywordResearcher};
pub use model::*;
pub use service::{SeoConfig, SeoOptimizationService, SeoServiceBuilder};
pub use templates::{SeoTemplate, TemplateCatalog};
pub use validation::{BasicContentValidator, ContentValidator};
