//! Improvement recommendations derived from the score

use super::model::{CompetitorAnalysis, Priority, RecommendationType, SeoRecommendation, SeoScore};

pub const CONTENT_THRESHOLD: f64 = 0.7;
pub const TECHNICAL_THRESHOLD: f64 = 0.8;
pub const LOCAL_THRESHOLD: f64 = 0.7;
/// More gaps than this triggers a keyword recommendation
pub const MAX_KEYWORD_GAPS: usize = 5;

fn recommendation(
    kind: RecommendationType,
    priority: Priority,
    title: &str,
    description: String,
    action: &str,
) -> SeoRecommendation {
    SeoRecommendation {
        kind,
        priority,
        title: title.to_string(),
        description,
        action: action.to_string(),
    }
}

pub fn generate_recommendations(
    score: &SeoScore,
    competitors: &CompetitorAnalysis,
) -> Vec<SeoRecommendation> {
    let mut recommendations = Vec::new();

    if score.content < CONTENT_THRESHOLD {
        recommendations.push(recommendation(
            RecommendationType::Content,
            Priority::High,
            "Improve content quality",
            format!("Content score {:.2} is below {:.1}", score.content, CONTENT_THRESHOLD),
            "Expand the copy to at least 300 words, keep keyword density between 1% and 3% and shorten long sentences",
        ));
    }

    if score.technical < TECHNICAL_THRESHOLD {
        recommendations.push(recommendation(
            RecommendationType::Technical,
            Priority::Medium,
            "Strengthen page structure",
            format!("Technical score {:.2} is below {:.1}", score.technical, TECHNICAL_THRESHOLD),
            "Add at least three section headings and two internal links to related pages",
        ));
    }

    if score.local < LOCAL_THRESHOLD {
        recommendations.push(recommendation(
            RecommendationType::LocalSeo,
            Priority::Medium,
            "Target local search",
            format!("Local score {:.2} is below {:.1}", score.local, LOCAL_THRESHOLD),
            "Include the city or neighborhood name in keywords, headings and the page title",
        ));
    }

    if competitors.keyword_gaps.len() > MAX_KEYWORD_GAPS {
        let sample = competitors
            .keyword_gaps
            .iter()
            .take(MAX_KEYWORD_GAPS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        recommendations.push(recommendation(
            RecommendationType::Keywords,
            Priority::High,
            "Close keyword gaps",
            format!(
                "Competitors rank for {} keywords missing here, e.g. {}",
                competitors.keyword_gaps.len(),
                sample
            ),
            "Work the missing competitor keywords into new sections or supporting pages",
        ));
    }

    recommendations
}
