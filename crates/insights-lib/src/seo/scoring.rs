//! Heuristic SEO scoring

use super::model::{EstimatedImpact, SeoScore};

/// Component weights: content, technical, authority, local
pub const WEIGHTS: [f64; 4] = [0.4, 0.3, 0.2, 0.1];

/// Overall score below this needs improvement
pub const IMPROVEMENT_THRESHOLD: f64 = 0.8;

pub const MIN_WORD_COUNT: usize = 300;
pub const KEYWORD_DENSITY_RANGE: (f64, f64) = (0.01, 0.03);
pub const MIN_HEADINGS: usize = 3;
pub const MIN_INTERNAL_LINKS: usize = 2;

/// Measurements feeding the score
#[derive(Debug, Clone)]
pub struct ScoreInputs<'a> {
    pub word_count: usize,
    pub keyword_density: f64,
    pub readability: f64,
    pub heading_count: usize,
    pub internal_link_count: usize,
    pub keyword_opportunity: f64,
    /// Mean competitor strength, 0-100
    pub competitor_strength: f64,
    pub keywords: Vec<&'a str>,
    pub location: &'a str,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn content_score(word_count: usize, keyword_density: f64, readability: f64) -> f64 {
    let length = if word_count >= MIN_WORD_COUNT { 0.8 } else { 0.6 };
    let (low, high) = KEYWORD_DENSITY_RANGE;
    let density = if (low..=high).contains(&keyword_density) { 0.9 } else { 0.7 };
    mean(&[length, density, readability])
}

pub fn technical_score(heading_count: usize, internal_link_count: usize) -> f64 {
    let headings = if heading_count >= MIN_HEADINGS { 0.9 } else { 0.6 };
    let links = if internal_link_count >= MIN_INTERNAL_LINKS { 0.8 } else { 0.5 };
    mean(&[headings, links])
}

pub fn authority_score(keyword_opportunity: f64, competitor_strength: f64) -> f64 {
    let competition = 1.0 - (competitor_strength / 100.0).clamp(0.0, 1.0);
    mean(&[keyword_opportunity.clamp(0.0, 1.0), competition])
}

pub fn local_score<S: AsRef<str>>(keywords: &[S], location: &str) -> f64 {
    let location = location.trim().to_lowercase();
    let matched = !location.is_empty()
        && keywords
            .iter()
            .any(|k| k.as_ref().to_lowercase().contains(&location));
    if matched {
        0.9
    } else {
        0.6
    }
}

pub fn grade(overall: f64) -> &'static str {
    if overall >= 0.9 {
        "A+"
    } else if overall >= 0.8 {
        "A"
    } else if overall >= 0.7 {
        "B"
    } else if overall >= 0.6 {
        "C"
    } else {
        "D"
    }
}

pub fn estimated_impact(overall: f64) -> EstimatedImpact {
    if overall >= 0.9 {
        EstimatedImpact::High
    } else if overall >= 0.7 {
        EstimatedImpact::Medium
    } else {
        EstimatedImpact::Low
    }
}

impl SeoScore {
    /// Weighted combination of the four component scores
    ///
    /// The sum is rounded to nine decimals so grade boundaries are not lost
    /// to float drift.
    pub fn from_components(content: f64, technical: f64, authority: f64, local: f64) -> Self {
        let weighted = WEIGHTS[0] * content
            + WEIGHTS[1] * technical
            + WEIGHTS[2] * authority
            + WEIGHTS[3] * local;
        let overall = (weighted * 1e9).round() / 1e9;
        Self {
            content,
            technical,
            authority,
            local,
            overall,
            grade: grade(overall).to_string(),
            improvement_needed: overall < IMPROVEMENT_THRESHOLD,
        }
    }
}

pub fn compute_score(inputs: &ScoreInputs<'_>) -> SeoScore {
    SeoScore::from_components(
        content_score(inputs.word_count, inputs.keyword_density, inputs.readability),
        technical_score(inputs.heading_count, inputs.internal_link_count),
        authority_score(inputs.keyword_opportunity, inputs.competitor_strength),
        local_score(&inputs.keywords, inputs.location),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_score_extremes() {
        let top = SeoScore::from_components(1.0, 1.0, 1.0, 1.0);
        assert_eq!(top.overall, 1.0);
        assert_eq!(top.grade, "A+");
        assert!(!top.improvement_needed);

        let bottom = SeoScore::from_components(0.0, 0.0, 0.0, 0.0);
        assert_eq!(bottom.overall, 0.0);
        assert_eq!(bottom.grade, "D");
        assert!(bottom.improvement_needed);
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(grade(0.9), "A+");
        assert_eq!(grade(0.85), "A");
        assert_eq!(grade(0.7), "B");
        assert_eq!(grade(0.65), "C");
        assert_eq!(grade(0.59), "D");
    }

    #[test]
    fn test_uniform_components_land_on_boundaries() {
        let a_plus = SeoScore::from_components(0.9, 0.9, 0.9, 0.9);
        assert_eq!(a_plus.overall, 0.9);
        assert_eq!(a_plus.grade, "A+");
        assert_eq!(estimated_impact(a_plus.overall), EstimatedImpact::High);

        let a = SeoScore::from_components(0.8, 0.8, 0.8, 0.8);
        assert_eq!(a.overall, 0.8);
        assert_eq!(a.grade, "A");
        assert!(!a.improvement_needed);

        let b = SeoScore::from_components(0.7, 0.7, 0.7, 0.7);
        assert_eq!(b.overall, 0.7);
        assert_eq!(b.grade, "B");
        assert_eq!(estimated_impact(b.overall), EstimatedImpact::Medium);
    }

    #[test]
    fn test_estimated_impact_labels() {
        assert_eq!(estimated_impact(0.95), EstimatedImpact::High);
        assert_eq!(estimated_impact(0.75), EstimatedImpact::Medium);
        assert_eq!(estimated_impact(0.5), EstimatedImpact::Low);
    }

    #[test]
    fn test_component_scores() {
        assert!(approx(content_score(300, 0.02, 1.0), (0.8 + 0.9 + 1.0) / 3.0));
        assert!(approx(content_score(50, 0.2, 0.0), (0.6 + 0.7) / 3.0));
        assert!(approx(technical_score(3, 2), 0.85));
        assert!(approx(technical_score(0, 1), 0.55));
        assert!(approx(authority_score(0.6, 80.0), 0.4));
        assert_eq!(local_score(&["Homes in AUSTIN"], "austin"), 0.9);
        assert_eq!(local_score(&["homes"], "austin"), 0.6);
        assert_eq!(local_score(&["homes"], ""), 0.6);
    }

    #[test]
    fn test_compute_score_weights() {
        let score = compute_score(&ScoreInputs {
            word_count: 400,
            keyword_density: 0.02,
            readability: 0.7,
            heading_count: 4,
            internal_link_count: 3,
            keyword_opportunity: 0.8,
            competitor_strength: 40.0,
            keywords: vec!["austin condo"],
            location: "Austin",
        });

        assert!(approx(score.content, 0.8));
        assert!(approx(score.technical, 0.85));
        assert!(approx(score.authority, 0.7));
        assert_eq!(score.local, 0.9);
        assert!(approx(score.overall, 0.805));
        assert_eq!(score.grade, "A");
        assert!(!score.improvement_needed);
    }
}
