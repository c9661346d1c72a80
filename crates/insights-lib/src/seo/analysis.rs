//! Text heuristics: word and sentence counts, readability, keyword density

use super::model::ContentAnalysis;
use std::collections::HashMap;

/// Number of frequent terms reported by [`analyze_content`]
pub const TOP_TERMS: usize = 5;

const STOP_WORDS: &[&str] = &[
    "about", "after", "also", "been", "being", "both", "from", "have", "here", "into", "just",
    "more", "most", "only", "other", "over", "some", "such", "than", "that", "their", "them",
    "then", "there", "these", "they", "this", "very", "were", "what", "when", "where", "which",
    "while", "will", "with", "your", "would",
];

/// Whitespace tokens trimmed of surrounding punctuation, for term matching
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
}

/// Whitespace-separated tokens, punctuation-only tokens included
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Sentences end with `.`, `!` or `?`; trailing text counts as one more
pub fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .count()
}

/// Vowels stand in for syllables
fn syllable_count(text: &str) -> usize {
    text.chars()
        .filter(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
        .count()
}

/// Flesch reading ease normalized to [0, 1]
///
/// Uses vowel counts as the syllable estimate. Text without words or
/// sentences scores 0.
pub fn readability_score(text: &str) -> f64 {
    let words = word_count(text);
    let sentences = sentence_count(text);
    if words == 0 || sentences == 0 {
        return 0.0;
    }
    let syllables = syllable_count(text);

    let ease = 206.835
        - 1.015 * (words as f64 / sentences as f64)
        - 84.6 * (syllables as f64 / words as f64);
    (ease / 100.0).clamp(0.0, 1.0)
}

/// Share of words covered by keyword occurrences, case-insensitive
pub fn keyword_density<S: AsRef<str>>(text: &str, keywords: &[S]) -> f64 {
    let tokens: Vec<String> = words(text).map(str::to_lowercase).collect();
    if tokens.is_empty() {
        return 0.0;
    }

    let mut covered = 0usize;
    for keyword in keywords {
        let phrase: Vec<String> = words(keyword.as_ref()).map(str::to_lowercase).collect();
        if phrase.is_empty() || phrase.len() > tokens.len() {
            continue;
        }
        let occurrences = tokens
            .windows(phrase.len())
            .filter(|window| *window == phrase.as_slice())
            .count();
        covered += occurrences * phrase.len();
    }

    (covered as f64 / tokens.len() as f64).min(1.0)
}

/// Markdown headings, i.e. lines starting with `#`
pub fn heading_count(text: &str) -> usize {
    text.lines().filter(|l| l.trim_start().starts_with('#')).count()
}

/// Most frequent words of four letters or more, excluding stop words
pub fn top_terms(text: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in words(text) {
        let lower = word.to_lowercase();
        if lower.chars().count() < 4 || STOP_WORDS.contains(&lower.as_str()) {
            continue;
        }
        *counts.entry(lower).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(w, _)| w).collect()
}

pub fn analyze_content<S: AsRef<str>>(text: &str, keywords: &[S]) -> ContentAnalysis {
    ContentAnalysis {
        word_count: word_count(text),
        sentence_count: sentence_count(text),
        readability_score: readability_score(text),
        keyword_density: keyword_density(text, keywords),
        heading_count: heading_count(text),
        top_terms: top_terms(text, TOP_TERMS),
    }
}
