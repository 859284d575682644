//! Lexical feature extraction over free business text.
//!
//! Pure functions of the input text and the taxonomy tables. Keyword hits use
//! substring matching on purpose so plurals and compounds still count; marker
//! words match on token boundaries.

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::taxonomy::Taxonomy;

/// Differentiation words signalling a unique value claim
pub const UNIQUE_VALUE_MARKERS: &[&str] = &[
    "only",
    "unique",
    "first",
    "exclusive",
    "proprietary",
    "unlike",
    "better",
    "best",
];

/// Audience-framing words and phrases
pub const AUDIENCE_MARKERS: &[&str] = &["for", "targeting", "helping", "dedicated to", "built for"];

/// Signals derived from one text; lives for a single analysis call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSet {
    pub word_count: usize,
    pub char_count: usize,
    pub has_numbers: bool,
    pub has_unique_value_marker: bool,
    pub has_audience_marker: bool,
    /// Aligned with `Taxonomy::categories()`
    pub category_hits: Vec<usize>,
    /// Aligned with `Taxonomy::archetypes()`
    pub archetype_hits: Vec<usize>,
    #[serde(skip)]
    normalized: String,
}

impl FeatureSet {
    /// NFKC-normalized, lower-cased text the features were computed from
    pub fn normalized_text(&self) -> &str {
        &self.normalized
    }

    /// Substring hit count for an arbitrary vocabulary against the same text
    pub fn hits(&self, keywords: &[&str]) -> usize {
        keyword_hits(&self.normalized, keywords)
    }
}

/// Lower-case and NFKC-normalize text before matching
pub fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

/// Number of keywords occurring as substrings of already-normalized text
pub fn keyword_hits(normalized: &str, keywords: &[&str]) -> usize {
    keywords
        .iter()
        .filter(|k| !k.is_empty() && normalized.contains(*k))
        .count()
}

fn tokens(normalized: &str) -> Vec<&str> {
    normalized
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .collect()
}

/// Whether any marker (single word or phrase) appears on token boundaries
pub fn contains_marker(text_tokens: &[&str], markers: &[&str]) -> bool {
    markers.iter().any(|marker| {
        let parts: Vec<&str> = marker.split_whitespace().collect();
        !parts.is_empty()
            && text_tokens
                .windows(parts.len())
                .any(|window| window == parts.as_slice())
    })
}

/// Derive the full feature set for `text`
pub fn extract_features(text: &str, taxonomy: &Taxonomy) -> FeatureSet {
    let trimmed = text.trim();
    let normalized = normalize(trimmed);
    let text_tokens = tokens(&normalized);

    let category_hits = taxonomy
        .categories()
        .iter()
        .map(|c| keyword_hits(&normalized, c.keywords))
        .collect();
    let archetype_hits = taxonomy
        .archetypes()
        .iter()
        .map(|a| keyword_hits(&normalized, a.keywords))
        .collect();

    FeatureSet {
        word_count: trimmed.split_whitespace().count(),
        char_count: trimmed.chars().count(),
        has_numbers: normalized.chars().any(|c| c.is_ascii_digit()),
        has_unique_value_marker: contains_marker(&text_tokens, UNIQUE_VALUE_MARKERS),
        has_audience_marker: contains_marker(&text_tokens, AUDIENCE_MARKERS),
        category_hits,
        archetype_hits,
        normalized,
    }
}
