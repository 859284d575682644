//! Deterministic classification engine for business descriptions.
//!
//! Maps raw text to a category, communication mode and archetype, scores it on
//! three 0-100 axes, and assembles a narrative bundle from the matched tables.
//! Same input always yields the same report; nothing here can fail.

use serde::Serialize;
use std::sync::Arc;

use crate::features::{FeatureSet, extract_features};
use crate::taxonomy::{ArchetypeProfile, CategoryProfile, CommunicationMode, Taxonomy};

/// Keywords weighting toward business buyers
pub const BUSINESS_KEYWORDS: &[&str] = &[
    "b2b",
    "enterprise",
    "companies",
    "business",
    "clients",
    "corporate",
    "saas",
    "wholesale",
    "procurement",
    "teams",
    "industrial",
    "firms",
];

/// Keywords weighting toward individual consumers
pub const CONSUMER_KEYWORDS: &[&str] = &[
    "b2c",
    "consumers",
    "customers",
    "families",
    "people",
    "shoppers",
    "lifestyle",
    "home",
    "personal",
    "kids",
    "fans",
    "community",
];

/// Added to the consumer weight when the matched category is consumer-facing
pub const CONSUMER_CATEGORY_BONUS: usize = 2;

/// Category hit count above which match strength reads as "high"
const HIGH_MATCH_THRESHOLD: usize = 2;
const SHORT_DESCRIPTION_WORDS: usize = 50;
const MIN_TIPS: usize = 3;
const ABBREVIATIONS: &[&str] = &[
    "inc", "ltd", "llc", "co", "corp", "dr", "mr", "mrs", "ms", "st", "vs", "etc", "e.g", "i.e",
];
const OFFER_MAX_CHARS: usize = 240;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub category: CategoryProfile,
    pub category_hits: usize,
    /// True when no category keyword matched and the default profile was used
    pub used_default_category: bool,
    pub mode: CommunicationMode,
    pub business_weight: usize,
    pub consumer_weight: usize,
    pub archetype: ArchetypeProfile,
    pub archetype_hits: usize,
}

impl Classification {
    pub fn match_strength(&self) -> &'static str {
        if self.category_hits > HIGH_MATCH_THRESHOLD {
            "high"
        } else {
            "moderate"
        }
    }
}

/// Three independent 0-100 scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scores {
    pub clarity: u8,
    pub precision: u8,
    pub differentiation: u8,
}

impl Scores {
    /// Arithmetic mean of the given scores, unrounded
    pub fn mean(values: &[u8]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandIdentity {
    pub name: String,
    pub tagline: String,
    pub archetype: String,
    pub voice: String,
    pub shadow: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub heading_font: String,
    pub body_font: String,
    pub channels: Vec<String>,
    pub content_pillars: Vec<String>,
}

/// Four-part strategic profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategicProfile {
    pub identity: String,
    pub offer: String,
    pub audience: String,
    pub execution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tip {
    pub title: String,
    pub detail: String,
}

/// Copy fragments used to pre-fill downstream tools
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prefill {
    pub product_pitch: String,
    pub prospect_opener: String,
    pub positioning_statement: String,
    pub content_hook: String,
}

/// Generic output of the heuristic path, consumed by the fallback mappers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeuristicReport {
    pub name: String,
    pub classification: Classification,
    pub features: FeatureSet,
    pub scores: Scores,
    pub rationale: String,
    pub brand: BrandIdentity,
    pub profile: StrategicProfile,
    /// Prioritized, three or four entries
    pub tips: Vec<Tip>,
    pub prefill: Prefill,
}

pub struct HeuristicEngine {
    taxonomy: Arc<Taxonomy>,
}

impl HeuristicEngine {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Run every stage over `description` plus any auxiliary free text
    pub fn analyze(&self, name: &str, description: &str, auxiliary: &[&str]) -> HeuristicReport {
        let corpus = std::iter::once(description)
            .chain(auxiliary.iter().copied())
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let features = extract_features(&corpus, &self.taxonomy);
        let classification = self.classify(&features);
        let scores = compute_scores(&features);
        let rationale = synthesize_rationale(&classification);

        let display_name = if name.trim().is_empty() {
            "This business".to_string()
        } else {
            name.trim().to_string()
        };
        let offer = first_sentence(description);

        let brand = build_brand(&display_name, &classification);
        let profile = build_profile(&display_name, &offer, &classification);
        let tips = select_tips(&features, &classification);
        let prefill = build_prefill(&display_name, &offer, &features, &classification);

        tracing::debug!(
            category = classification.category.key,
            archetype = classification.archetype.name,
            mode = classification.mode.as_str(),
            clarity = scores.clarity,
            "heuristic classification complete"
        );

        HeuristicReport {
            name: display_name,
            classification,
            features,
            scores,
            rationale,
            brand,
            profile,
            tips,
            prefill,
        }
    }

    /// Category, mode and archetype selection over extracted features
    pub fn classify(&self, features: &FeatureSet) -> Classification {
        let (category, category_hits, used_default_category) = self.select_category(features);

        let business_weight = features.hits(BUSINESS_KEYWORDS);
        let mut consumer_weight = features.hits(CONSUMER_KEYWORDS);
        if category.mode == CommunicationMode::BusinessToConsumer {
            consumer_weight += CONSUMER_CATEGORY_BONUS;
        }
        let mode = if business_weight >= consumer_weight {
            CommunicationMode::BusinessToBusiness
        } else {
            CommunicationMode::BusinessToConsumer
        };

        let (archetype, archetype_hits) = self.select_archetype(features);

        Classification {
            category: category.clone(),
            category_hits,
            used_default_category,
            mode,
            business_weight,
            consumer_weight,
            archetype: archetype.clone(),
            archetype_hits,
        }
    }

    fn select_category(&self, features: &FeatureSet) -> (&CategoryProfile, usize, bool) {
        let mut best: Option<(usize, usize)> = None;
        for (idx, hits) in features.category_hits.iter().enumerate() {
            // Strict comparison keeps the first-declared entry on ties
            if *hits > best.map_or(0, |(_, h)| h) {
                best = Some((idx, *hits));
            }
        }
        match best {
            Some((idx, hits)) => (&self.taxonomy.categories()[idx], hits, false),
            None => (self.taxonomy.default_category(), 0, true),
        }
    }

    fn select_archetype(&self, features: &FeatureSet) -> (&ArchetypeProfile, usize) {
        let archetypes = self.taxonomy.archetypes();
        let mut best_idx = 0;
        let mut best_hits: i64 = -1;
        for (idx, hits) in features.archetype_hits.iter().enumerate() {
            if (*hits as i64) > best_hits {
                best_hits = *hits as i64;
                best_idx = idx;
            }
        }
        (&archetypes[best_idx], best_hits.max(0) as usize)
    }
}

/// Clarity and precision measure whitespace tokens; differentiation measures
/// characters, since its threshold is about overall text length.
pub fn compute_scores(features: &FeatureSet) -> Scores {
    let words = features.word_count as f64;

    let clarity = 30.0 * (words / 50.0)
        + if features.has_audience_marker { 40.0 } else { 10.0 }
        + if features.has_unique_value_marker { 30.0 } else { 10.0 };

    let precision = (if features.has_numbers { 50.0 } else { 20.0 })
        + if features.word_count > 100 { 50.0 } else { 30.0 };

    let differentiation = (if features.has_unique_value_marker { 60.0 } else { 20.0 })
        + if features.char_count > 500 { 40.0 } else { 20.0 };

    Scores {
        clarity: clamp_score(clarity),
        precision: clamp_score(precision),
        differentiation: clamp_score(differentiation),
    }
}

fn clamp_score(raw: f64) -> u8 {
    raw.round().clamp(0.0, 100.0) as u8
}

fn synthesize_rationale(c: &Classification) -> String {
    format!(
        "Classified as {} with {} keyword match strength; the {} archetype in {} mode calls for an {} emphasis.",
        c.category.name,
        c.match_strength(),
        c.archetype.name,
        c.mode.as_str(),
        c.mode.emphasis()
    )
}

/// First sentence of the description, capped for use in copy
fn first_sentence(description: &str) -> String {
    let trimmed = description.trim();
    let mut chars = trimmed.char_indices().peekable();
    let mut end = trimmed.len();
    while let Some((i, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        // "3.5x" and "Acme Inc. builds" do not end a sentence
        let boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        let word = trimmed[..i]
            .split_whitespace()
            .last()
            .unwrap_or("")
            .to_lowercase();
        if boundary && !(ch == '.' && ABBREVIATIONS.contains(&word.as_str())) {
            end = i + ch.len_utf8();
            break;
        }
    }
    let sentence: String = trimmed[..end].chars().take(OFFER_MAX_CHARS).collect();
    sentence.trim().to_string()
}

fn split_pillars(pillars: &str) -> Vec<String> {
    pillars
        .split(',')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| {
            let mut chars = p.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

fn build_brand(name: &str, c: &Classification) -> BrandIdentity {
    BrandIdentity {
        name: name.to_string(),
        tagline: format!("{}: {}", name, c.archetype.motto),
        archetype: c.archetype.name.to_string(),
        voice: c.archetype.voice.to_string(),
        shadow: c.archetype.shadow.to_string(),
        primary_color: c.category.visual.primary_color.to_string(),
        secondary_color: c.category.visual.secondary_color.to_string(),
        heading_font: c.category.visual.heading_font.to_string(),
        body_font: c.category.visual.body_font.to_string(),
        channels: c.category.channels.iter().map(|s| s.to_string()).collect(),
        content_pillars: split_pillars(c.category.content_pillars),
    }
}

fn audience_phrase(c: &Classification) -> String {
    match c.mode {
        CommunicationMode::BusinessToBusiness => format!(
            "decision-makers at organisations buying {}",
            c.category.name.to_lowercase()
        ),
        CommunicationMode::BusinessToConsumer => format!(
            "{} customers choosing {}",
            c.category.scale.as_str(),
            c.category.name.to_lowercase()
        ),
    }
}

fn build_profile(name: &str, offer: &str, c: &Classification) -> StrategicProfile {
    let channels = c.category.channels.iter().take(2).copied().collect::<Vec<_>>();
    StrategicProfile {
        identity: format!(
            "{} is a {} {} brand with the voice of {}: {}.",
            name,
            c.category.scale.as_str(),
            c.category.name,
            c.archetype.name,
            c.archetype.voice.to_lowercase()
        ),
        offer: if offer.is_empty() {
            "Offer not yet described.".to_string()
        } else {
            offer.to_string()
        },
        audience: format!(
            "{} ({}), reached first through {}.",
            capitalize(&audience_phrase(c)),
            c.mode.short_label(),
            channels.join(" and ")
        ),
        execution: format!(
            "Lead with {} and build on {}. {}",
            c.category.content_pillars.to_lowercase(),
            c.mode.emphasis(),
            c.archetype.strategic_note
        ),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn select_tips(features: &FeatureSet, c: &Classification) -> Vec<Tip> {
    let mut tips = Vec::new();

    if !features.has_audience_marker {
        tips.push(Tip {
            title: "Name your audience".to_string(),
            detail: "Say explicitly who the offer is for so every message can speak to them."
                .to_string(),
        });
    }
    if !features.has_unique_value_marker {
        tips.push(Tip {
            title: "State your difference".to_string(),
            detail: "Add one claim only you can make: a method, guarantee or result competitors lack."
                .to_string(),
        });
    }
    if !features.has_numbers {
        tips.push(Tip {
            title: "Add proof points".to_string(),
            detail: "Quote concrete figures such as customers served, years active or measured outcomes."
                .to_string(),
        });
    }
    if features.word_count < SHORT_DESCRIPTION_WORDS {
        tips.push(Tip {
            title: "Expand the description".to_string(),
            detail: format!(
                "Describe the offer in at least {} words covering problem, solution and result.",
                SHORT_DESCRIPTION_WORDS
            ),
        });
    }

    tips.push(match c.mode {
        CommunicationMode::BusinessToBusiness => Tip {
            title: "Lead with authority".to_string(),
            detail: "Publish case studies and client outcomes on LinkedIn before outbound contact."
                .to_string(),
        },
        CommunicationMode::BusinessToConsumer => Tip {
            title: "Build community".to_string(),
            detail: format!(
                "Invite customers to share their story on {} and feature them.",
                c.category.channels.first().copied().unwrap_or("social media")
            ),
        },
    });
    tips.push(Tip {
        title: format!("Play to {}", c.archetype.name),
        detail: c.archetype.strategic_note.to_string(),
    });

    if tips.len() < MIN_TIPS {
        let pillar = split_pillars(c.category.content_pillars)
            .into_iter()
            .next()
            .unwrap_or_else(|| "Customer stories".to_string());
        tips.push(Tip {
            title: format!("Own the {} pillar", pillar.to_lowercase()),
            detail: format!(
                "Publish a recurring series on {} so the strongest part of the offer stays visible.",
                pillar.to_lowercase()
            ),
        });
    }

    tips.truncate(4);
    tips
}

fn build_prefill(name: &str, offer: &str, features: &FeatureSet, c: &Classification) -> Prefill {
    let offer_text = if offer.is_empty() {
        format!("a {} offer", c.category.name.to_lowercase())
    } else {
        offer.trim_end_matches(['.', '!', '?']).to_string()
    };
    let differentiator = if features.has_unique_value_marker {
        "makes a claim competitors cannot match"
    } else {
        "delivers dependable results"
    };

    Prefill {
        product_pitch: format!("{}: {}.", name, offer_text),
        prospect_opener: match c.mode {
            CommunicationMode::BusinessToBusiness => format!(
                "Teams evaluating {} use {} to cut risk and prove results.",
                c.category.name.to_lowercase(),
                name
            ),
            CommunicationMode::BusinessToConsumer => format!(
                "If you have been looking for {}, {} was made for you.",
                c.category.name.to_lowercase(),
                name
            ),
        },
        positioning_statement: format!(
            "For {}, {} is the {} that {}.",
            audience_phrase(c),
            name,
            c.category.name.to_lowercase(),
            differentiator
        ),
        content_hook: format!("{}. {}", c.archetype.motto, c.archetype.strategic_note),
    }
}
