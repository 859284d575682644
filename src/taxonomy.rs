//! Reference tables mapping keyword sets to business categories and brand archetypes.
//!
//! Tables are built once and shared read-only behind an `Arc`. Declaration order
//! is significant: keyword ties resolve to the entry declared first.

use serde::Serialize;

use crate::error::{MarketMindError, Result};

/// Business-to-business vs. business-to-consumer framing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationMode {
    BusinessToBusiness,
    BusinessToConsumer,
}

impl CommunicationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommunicationMode::BusinessToBusiness => "business-to-business",
            CommunicationMode::BusinessToConsumer => "business-to-consumer",
        }
    }

    pub fn short_label(&self) -> &'static str {
        match self {
            CommunicationMode::BusinessToBusiness => "B2B",
            CommunicationMode::BusinessToConsumer => "B2C",
        }
    }

    /// Strategic emphasis named in rationales
    pub fn emphasis(&self) -> &'static str {
        match self {
            CommunicationMode::BusinessToBusiness => "Authority & Trust",
            CommunicationMode::BusinessToConsumer => "Emotion & Community",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleTier {
    Local,
    Regional,
    National,
    Global,
}

impl ScaleTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleTier::Local => "local",
            ScaleTier::Regional => "regional",
            ScaleTier::National => "national",
            ScaleTier::Global => "global",
        }
    }
}

/// Default visual attributes: two color tokens, two typography tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualDefaults {
    pub primary_color: &'static str,
    pub secondary_color: &'static str,
    pub heading_font: &'static str,
    pub body_font: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryProfile {
    pub key: &'static str,
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub mode: CommunicationMode,
    pub scale: ScaleTier,
    pub visual: VisualDefaults,
    pub channels: &'static [&'static str],
    pub content_pillars: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchetypeProfile {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub voice: &'static str,
    pub shadow: &'static str,
    pub strategic_note: &'static str,
    /// Tagline stem used when drafting brand copy
    pub motto: &'static str,
}

/// Immutable reference object injected into the heuristic engine
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<CategoryProfile>,
    archetypes: Vec<ArchetypeProfile>,
    default_category: usize,
}

impl Taxonomy {
    /// Build a taxonomy; `default_key` names the category used when nothing matches.
    pub fn new(
        categories: Vec<CategoryProfile>,
        archetypes: Vec<ArchetypeProfile>,
        default_key: &str,
    ) -> Result<Self> {
        let default_category = categories
            .iter()
            .position(|c| c.key == default_key)
            .ok_or_else(|| MarketMindError::Config {
                message: format!("default category '{}' is not in the table", default_key),
            })?;
        if archetypes.is_empty() {
            return Err(MarketMindError::Config {
                message: "archetype table must not be empty".to_string(),
            });
        }
        Ok(Self {
            categories,
            archetypes,
            default_category,
        })
    }

    /// The built-in tables
    pub fn standard() -> Self {
        let categories = standard_categories();
        let default_category = categories
            .iter()
            .position(|c| c.key == DEFAULT_CATEGORY_KEY)
            .unwrap_or(categories.len() - 1);
        Self {
            categories,
            archetypes: standard_archetypes(),
            default_category,
        }
    }

    pub fn categories(&self) -> &[CategoryProfile] {
        &self.categories
    }

    pub fn archetypes(&self) -> &[ArchetypeProfile] {
        &self.archetypes
    }

    pub fn default_category(&self) -> &CategoryProfile {
        &self.categories[self.default_category]
    }

    pub fn category(&self, key: &str) -> Option<&CategoryProfile> {
        self.categories.iter().find(|c| c.key == key)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

pub const DEFAULT_CATEGORY_KEY: &str = "direct_to_consumer";

fn standard_categories() -> Vec<CategoryProfile> {
    vec![
        CategoryProfile {
            key: "saas",
            name: "B2B Software & SaaS",
            keywords: &[
                "software", "saas", "platform", "api", "cloud", "automation", "dashboard",
                "integration", "analytics", "crm", "erp",
            ],
            mode: CommunicationMode::BusinessToBusiness,
            scale: ScaleTier::National,
            visual: VisualDefaults {
                primary_color: "#1E3A8A",
                secondary_color: "#38BDF8",
                heading_font: "Inter",
                body_font: "IBM Plex Sans",
            },
            channels: &["LinkedIn", "Webinars", "Product-led trials", "Technical blog"],
            content_pillars: "Use-case walkthroughs, ROI proof, integration guides",
        },
        CategoryProfile {
            key: "professional_services",
            name: "Professional Services",
            keywords: &[
                "law", "legal", "attorney", "lawyer", "accounting", "accountant", "tax",
                "consulting", "consultant", "advisory", "audit",
            ],
            mode: CommunicationMode::BusinessToBusiness,
            scale: ScaleTier::Regional,
            visual: VisualDefaults {
                primary_color: "#0F172A",
                secondary_color: "#B8860B",
                heading_font: "Playfair Display",
                body_font: "Source Sans Pro",
            },
            channels: &["LinkedIn", "Referrals", "Industry events", "Newsletter"],
            content_pillars: "Expert commentary, regulatory updates, client outcomes",
        },
        CategoryProfile {
            key: "industrial",
            name: "Industrial & Manufacturing",
            keywords: &[
                "manufactur", "factory", "industrial", "machinery", "equipment", "logistics",
                "supply chain", "wholesale", "distribution", "component",
            ],
            mode: CommunicationMode::BusinessToBusiness,
            scale: ScaleTier::National,
            visual: VisualDefaults {
                primary_color: "#374151",
                secondary_color: "#F59E0B",
                heading_font: "Roboto Condensed",
                body_font: "Roboto",
            },
            channels: &["Trade shows", "LinkedIn", "Sales catalogs", "Account management"],
            content_pillars: "Specifications, reliability records, delivery capacity",
        },
        CategoryProfile {
            key: "healthcare",
            name: "Health & Care Clinics",
            keywords: &[
                "clinic", "health", "medical", "dental", "dentist", "therapy", "patient",
                "doctor", "physio", "care",
            ],
            mode: CommunicationMode::BusinessToConsumer,
            scale: ScaleTier::Local,
            visual: VisualDefaults {
                primary_color: "#0E7490",
                secondary_color: "#A7F3D0",
                heading_font: "Nunito",
                body_font: "Open Sans",
            },
            channels: &["Google Business Profile", "Instagram", "WhatsApp", "Local search"],
            content_pillars: "Prevention tips, patient stories, practitioner credentials",
        },
        CategoryProfile {
            key: "food_beverage",
            name: "Food & Beverage",
            keywords: &[
                "restaurant", "cafe", "coffee", "bakery", "food", "kitchen", "menu", "bar",
                "catering", "brew", "pizza",
            ],
            mode: CommunicationMode::BusinessToConsumer,
            scale: ScaleTier::Local,
            visual: VisualDefaults {
                primary_color: "#9A3412",
                secondary_color: "#FDE68A",
                heading_font: "Lobster",
                body_font: "Lato",
            },
            channels: &["Instagram", "TikTok", "Delivery apps", "Google Maps"],
            content_pillars: "Behind the counter, seasonal menus, regulars' moments",
        },
        CategoryProfile {
            key: "education",
            name: "Education & Training",
            keywords: &[
                "course", "school", "training", "teach", "learn", "tutor", "education",
                "class", "mentor", "bootcamp",
            ],
            mode: CommunicationMode::BusinessToConsumer,
            scale: ScaleTier::Regional,
            visual: VisualDefaults {
                primary_color: "#4338CA",
                secondary_color: "#FBBF24",
                heading_font: "Poppins",
                body_font: "Merriweather Sans",
            },
            channels: &["YouTube", "Instagram", "Email sequences", "Webinars"],
            content_pillars: "Free lessons, student transformations, method explainers",
        },
        CategoryProfile {
            key: "beauty_wellness",
            name: "Beauty & Wellness",
            keywords: &[
                "beauty", "salon", "spa", "skin", "cosmetic", "hair", "nail", "wellness",
                "yoga", "fitness", "gym",
            ],
            mode: CommunicationMode::BusinessToConsumer,
            scale: ScaleTier::Local,
            visual: VisualDefaults {
                primary_color: "#BE185D",
                secondary_color: "#FCE7F3",
                heading_font: "Cormorant Garamond",
                body_font: "Montserrat",
            },
            channels: &["Instagram", "TikTok", "Booking apps", "Influencer partnerships"],
            content_pillars: "Before and after, self-care rituals, expert routines",
        },
        CategoryProfile {
            key: "retail_ecommerce",
            name: "Retail & E-commerce",
            keywords: &[
                "shop", "store", "ecommerce", "e-commerce", "retail", "boutique", "apparel",
                "clothing", "fashion", "marketplace",
            ],
            mode: CommunicationMode::BusinessToConsumer,
            scale: ScaleTier::National,
            visual: VisualDefaults {
                primary_color: "#111827",
                secondary_color: "#F472B6",
                heading_font: "Futura",
                body_font: "Helvetica Neue",
            },
            channels: &["Instagram Shopping", "Paid social", "Email", "Marketplaces"],
            content_pillars: "Product drops, styling guides, customer reviews",
        },
        CategoryProfile {
            key: "consumer_app",
            name: "Consumer App",
            keywords: &[
                "app", "mobile", "ios", "android", "download", "subscription", "game",
                "social network", "users",
            ],
            mode: CommunicationMode::BusinessToConsumer,
            scale: ScaleTier::Global,
            visual: VisualDefaults {
                primary_color: "#7C3AED",
                secondary_color: "#22D3EE",
                heading_font: "SF Pro Display",
                body_font: "Inter",
            },
            channels: &["App stores", "TikTok", "Creator partnerships", "Referral loops"],
            content_pillars: "Feature reveals, user-generated content, streaks and milestones",
        },
        CategoryProfile {
            key: DEFAULT_CATEGORY_KEY,
            name: "Direct-to-Consumer Brand",
            keywords: &[],
            mode: CommunicationMode::BusinessToConsumer,
            scale: ScaleTier::Regional,
            visual: VisualDefaults {
                primary_color: "#2563EB",
                secondary_color: "#F97316",
                heading_font: "Montserrat",
                body_font: "Open Sans",
            },
            channels: &["Instagram", "Email", "Website", "Word of mouth"],
            content_pillars: "Founder story, product value, customer proof",
        },
    ]
}

fn standard_archetypes() -> Vec<ArchetypeProfile> {
    vec![
        ArchetypeProfile {
            name: "The Sage",
            keywords: &[
                "expert", "knowledge", "research", "insight", "data", "truth", "analysis",
                "science", "education", "advice",
            ],
            voice: "Measured, evidence-led and quietly confident",
            shadow: "Can read as cold or condescending when it lectures",
            strategic_note: "Publish proof of expertise before asking for the sale.",
            motto: "Clarity you can act on",
        },
        ArchetypeProfile {
            name: "The Explorer",
            keywords: &[
                "adventure", "travel", "discover", "freedom", "outdoor", "journey", "explore",
                "new", "wild", "independent",
            ],
            voice: "Restless, curious and open-ended",
            shadow: "Risks feeling aimless or non-committal",
            strategic_note: "Frame every offer as a route to somewhere the customer has not been.",
            motto: "Go further than the map",
        },
        ArchetypeProfile {
            name: "The Hero",
            keywords: &[
                "performance", "win", "challenge", "strong", "results", "achieve", "compete",
                "power", "fast", "goal",
            ],
            voice: "Direct, energetic and outcome-focused",
            shadow: "Can tip into arrogance or exhausting intensity",
            strategic_note: "Show the obstacle, then show the customer beating it.",
            motto: "Built to win",
        },
        ArchetypeProfile {
            name: "The Caregiver",
            keywords: &[
                "care", "family", "support", "help", "safe", "protect", "comfort", "health",
                "community", "kind",
            ],
            voice: "Warm, reassuring and patient",
            shadow: "May sound paternalistic or self-sacrificing",
            strategic_note: "Lead with empathy and make safety tangible.",
            motto: "Care that shows up",
        },
        ArchetypeProfile {
            name: "The Creator",
            keywords: &[
                "design", "create", "craft", "handmade", "custom", "art", "build", "innovative",
                "original", "studio",
            ],
            voice: "Imaginative, expressive and detail-proud",
            shadow: "Perfectionism that hides the practical benefit",
            strategic_note: "Let the making process become the marketing.",
            motto: "Made with intent",
        },
        ArchetypeProfile {
            name: "The Everyman",
            keywords: &[
                "affordable", "simple", "everyday", "friendly", "honest", "local", "neighbor",
                "easy", "practical", "accessible",
            ],
            voice: "Plainspoken, friendly and down to earth",
            shadow: "Can blend in and be forgotten",
            strategic_note: "Win on reliability and belonging rather than spectacle.",
            motto: "Good things, made simple",
        },
    ]
}
