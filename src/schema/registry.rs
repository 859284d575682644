//! Fixed set of analysis tasks: instruction plus output template.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use super::template::TemplateNode;
use crate::error::MarketMindError;
use crate::fallback;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskId {
    BrandEvaluation,
    ProductProfile,
    ProspectMessaging,
    StrategicSynthesis,
}

impl TaskId {
    pub const ALL: [TaskId; 4] = [
        TaskId::BrandEvaluation,
        TaskId::ProductProfile,
        TaskId::ProspectMessaging,
        TaskId::StrategicSynthesis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskId::BrandEvaluation => "brand_evaluation",
            TaskId::ProductProfile => "product_profile",
            TaskId::ProspectMessaging => "prospect_messaging",
            TaskId::StrategicSynthesis => "strategic_synthesis",
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskId {
    type Err = MarketMindError;

    /// Case-insensitive; `-` and `_` are interchangeable
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        TaskId::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| MarketMindError::UnknownTask {
                task: s.to_string(),
            })
    }
}

#[derive(Debug, Clone)]
pub struct TaskSchema {
    pub id: TaskId,
    pub instruction: &'static str,
    pub template: TemplateNode,
}

/// Immutable registry built once at startup
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    schemas: Vec<TaskSchema>,
}

impl TaskRegistry {
    pub fn standard() -> Self {
        Self {
            schemas: vec![
                brand_evaluation(),
                product_profile(),
                prospect_messaging(),
                strategic_synthesis(),
            ],
        }
    }

    /// Registry over an explicit schema list, e.g. for alternate templates in tests
    pub fn from_schemas(schemas: Vec<TaskSchema>) -> Self {
        Self { schemas }
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskSchema> {
        self.schemas.iter().find(|s| s.id == id)
    }

    /// Look up by caller-supplied identifier
    pub fn resolve(&self, task: &str) -> crate::error::Result<&TaskSchema> {
        let id: TaskId = task.parse()?;
        self.get(id).ok_or_else(|| MarketMindError::UnknownTask {
            task: task.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskSchema> {
        self.schemas.iter()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn brand_evaluation() -> TaskSchema {
    let template = TemplateNode::from_example(&json!({
        "overall_score": 7.5,
        "clarity_score": 70,
        "precision_score": 60,
        "differentiation_score": 55,
        "verdict": "Clear offer with a credible audience focus; differentiation needs sharper proof.",
        "strengths": ["Names a specific audience"],
        "recommendations": [
            {"title": "Add proof points", "detail": "Quote measurable outcomes.", "priority": 1}
        ],
        "personality": {"type": "The Sage", "strategic_angle": "Authority & Trust"}
    }))
    .generate("overall_score", fallback::overall_score)
    .generate("clarity_score", fallback::clarity_score)
    .generate("precision_score", fallback::precision_score)
    .generate("differentiation_score", fallback::differentiation_score)
    .generate("verdict", fallback::evaluation_verdict)
    .generate("strengths", fallback::evaluation_strengths)
    .generate("recommendations", fallback::recommendations)
    .generate("personality", fallback::personality);

    TaskSchema {
        id: TaskId::BrandEvaluation,
        instruction: "Evaluate the brand described below as a senior brand strategist. Score clarity, \
                      precision and differentiation from 0 to 100, give an overall score from 0 to 10, \
                      list concrete strengths, and prioritize actionable recommendations.",
        template,
    }
}

fn product_profile() -> TaskSchema {
    let template = TemplateNode::from_example(&json!({
        "product_name": "Acme Planner",
        "category": "B2B Software & SaaS",
        "positioning": "The planning tool for teams that outgrew spreadsheets.",
        "value_propositions": ["Saves hours of manual reporting"],
        "target_segments": [
            {"segment": "Operations managers", "pain_point": "Scattered data", "channel": "LinkedIn"}
        ],
        "pricing_signal": "premium",
        "readiness_score": 65
    }))
    .generate("product_name", fallback::product_name)
    .generate("category", fallback::category_name)
    .generate("positioning", fallback::positioning)
    .generate("value_propositions", fallback::value_propositions)
    .generate("target_segments", fallback::target_segments)
    .generate("pricing_signal", fallback::pricing_signal)
    .generate("readiness_score", fallback::readiness_score);

    TaskSchema {
        id: TaskId::ProductProfile,
        instruction: "Profile the product or service described below for go-to-market planning. \
                      Identify its category, positioning, value propositions, target segments with \
                      their main pain point and best channel, a pricing signal \
                      (budget, mid-market or premium), and a 0-100 market readiness score.",
        template,
    }
}

fn prospect_messaging() -> TaskSchema {
    let template = TemplateNode::from_example(&json!({
        "audience_mode": "B2B",
        "opening_line": "Teams like yours lose hours every week to manual reporting.",
        "pitch": "Acme turns scattered data into one weekly plan.",
        "objections": [
            {"objection": "We already use spreadsheets.", "response": "Keep them; Acme reads them for you."}
        ],
        "channels": ["LinkedIn"],
        "follow_up_cadence_days": 3
    }))
    .generate("audience_mode", fallback::audience_mode)
    .generate("opening_line", fallback::opening_line)
    .generate("pitch", fallback::pitch)
    .generate("objections", fallback::objections)
    .generate("channels", fallback::channels)
    .generate("follow_up_cadence_days", fallback::follow_up_cadence_days);

    TaskSchema {
        id: TaskId::ProspectMessaging,
        instruction: "Write prospecting messages for the business described below. Decide whether \
                      the audience is B2B or B2C, draft an opening line and a short pitch, anticipate \
                      the most likely objections with responses, pick outreach channels, and suggest \
                      a follow-up cadence in days.",
        template,
    }
}

fn strategic_synthesis() -> TaskSchema {
    let template = TemplateNode::from_example(&json!({
        "identity": "Who the brand is and how it sounds.",
        "offer": "What it sells and why it matters.",
        "audience": "Who buys and where to reach them.",
        "execution": "What to publish and where.",
        "archetype": {"name": "The Sage", "voice": "Measured and evidence-led", "shadow": "Can sound cold"},
        "visual_identity": {
            "primary_color": "#1E3A8A",
            "secondary_color": "#38BDF8",
            "heading_font": "Inter",
            "body_font": "IBM Plex Sans"
        },
        "content_pillars": ["Customer proof"],
        "priority_actions": ["Publish two case studies"],
        "confidence": 0.6,
        "rationale": "Why this strategy fits."
    }))
    .generate("identity", fallback::identity)
    .generate("offer", fallback::offer)
    .generate("audience", fallback::audience)
    .generate("execution", fallback::execution)
    .generate("archetype", fallback::archetype)
    .generate("visual_identity", fallback::visual_identity)
    .generate("content_pillars", fallback::content_pillars)
    .generate("priority_actions", fallback::priority_actions)
    .generate("confidence", fallback::confidence)
    .generate("rationale", fallback::rationale);

    TaskSchema {
        id: TaskId::StrategicSynthesis,
        instruction: "Synthesize a complete brand strategy for the business described below: \
                      identity, offer, audience and execution, a brand archetype with its voice and \
                      shadow, a visual identity (two colors, two typefaces), content pillars, \
                      priority actions, a 0-1 confidence, and a one-paragraph rationale.",
        template,
    }
}
