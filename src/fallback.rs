//! Per-task mapping from the heuristic report to each task's output shape.
//!
//! Every function here is a template generator: a pure function of the
//! report. `map_report` materializes a task template with them and passes the
//! result through the sanitizer as a final guard.

use serde_json::{Value, json};

use crate::error::{MarketMindError, Result};
use crate::heuristics::{HeuristicReport, Scores};
use crate::schema::{TaskSchema, sanitize_tracked};
use crate::taxonomy::CommunicationMode;

/// Build the task-shaped result for `schema` from a heuristic report
pub fn map_report(schema: &TaskSchema, report: &HeuristicReport) -> Result<Value> {
    let raw = schema.template.materialize(report);
    let (value, drift) = sanitize_tracked(&schema.template, &raw);
    if !drift.is_clean() {
        tracing::debug!(task = %schema.id, ?drift, "fallback output needed sanitizing");
    }
    if !schema.template.conforms(&value) {
        return Err(MarketMindError::HeuristicDefect {
            message: format!("fallback output for {} does not match its template", schema.id),
        });
    }
    Ok(value)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn all_scores(r: &HeuristicReport) -> [u8; 3] {
    [r.scores.clarity, r.scores.precision, r.scores.differentiation]
}

// brand_evaluation

/// Mean of clarity and differentiation rescaled to 0-10, one decimal
pub fn overall_score(r: &HeuristicReport) -> Value {
    let mean = Scores::mean(&[r.scores.clarity, r.scores.differentiation]);
    json!(round_to(mean / 10.0, 1))
}

pub fn clarity_score(r: &HeuristicReport) -> Value {
    json!(r.scores.clarity)
}

pub fn precision_score(r: &HeuristicReport) -> Value {
    json!(r.scores.precision)
}

pub fn differentiation_score(r: &HeuristicReport) -> Value {
    json!(r.scores.differentiation)
}

pub fn evaluation_verdict(r: &HeuristicReport) -> Value {
    let mean = Scores::mean(&all_scores(r));
    let label = if mean >= 75.0 {
        "Strong brand foundation"
    } else if mean >= 50.0 {
        "Solid base with visible gaps"
    } else {
        "Early-stage positioning"
    };
    json!(format!("{} for {}. {}", label, r.name, r.rationale))
}

pub fn evaluation_strengths(r: &HeuristicReport) -> Value {
    let f = &r.features;
    let mut strengths = Vec::new();
    if f.has_audience_marker {
        strengths.push("Names a specific audience".to_string());
    }
    if f.has_unique_value_marker {
        strengths.push("Makes an explicit differentiation claim".to_string());
    }
    if f.has_numbers {
        strengths.push("Backs claims with concrete numbers".to_string());
    }
    if r.classification.category_hits > 2 {
        strengths.push(format!(
            "Signals its market clearly ({})",
            r.classification.category.name
        ));
    }
    if strengths.is_empty() {
        strengths.push(format!(
            "Natural fit for the {} voice",
            r.classification.archetype.name
        ));
    }
    json!(strengths)
}

pub fn recommendations(r: &HeuristicReport) -> Value {
    let recs: Vec<Value> = r
        .tips
        .iter()
        .enumerate()
        .map(|(i, tip)| {
            json!({
                "title": tip.title,
                "detail": tip.detail,
                "priority": i + 1,
            })
        })
        .collect();
    Value::Array(recs)
}

pub fn personality(r: &HeuristicReport) -> Value {
    json!({
        "type": r.classification.archetype.name,
        "strategic_angle": r.classification.mode.emphasis(),
    })
}

// product_profile

pub fn product_name(r: &HeuristicReport) -> Value {
    json!(r.name)
}

pub fn category_name(r: &HeuristicReport) -> Value {
    json!(r.classification.category.name)
}

pub fn positioning(r: &HeuristicReport) -> Value {
    json!(r.prefill.positioning_statement)
}

pub fn value_propositions(r: &HeuristicReport) -> Value {
    let lead_channel = r.brand.channels.first().map(String::as_str).unwrap_or("direct outreach");
    json!([
        r.profile.offer,
        r.brand.tagline,
        format!("{} through {}", r.classification.mode.emphasis(), lead_channel),
    ])
}

pub fn target_segments(r: &HeuristicReport) -> Value {
    let c = &r.classification;
    let (primary, secondary, pain) = match c.mode {
        CommunicationMode::BusinessToBusiness => (
            "Operational decision-makers",
            "Procurement and finance sign-off",
            "Needs dependable results with low switching risk",
        ),
        CommunicationMode::BusinessToConsumer => (
            "Core everyday customers",
            "Gift buyers and referrals",
            "Wants to feel confident in the choice",
        ),
    };
    let channel_at = |i: usize| {
        r.brand
            .channels
            .get(i)
            .or_else(|| r.brand.channels.first())
            .cloned()
            .unwrap_or_else(|| "Website".to_string())
    };
    json!([
        {"segment": primary, "pain_point": pain, "channel": channel_at(0)},
        {"segment": secondary, "pain_point": c.archetype.shadow, "channel": channel_at(1)},
    ])
}

pub fn pricing_signal(r: &HeuristicReport) -> Value {
    let signal = if r.scores.differentiation >= 80 {
        "premium"
    } else if r.classification.mode == CommunicationMode::BusinessToBusiness {
        "mid-market"
    } else {
        "accessible"
    };
    json!(signal)
}

/// Mean of precision and clarity, 0-100
pub fn readiness_score(r: &HeuristicReport) -> Value {
    let mean = Scores::mean(&[r.scores.precision, r.scores.clarity]);
    json!(mean.round() as u8)
}

// prospect_messaging

pub fn audience_mode(r: &HeuristicReport) -> Value {
    json!(r.classification.mode.short_label())
}

pub fn opening_line(r: &HeuristicReport) -> Value {
    json!(r.prefill.prospect_opener)
}

pub fn pitch(r: &HeuristicReport) -> Value {
    json!(r.prefill.product_pitch)
}

pub fn objections(r: &HeuristicReport) -> Value {
    let name = &r.name;
    match r.classification.mode {
        CommunicationMode::BusinessToBusiness => json!([
            {
                "objection": "We already work with a provider.",
                "response": format!("{} can start alongside them on one project so you compare results directly.", name),
            },
            {
                "objection": "There is no budget this quarter.",
                "response": "Start with a scoped pilot sized to prove the return before the next budget cycle.",
            },
        ]),
        CommunicationMode::BusinessToConsumer => json!([
            {
                "objection": "It costs more than the alternatives.",
                "response": format!("{} is built to last, so you buy once instead of twice.", name),
            },
            {
                "objection": "I'm not sure it's for me.",
                "response": "Try it risk-free and see what other customers already say about it.",
            },
        ]),
    }
}

pub fn channels(r: &HeuristicReport) -> Value {
    json!(r.brand.channels)
}

pub fn follow_up_cadence_days(r: &HeuristicReport) -> Value {
    match r.classification.mode {
        CommunicationMode::BusinessToBusiness => json!(5),
        CommunicationMode::BusinessToConsumer => json!(2),
    }
}

// strategic_synthesis

pub fn identity(r: &HeuristicReport) -> Value {
    json!(r.profile.identity)
}

pub fn offer(r: &HeuristicReport) -> Value {
    json!(r.profile.offer)
}

pub fn audience(r: &HeuristicReport) -> Value {
    json!(r.profile.audience)
}

pub fn execution(r: &HeuristicReport) -> Value {
    json!(r.profile.execution)
}

pub fn archetype(r: &HeuristicReport) -> Value {
    json!({
        "name": r.brand.archetype,
        "voice": r.brand.voice,
        "shadow": r.brand.shadow,
    })
}

pub fn visual_identity(r: &HeuristicReport) -> Value {
    json!({
        "primary_color": r.brand.primary_color,
        "secondary_color": r.brand.secondary_color,
        "heading_font": r.brand.heading_font,
        "body_font": r.brand.body_font,
    })
}

pub fn content_pillars(r: &HeuristicReport) -> Value {
    json!(r.brand.content_pillars)
}

pub fn priority_actions(r: &HeuristicReport) -> Value {
    let actions: Vec<String> = r
        .tips
        .iter()
        .map(|t| format!("{}: {}", t.title, t.detail))
        .collect();
    json!(actions)
}

/// Mean of all three scores rescaled to 0-1, two decimals
pub fn confidence(r: &HeuristicReport) -> Value {
    json!(round_to(Scores::mean(&all_scores(r)) / 100.0, 2))
}

pub fn rationale(r: &HeuristicReport) -> Value {
    json!(r.rationale)
}
