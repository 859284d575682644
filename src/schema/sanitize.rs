//! Recursive reconciliation of untrusted values against a template.
//!
//! The template is authoritative: missing nodes take template defaults, extra
//! keys are dropped, and leaves are coerced to the template's primitive kind.
//! Shape drift is normalized here and never surfaces as an error.

use serde_json::{Map, Value};

use super::template::{NodeKind, TemplateNode};

/// Counts of corrections applied during one sanitize pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriftStats {
    pub defaults_applied: usize,
    pub coerced: usize,
    pub dropped_keys: usize,
}

impl DriftStats {
    pub fn is_clean(&self) -> bool {
        *self == DriftStats::default()
    }
}

/// Reconcile `candidate` against `template`
pub fn sanitize(template: &TemplateNode, candidate: &Value) -> Value {
    let mut stats = DriftStats::default();
    sanitize_node(template, Some(candidate), &mut stats)
}

/// Same as [`sanitize`], also reporting what had to change
pub fn sanitize_tracked(template: &TemplateNode, candidate: &Value) -> (Value, DriftStats) {
    let mut stats = DriftStats::default();
    let value = sanitize_node(template, Some(candidate), &mut stats);
    (value, stats)
}

fn sanitize_node(template: &TemplateNode, candidate: Option<&Value>, stats: &mut DriftStats) -> Value {
    let shape = template.shape();
    let candidate = match candidate {
        None | Some(Value::Null) => {
            stats.defaults_applied += 1;
            return shape.example_value();
        }
        Some(v) => v,
    };

    match shape {
        TemplateNode::Array(item) => match candidate {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|element| sanitize_node(item, Some(element), stats))
                    .collect(),
            ),
            _ => {
                stats.defaults_applied += 1;
                shape.example_value()
            }
        },
        TemplateNode::Object(fields) => {
            if let Value::Object(map) = candidate {
                stats.dropped_keys += map
                    .keys()
                    .filter(|k| !fields.iter().any(|(name, _)| name == *k))
                    .count();
            }
            let mut out = Map::new();
            for (key, node) in fields {
                out.insert(key.clone(), sanitize_node(node, candidate.get(key.as_str()), stats));
            }
            Value::Object(out)
        }
        TemplateNode::Literal(example) => sanitize_leaf(shape.kind(), example, candidate, stats),
        TemplateNode::Generator { .. } => candidate.clone(),
    }
}

fn sanitize_leaf(kind: NodeKind, example: &Value, candidate: &Value, stats: &mut DriftStats) -> Value {
    let coerced = match kind {
        NodeKind::Number => coerce_number(candidate),
        NodeKind::String => coerce_string(candidate),
        NodeKind::Bool => coerce_bool(candidate),
        _ => return candidate.clone(),
    };

    match coerced {
        Some(Coerced::Unchanged) => candidate.clone(),
        Some(Coerced::Converted(v)) => {
            stats.coerced += 1;
            v
        }
        None => {
            stats.defaults_applied += 1;
            example.clone()
        }
    }
}

enum Coerced {
    Unchanged,
    Converted(Value),
}

fn coerce_number(candidate: &Value) -> Option<Coerced> {
    match candidate {
        Value::Number(n) if n.as_f64().is_some_and(f64::is_finite) => Some(Coerced::Unchanged),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| Coerced::Converted(number_value(f))),
        _ => None,
    }
}

fn coerce_string(candidate: &Value) -> Option<Coerced> {
    match candidate {
        Value::String(_) => Some(Coerced::Unchanged),
        Value::Number(n) => Some(Coerced::Converted(Value::String(n.to_string()))),
        Value::Bool(b) => Some(Coerced::Converted(Value::String(b.to_string()))),
        _ => None,
    }
}

fn coerce_bool(candidate: &Value) -> Option<Coerced> {
    match candidate {
        Value::Bool(_) => Some(Coerced::Unchanged),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(Coerced::Converted(Value::Bool(true))),
            "false" => Some(Coerced::Converted(Value::Bool(false))),
            _ => None,
        },
        _ => None,
    }
}

/// Integral values come back as JSON integers
fn number_value(f: f64) -> Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE {
        Value::from(f as i64)
    } else {
        Value::from(f)
    }
}
