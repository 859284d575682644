//! Template trees describing a task's output shape.
//!
//! A node is resolved by its tag, never by inspecting runtime types: literals
//! carry example values, generators wrap a shape plus a function of the
//! heuristic report, objects and arrays nest.

use serde_json::{Map, Value};
use std::fmt;

use crate::heuristics::HeuristicReport;

/// Produces a subtree from the heuristic report (fallback path only)
pub type GeneratorFn = fn(&HeuristicReport) -> Value;

/// Primitive or composite kind of a node after resolving generators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Number,
    String,
    Bool,
    Object,
    Array,
    Any,
}

#[derive(Clone)]
pub enum TemplateNode {
    Literal(Value),
    Generator {
        shape: Box<TemplateNode>,
        produce: GeneratorFn,
    },
    Object(Vec<(String, TemplateNode)>),
    Array(Box<TemplateNode>),
}

impl fmt::Debug for TemplateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateNode::Literal(v) => write!(f, "Literal({})", v),
            TemplateNode::Generator { shape, .. } => {
                f.debug_struct("Generator").field("shape", shape).finish()
            }
            TemplateNode::Object(fields) => f.debug_map().entries(fields.iter().map(|(k, v)| (k, v))).finish(),
            TemplateNode::Array(item) => f.debug_list().entry(item).finish(),
        }
    }
}

impl TemplateNode {
    /// Build a literal tree from an example JSON value.
    /// Empty example arrays become arrays of strings.
    pub fn from_example(example: &Value) -> Self {
        match example {
            Value::Object(map) => TemplateNode::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), TemplateNode::from_example(v)))
                    .collect(),
            ),
            Value::Array(items) => {
                let item = items
                    .first()
                    .map(TemplateNode::from_example)
                    .unwrap_or_else(|| TemplateNode::Literal(Value::String(String::new())));
                TemplateNode::Array(Box::new(item))
            }
            other => TemplateNode::Literal(other.clone()),
        }
    }

    /// Wrap the field at `key` in a generator. Only meaningful on objects.
    pub fn generate(mut self, key: &str, produce: GeneratorFn) -> Self {
        if let TemplateNode::Object(fields) = &mut self {
            if let Some((_, node)) = fields.iter_mut().find(|(k, _)| k == key) {
                let shape = std::mem::replace(node, TemplateNode::Literal(Value::Null));
                *node = TemplateNode::Generator {
                    shape: Box::new(shape),
                    produce,
                };
            } else {
                debug_assert!(false, "generator key '{}' not in template", key);
            }
        }
        self
    }

    /// The node that defines shape, looking through generators
    pub fn shape(&self) -> &TemplateNode {
        match self {
            TemplateNode::Generator { shape, .. } => shape.shape(),
            other => other,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.shape() {
            TemplateNode::Object(_) => NodeKind::Object,
            TemplateNode::Array(_) => NodeKind::Array,
            TemplateNode::Literal(Value::Number(_)) => NodeKind::Number,
            TemplateNode::Literal(Value::String(_)) => NodeKind::String,
            TemplateNode::Literal(Value::Bool(_)) => NodeKind::Bool,
            _ => NodeKind::Any,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind(), NodeKind::Object | NodeKind::Array)
    }

    /// Render as a JSON shape example (arrays carry one element)
    pub fn example_value(&self) -> Value {
        match self.shape() {
            TemplateNode::Literal(v) => v.clone(),
            TemplateNode::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, node)| (k.clone(), node.example_value()))
                    .collect::<Map<String, Value>>(),
            ),
            TemplateNode::Array(item) => Value::Array(vec![item.example_value()]),
            TemplateNode::Generator { .. } => Value::Null,
        }
    }

    /// Resolve generators against a heuristic report; literals stay as examples
    pub fn materialize(&self, report: &HeuristicReport) -> Value {
        match self {
            TemplateNode::Literal(v) => v.clone(),
            TemplateNode::Generator { produce, .. } => produce(report),
            TemplateNode::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, node)| (k.clone(), node.materialize(report)))
                    .collect::<Map<String, Value>>(),
            ),
            TemplateNode::Array(item) => Value::Array(vec![item.materialize(report)]),
        }
    }

    /// Whether `value` has exactly this template's keys, nesting and leaf kinds
    pub fn conforms(&self, value: &Value) -> bool {
        match self.shape() {
            TemplateNode::Object(fields) => match value {
                Value::Object(map) => {
                    map.len() == fields.len()
                        && fields
                            .iter()
                            .all(|(k, node)| map.get(k).is_some_and(|v| node.conforms(v)))
                }
                _ => false,
            },
            TemplateNode::Array(item) => match value {
                Value::Array(items) => items.iter().all(|v| item.conforms(v)),
                _ => false,
            },
            _ => match self.kind() {
                NodeKind::Number => value.as_f64().is_some_and(f64::is_finite),
                NodeKind::String => value.is_string(),
                NodeKind::Bool => value.is_boolean(),
                _ => true,
            },
        }
    }

    /// Object field lookup
    pub fn field(&self, key: &str) -> Option<&TemplateNode> {
        match self.shape() {
            TemplateNode::Object(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, n)| n),
            _ => None,
        }
    }
}
