//! Request and result types for the analysis entry point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{MarketMindError, Result};
use crate::schema::TaskId;

/// Caller-supplied analysis request. Never persisted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub task: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Empty means "use the configured default"
    #[serde(default)]
    pub language: String,
}

impl AnalysisInput {
    pub fn new(task: impl Into<String>, fields: Map<String, Value>, language: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            fields,
            language: language.into(),
        }
    }

    /// Convenience for the common name + description case
    pub fn describe(
        task: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.into()));
        fields.insert("description".to_string(), Value::String(description.into()));
        Self::new(task, fields, language)
    }

    /// Business name; empty when absent or not a string
    pub fn name(&self) -> &str {
        self.fields.get("name").and_then(Value::as_str).unwrap_or("")
    }

    /// The description is required and must be a string (empty is fine)
    pub fn description(&self) -> Result<&str> {
        match self.fields.get("description") {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(MarketMindError::InvalidInput {
                message: format!("description must be a string, got {}", json_kind(other)),
            }),
            None => Err(MarketMindError::InvalidInput {
                message: "description is required".to_string(),
            }),
        }
    }

    /// Other free-text fields in key order, excluding name and description
    pub fn auxiliary_text(&self) -> Vec<&str> {
        let mut entries: Vec<(&String, &str)> = self
            .fields
            .iter()
            .filter(|(k, _)| k.as_str() != "name" && k.as_str() != "description")
            .filter_map(|(k, v)| v.as_str().map(|s| (k, s)))
            .filter(|(_, s)| !s.trim().is_empty())
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, s)| s).collect()
    }

    /// First non-empty string among `keys`
    pub fn first_field(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.fields.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Which producer built the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Remote,
    Heuristic,
}

/// Template-shaped output of one analysis call
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub task: TaskId,
    pub source: ResultSource,
    pub data: Value,
    /// Why the remote path was abandoned, when it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
    pub call_id: Uuid,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(fields: Value) -> AnalysisInput {
        AnalysisInput::new("brand_evaluation", fields.as_object().cloned().unwrap(), "en")
    }

    #[test]
    fn description_must_be_a_string() {
        assert_eq!(input(json!({"description": ""})).description().unwrap(), "");
        assert!(matches!(
            input(json!({"description": 12})).description(),
            Err(MarketMindError::InvalidInput { .. })
        ));
        assert!(input(json!({"name": "Acme"})).description().is_err());
    }

    #[test]
    fn auxiliary_text_skips_core_and_non_string_fields() {
        let i = input(json!({
            "name": "Acme",
            "description": "main",
            "zeta": "last",
            "alpha": "first",
            "employees": 12,
            "blank": "  "
        }));
        assert_eq!(i.auxiliary_text(), vec!["first", "last"]);
        assert_eq!(i.name(), "Acme");
    }

    #[test]
    fn first_field_picks_first_present_key() {
        let i = input(json!({"targetAudience": "nurses", "audience": ""}));
        assert_eq!(i.first_field(&["audience", "targetAudience"]), Some("nurses"));
        assert_eq!(i.first_field(&["product"]), None);
    }

    #[test]
    fn input_deserializes_with_defaults() {
        let i: AnalysisInput = serde_json::from_value(json!({"task": "product_profile"})).unwrap();
        assert!(i.fields.is_empty());
        assert!(i.language.is_empty());
    }
}
