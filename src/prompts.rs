//! Prompt compiler for the remote path.
//!
//! Assembles instruction, language directive, context line, caller input and
//! the template's shape example into one payload. No validation happens here.

use serde_json::Value;

use crate::clients::{ChatMessage, InferenceRequest};
use crate::error::Result;
use crate::schema::TaskSchema;
use crate::types::AnalysisInput;

/// System preamble sent with every task
pub const SYSTEM_INSTRUCTION: &str = "You are a senior marketing strategist. Answer with a single JSON object \
    that follows the requested structure exactly: same keys, same nesting, numbers as numbers. \
    No markdown fences, no commentary before or after the JSON.";

const CATEGORY_KEYS: &[&str] = &["category", "industry", "segment"];
const PRODUCT_KEYS: &[&str] = &["product", "productName", "product_name", "offer"];
const AUDIENCE_KEYS: &[&str] = &["audience", "targetAudience", "target_audience"];

/// Instruction plus user payload, ready to hand to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPrompt {
    pub instruction: String,
    pub payload: String,
}

impl CompiledPrompt {
    pub fn into_request(self) -> InferenceRequest {
        InferenceRequest {
            messages: vec![ChatMessage::user(self.payload)],
            context: None,
            instruction: self.instruction,
        }
    }
}

/// Human-readable language directive for a language tag
pub fn language_directive(tag: &str) -> String {
    let lower = tag.trim().to_lowercase();
    let primary = lower.split(['-', '_']).next().unwrap_or("");
    let language = match (primary, lower.as_str()) {
        ("pt", "pt-br") | ("pt", "pt_br") => "Brazilian Portuguese",
        ("pt", _) => "Portuguese",
        ("es", _) => "Spanish",
        ("fr", _) => "French",
        ("de", _) => "German",
        ("it", _) => "Italian",
        ("en", _) | ("", _) => "English",
        _ => return format!("Write every text value in the language tagged '{}'.", tag.trim()),
    };
    format!("Write every text value in {}.", language)
}

/// Short context line from well-known input fields, if any are present
pub fn context_line(input: &AnalysisInput) -> Option<String> {
    let parts: Vec<String> = [
        ("Category", input.first_field(CATEGORY_KEYS)),
        ("Product", input.first_field(PRODUCT_KEYS)),
        ("Audience", input.first_field(AUDIENCE_KEYS)),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|v| format!("{}: {}", label, v)))
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(format!("Context: {}.", parts.join("; ")))
    }
}

/// Build the full prompt for `schema` from the caller's input
pub fn compile(schema: &TaskSchema, input: &AnalysisInput, language: &str) -> Result<CompiledPrompt> {
    let mut payload = String::new();
    payload.push_str(schema.instruction);
    payload.push_str("\n\n");
    payload.push_str(&language_directive(language));
    payload.push('\n');

    if let Some(line) = context_line(input) {
        payload.push_str(&line);
        payload.push('\n');
    }

    payload.push_str("\nInput:\n");
    payload.push_str(&serde_json::to_string_pretty(&Value::Object(input.fields.clone()))?);

    payload.push_str("\n\nRespond with JSON in exactly this structure (values are examples):\n");
    payload.push_str(&serde_json::to_string_pretty(&schema.template.example_value())?);

    Ok(CompiledPrompt {
        instruction: SYSTEM_INSTRUCTION.to_string(),
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{TaskId, TaskRegistry};
    use serde_json::json;

    fn input(fields: Value) -> AnalysisInput {
        AnalysisInput::new("product_profile", fields.as_object().cloned().unwrap(), "pt-BR")
    }

    #[test]
    fn compiled_payload_contains_every_section() {
        let registry = TaskRegistry::standard();
        let schema = registry.get(TaskId::ProductProfile).unwrap();
        let i = input(json!({
            "name": "Acme",
            "description": "Planning software",
            "industry": "SaaS",
            "targetAudience": "ops managers"
        }));
        let prompt = compile(schema, &i, &i.language).unwrap();

        assert_eq!(prompt.instruction, SYSTEM_INSTRUCTION);
        assert!(prompt.payload.starts_with(schema.instruction));
        assert!(prompt.payload.contains("Brazilian Portuguese"));
        assert!(prompt.payload.contains("Context: Category: SaaS; Audience: ops managers."));
        assert!(prompt.payload.contains("\"description\": \"Planning software\""));
        assert!(prompt.payload.contains("\"readiness_score\": 65"));
    }

    #[test]
    fn context_line_is_omitted_without_known_fields() {
        assert_eq!(context_line(&input(json!({"description": "x"}))), None);
    }

    #[test]
    fn language_directive_handles_unknown_tags() {
        assert_eq!(language_directive("en-US"), "Write every text value in English.");
        assert_eq!(language_directive("pt"), "Write every text value in Portuguese.");
        assert!(language_directive("sw").contains("'sw'"));
    }

    #[test]
    fn request_carries_instruction_and_single_user_message() {
        let request = CompiledPrompt {
            instruction: "sys".into(),
            payload: "body".into(),
        }
        .into_request();
        assert_eq!(request.instruction, "sys");
        assert_eq!(request.messages, vec![ChatMessage::user("body")]);
        assert!(request.context.is_none());
    }
}
