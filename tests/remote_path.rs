//! Remote path: replies are extracted, normalized to the template and returned

mod common;

use common::{ScriptedClient, fields, orchestrator_with};
use market_mind::clients::InferenceClient;
use market_mind::prompts::SYSTEM_INSTRUCTION;
use market_mind::{AnalysisInput, ResultSource, TaskId};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_well_formed_reply_is_returned_as_remote() {
        let reply = json!({
            "overall_score": 8.2,
            "clarity_score": 81,
            "precision_score": 74,
            "differentiation_score": 69,
            "verdict": "Sharp and credible.",
            "strengths": ["Clear audience"],
            "recommendations": [{"title": "Add pricing", "detail": "Publish tiers.", "priority": 1}],
            "personality": {"type": "The Sage", "strategic_angle": "Authority & Trust"}
        });
        let orchestrator =
            orchestrator_with(Some(Arc::new(ScriptedClient::replying(&reply.to_string()))));

        let result = orchestrator
            .analyze("brand_evaluation", fields("Acme", "Finance software"), "en")
            .await
            .unwrap();
        assert_eq!(result.source, ResultSource::Remote);
        assert_eq!(result.data, reply);
        assert!(result.remote_error.is_none());
    }

    #[tokio::test]
    async fn test_partial_chatty_reply_is_sanitized() {
        let raw = "Here you go!\n```json\n{\
            \"audience_mode\": \"B2C\",\
            \"pitch\": \"Fresh bread daily.\",\
            \"objections\": [{\"objection\": \"Too pricey\", \"extra\": true}],\
            \"follow_up_cadence_days\": \"4\",\
            \"unexpected\": 1\
        }\n```\nLet me know if you need more.";
        let orchestrator = orchestrator_with(Some(Arc::new(ScriptedClient::replying(raw))));

        let result = orchestrator
            .analyze("prospect_messaging", fields("Crumb", "A neighborhood bakery"), "en")
            .await
            .unwrap();
        let schema = orchestrator.registry().get(TaskId::ProspectMessaging).unwrap();

        assert_eq!(result.source, ResultSource::Remote);
        assert!(schema.template.conforms(&result.data));
        assert_eq!(result.data["audience_mode"], "B2C");
        assert_eq!(result.data["follow_up_cadence_days"], json!(4));
        assert!(result.data.get("unexpected").is_none());
        // Missing keys take the template example
        assert_eq!(result.data["channels"], json!(["LinkedIn"]));
        let objection = &result.data["objections"][0];
        assert_eq!(objection["objection"], "Too pricey");
        assert!(objection.get("extra").is_none());
        assert!(objection["response"].is_string());
    }

    #[tokio::test]
    async fn test_request_carries_compiled_prompt() {
        let client = Arc::new(ScriptedClient::replying("{}"));
        let orchestrator = orchestrator_with(Some(client.clone() as Arc<dyn InferenceClient>));

        let mut input_fields = fields("Acme", "Planning software");
        input_fields.insert("audience".into(), json!("ops managers"));
        orchestrator
            .analyze("product_profile", input_fields, "es")
            .await
            .unwrap();

        let request = client.last_request().unwrap();
        assert_eq!(request.instruction, SYSTEM_INSTRUCTION);
        assert_eq!(request.messages.len(), 1);
        let payload = &request.messages[0].content;
        assert!(payload.contains("Spanish"));
        assert!(payload.contains("Audience: ops managers"));
        assert!(payload.contains("\"readiness_score\""));
    }

    #[tokio::test]
    async fn test_empty_object_reply_becomes_template_defaults() {
        let orchestrator = orchestrator_with(Some(Arc::new(ScriptedClient::replying("{}"))));
        let result = orchestrator
            .analyze("strategic_synthesis", fields("Acme", "Anything"), "en")
            .await
            .unwrap();
        let schema = orchestrator.registry().get(TaskId::StrategicSynthesis).unwrap();
        assert_eq!(result.source, ResultSource::Remote);
        assert_eq!(result.data, schema.template.example_value());
    }

    #[tokio::test]
    async fn test_uncancelled_token_does_not_interfere() {
        let orchestrator = orchestrator_with(Some(Arc::new(ScriptedClient::replying(
            "{\"product_name\": \"Acme\"}",
        ))));
        let input = AnalysisInput::new("product_profile", fields("Acme", "Tools"), "en");
        let result = orchestrator
            .analyze_with_cancel(&input, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.source, ResultSource::Remote);
        assert_eq!(result.data["product_name"], "Acme");
    }

    #[tokio::test]
    async fn test_result_serializes_with_source_tag() {
        let orchestrator = orchestrator_with(None);
        let result = orchestrator
            .analyze("brand_evaluation", fields("Acme", "Tools"), "en")
            .await
            .unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["source"], "heuristic");
        assert_eq!(value["task"], "brand_evaluation");
        assert!(value.get("remote_error").is_none());
    }
}
