//! Fallback guarantees of the analysis orchestrator

mod common;

use common::{ScriptedClient, fields, orchestrator_with, orchestrator_with_registry};
use market_mind::clients::{InferenceClient, InferenceError};
use market_mind::heuristics::HeuristicReport;
use market_mind::schema::{TaskSchema, TemplateNode};
use market_mind::{AnalysisInput, MarketMindError, ResultSource, TaskId, TaskRegistry};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const ACME: &str = "Acme builds cloud software for enterprise finance teams. \
                    The only platform with 200 integrations.";

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transport_failure_falls_back_for_every_task() {
        let client = Arc::new(ScriptedClient::failing(InferenceError::Transport(
            "connection refused".into(),
        )));
        let orchestrator = orchestrator_with(Some(client.clone() as Arc<dyn InferenceClient>));

        for task in TaskId::ALL {
            let result = orchestrator
                .analyze(task.as_str(), fields("Acme", ACME), "en")
                .await
                .unwrap();
            let schema = orchestrator.registry().get(task).unwrap();
            assert_eq!(result.source, ResultSource::Heuristic);
            assert_eq!(result.task, task);
            assert!(schema.template.conforms(&result.data), "{}", task);
            assert!(result.remote_error.unwrap().contains("connection refused"));
        }
        assert_eq!(client.calls(), TaskId::ALL.len());
    }

    #[tokio::test]
    async fn test_auth_and_quota_errors_are_recovered() {
        for err in [InferenceError::Unauthorized, InferenceError::RateLimited] {
            let orchestrator = orchestrator_with(Some(Arc::new(ScriptedClient::failing(err))));
            let result = orchestrator
                .analyze("brand_evaluation", fields("Acme", ACME), "en")
                .await
                .unwrap();
            assert_eq!(result.source, ResultSource::Heuristic);
        }
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let orchestrator = orchestrator_with(Some(Arc::new(ScriptedClient::replying(
            "I'm sorry, I can't help with that.",
        ))));
        let result = orchestrator
            .analyze("prospect_messaging", fields("Acme", ACME), "en")
            .await
            .unwrap();
        assert_eq!(result.source, ResultSource::Heuristic);
        assert!(result.remote_error.unwrap().contains("Malformed output"));
    }

    #[tokio::test]
    async fn test_blank_reply_counts_as_remote_failure() {
        let orchestrator = orchestrator_with(Some(Arc::new(ScriptedClient::replying("   "))));
        let result = orchestrator
            .analyze("product_profile", fields("Acme", ACME), "en")
            .await
            .unwrap();
        assert_eq!(result.source, ResultSource::Heuristic);
        assert!(result.remote_error.unwrap().contains("no text"));
    }

    #[tokio::test]
    async fn test_slow_remote_times_out_into_fallback() {
        let client = ScriptedClient::replying("{\"identity\": \"late\"}")
            .delayed(Duration::from_millis(500));
        let orchestrator =
            orchestrator_with_registry(Some(Arc::new(client)), TaskRegistry::standard(), 20);
        let result = orchestrator
            .analyze("strategic_synthesis", fields("Acme", ACME), "en")
            .await
            .unwrap();
        assert_eq!(result.source, ResultSource::Heuristic);
        assert!(result.remote_error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_cancelled_call_falls_back() {
        let client = ScriptedClient::replying("{}").delayed(Duration::from_secs(5));
        let orchestrator = orchestrator_with(Some(Arc::new(client)));
        let token = CancellationToken::new();
        token.cancel();

        let input = AnalysisInput::new("brand_evaluation", fields("Acme", ACME), "en");
        let result = orchestrator.analyze_with_cancel(&input, token).await.unwrap();
        assert_eq!(result.source, ResultSource::Heuristic);
        assert!(result.remote_error.unwrap().contains("Cancelled"));
    }

    #[tokio::test]
    async fn test_offline_mode_never_records_remote_error() {
        let orchestrator = orchestrator_with(None);
        let result = orchestrator
            .analyze("brand_evaluation", fields("Acme", ACME), "")
            .await
            .unwrap();
        assert_eq!(result.source, ResultSource::Heuristic);
        assert!(result.remote_error.is_none());
    }

    #[tokio::test]
    async fn test_empty_description_yields_floor_scores() {
        let orchestrator = orchestrator_with(None);
        let result = orchestrator
            .analyze("brand_evaluation", fields("", ""), "en")
            .await
            .unwrap();
        assert_eq!(result.data["clarity_score"], json!(20));
        assert_eq!(result.data["precision_score"], json!(50));
        assert_eq!(result.data["differentiation_score"], json!(40));
    }

    #[tokio::test]
    async fn test_heuristic_output_is_deterministic() {
        let orchestrator = orchestrator_with(None);
        let first = orchestrator
            .analyze("strategic_synthesis", fields("Kiln", "Handmade ceramics for home cooks"), "en")
            .await
            .unwrap();
        let second = orchestrator
            .analyze("strategic_synthesis", fields("Kiln", "Handmade ceramics for home cooks"), "en")
            .await
            .unwrap();
        assert_eq!(first.data, second.data);
        assert_ne!(first.call_id, second.call_id);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let orchestrator = orchestrator_with(Some(Arc::new(ScriptedClient::replying("{}"))));
        let mut bad = fields("Acme", "");
        bad.insert("description".into(), json!(["not", "text"]));
        let err = orchestrator.analyze("brand_evaluation", bad, "en").await.unwrap_err();
        assert!(matches!(err, MarketMindError::InvalidInput { .. }));

        let err = orchestrator
            .analyze("horoscope", fields("Acme", ACME), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, MarketMindError::UnknownTask { .. }));
    }

    fn broken_registry() -> TaskRegistry {
        fn explode(_: &HeuristicReport) -> Value {
            panic!("generator defect")
        }
        let template = TemplateNode::from_example(&json!({"overall_score": 1.0}))
            .generate("overall_score", explode);
        TaskRegistry::from_schemas(vec![TaskSchema {
            id: TaskId::BrandEvaluation,
            instruction: "Evaluate.",
            template,
        }])
    }

    #[tokio::test]
    async fn test_double_failure_surfaces_original_remote_error() {
        let client = ScriptedClient::failing(InferenceError::Status {
            status: 503,
            body: "upstream down".into(),
        });
        let orchestrator =
            orchestrator_with_registry(Some(Arc::new(client)), broken_registry(), 2_000);
        let err = orchestrator
            .analyze("brand_evaluation", fields("Acme", ACME), "en")
            .await
            .unwrap_err();
        match err {
            MarketMindError::Remote { message } => assert!(message.contains("503")),
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_offline_heuristic_defect_is_reported_as_defect() {
        let orchestrator = orchestrator_with_registry(None, broken_registry(), 2_000);
        let err = orchestrator
            .analyze("brand_evaluation", fields("Acme", ACME), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, MarketMindError::HeuristicDefect { .. }));
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let orchestrator = orchestrator_with(None);
        let inputs: Vec<AnalysisInput> = TaskId::ALL
            .iter()
            .map(|t| AnalysisInput::new(t.as_str(), fields("Acme", ACME), "en"))
            .chain(std::iter::once(AnalysisInput::new("nope", fields("Acme", ACME), "en")))
            .collect();

        let results = orchestrator.analyze_batch(inputs).await;
        assert_eq!(results.len(), 5);
        for (task, result) in TaskId::ALL.iter().zip(&results) {
            assert_eq!(result.as_ref().unwrap().task, *task);
        }
        assert!(results[4].is_err());
    }
}
