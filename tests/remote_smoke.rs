#![cfg(feature = "remote_integration")]
//! Live check against the configured endpoint.
//! Run with: cargo test --features remote_integration -- --nocapture

use market_mind::config::Config;
use market_mind::{AnalysisOrchestrator, TaskId};
use serde_json::json;

#[tokio::test]
async fn test_live_analysis_is_template_shaped() {
    let config = Config::load().expect("config");
    let orchestrator = AnalysisOrchestrator::from_config(&config);
    let fields = json!({
        "name": "Acme Ledger",
        "description": "Bookkeeping software for small accounting firms with bank sync."
    })
    .as_object()
    .cloned()
    .unwrap();

    let result = orchestrator
        .analyze("brand_evaluation", fields, "en")
        .await
        .expect("analysis");
    println!("source={:?} error={:?}", result.source, result.remote_error);

    let schema = orchestrator.registry().get(TaskId::BrandEvaluation).unwrap();
    assert!(schema.template.conforms(&result.data));
}
