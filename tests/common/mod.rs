//! Shared test doubles for the remote inference seam

#![allow(dead_code)]

use async_trait::async_trait;
use market_mind::clients::{InferenceClient, InferenceError, InferenceRequest};
use market_mind::{AnalysisOrchestrator, OrchestratorSettings, TaskRegistry, Taxonomy};
use market_mind::heuristics::HeuristicEngine;
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replies with a fixed outcome, optionally after a delay, and records requests
pub struct ScriptedClient {
    reply: Result<String, InferenceError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<InferenceRequest>>,
}

impl ScriptedClient {
    pub fn replying(text: &str) -> Self {
        Self::with(Ok(text.to_string()))
    }

    pub fn failing(err: InferenceError) -> Self {
        Self::with(Err(err))
    }

    fn with(reply: Result<String, InferenceError>) -> Self {
        Self {
            reply,
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<InferenceRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &InferenceRequest) -> Result<String, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

pub fn settings(timeout_ms: u64) -> OrchestratorSettings {
    OrchestratorSettings {
        remote_timeout: Duration::from_millis(timeout_ms),
        default_language: "en".to_string(),
        verify_conformance: true,
    }
}

pub fn orchestrator_with(client: Option<Arc<dyn InferenceClient>>) -> AnalysisOrchestrator {
    orchestrator_with_registry(client, TaskRegistry::standard(), 2_000)
}

pub fn orchestrator_with_registry(
    client: Option<Arc<dyn InferenceClient>>,
    registry: TaskRegistry,
    timeout_ms: u64,
) -> AnalysisOrchestrator {
    AnalysisOrchestrator::new(
        Arc::new(registry),
        HeuristicEngine::new(Arc::new(Taxonomy::standard())),
        client,
        settings(timeout_ms),
    )
}

pub fn fields(name: &str, description: &str) -> Map<String, Value> {
    json!({"name": name, "description": description})
        .as_object()
        .cloned()
        .unwrap()
}
