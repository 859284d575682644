//! Analysis orchestrator: remote path first, heuristic path on any failure.
//!
//! Each call walks an explicit state machine:
//!
//! ```text
//! Idle -> RemoteAttempt -> Success
//!                       -> RemoteFailed -> HeuristicFallback -> Success
//!                                                           -> HardFailure
//! ```
//!
//! Without a configured client the machine goes straight from `Idle` to
//! `HeuristicFallback`. `HardFailure` surfaces the original remote error when
//! there was one, otherwise the heuristic defect.

use chrono::Utc;
use futures_util::future::join_all;
use serde_json::{Map, Value};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::clients::{ChatCompletionsClient, InferenceClient};
use crate::config::Config;
use crate::error::{MarketMindError, Result};
use crate::extraction::ResponseExtractor;
use crate::fallback;
use crate::heuristics::HeuristicEngine;
use crate::prompts;
use crate::schema::{TaskRegistry, TaskSchema, sanitize_tracked};
use crate::taxonomy::Taxonomy;
use crate::types::{AnalysisInput, AnalysisResult, ResultSource};

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub remote_timeout: Duration,
    pub default_language: String,
    pub verify_conformance: bool,
}

impl OrchestratorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            remote_timeout: Duration::from_millis(config.remote.timeout_ms),
            default_language: config.analysis.default_language.clone(),
            verify_conformance: config.analysis.verify_conformance,
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Named states of one analysis call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    RemoteAttempt,
    RemoteFailed,
    HeuristicFallback,
    Success,
    HardFailure,
}

enum Step {
    Idle,
    RemoteAttempt(Arc<dyn InferenceClient>),
    RemoteFailed(MarketMindError),
    HeuristicFallback { remote_error: Option<MarketMindError> },
    Success {
        source: ResultSource,
        data: Value,
        remote_error: Option<MarketMindError>,
    },
    HardFailure(MarketMindError),
}

impl Step {
    fn state(&self) -> AnalysisState {
        match self {
            Step::Idle => AnalysisState::Idle,
            Step::RemoteAttempt(_) => AnalysisState::RemoteAttempt,
            Step::RemoteFailed(_) => AnalysisState::RemoteFailed,
            Step::HeuristicFallback { .. } => AnalysisState::HeuristicFallback,
            Step::Success { .. } => AnalysisState::Success,
            Step::HardFailure(_) => AnalysisState::HardFailure,
        }
    }
}

/// Error surfaced when both paths fail
fn hard_failure(remote_error: Option<MarketMindError>, defect: MarketMindError) -> MarketMindError {
    match remote_error {
        Some(original) => original,
        None => defect,
    }
}

pub struct AnalysisOrchestrator {
    registry: Arc<TaskRegistry>,
    engine: HeuristicEngine,
    client: Option<Arc<dyn InferenceClient>>,
    extractor: ResponseExtractor,
    settings: OrchestratorSettings,
}

impl AnalysisOrchestrator {
    pub fn new(
        registry: Arc<TaskRegistry>,
        engine: HeuristicEngine,
        client: Option<Arc<dyn InferenceClient>>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            registry,
            engine,
            client,
            extractor: ResponseExtractor::standard(),
            settings,
        }
    }

    /// Standard tables, plus the chat client when remote inference is enabled
    pub fn from_config(config: &Config) -> Self {
        let client: Option<Arc<dyn InferenceClient>> = if config.remote.enabled {
            Some(Arc::new(ChatCompletionsClient::from_config(config)))
        } else {
            tracing::info!("Remote inference disabled; using heuristic analysis only");
            None
        };

        Self::new(
            Arc::new(TaskRegistry::standard()),
            HeuristicEngine::new(Arc::new(Taxonomy::standard())),
            client,
            OrchestratorSettings::from_config(config),
        )
    }

    pub fn with_extractor(mut self, extractor: ResponseExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn has_remote(&self) -> bool {
        self.client.is_some()
    }

    pub async fn analyze(
        &self,
        task: &str,
        fields: Map<String, Value>,
        language: &str,
    ) -> Result<AnalysisResult> {
        self.analyze_input(&AnalysisInput::new(task, fields, language))
            .await
    }

    pub async fn analyze_input(&self, input: &AnalysisInput) -> Result<AnalysisResult> {
        self.run(input, None).await
    }

    /// Cancelling the token abandons the remote call and falls back
    pub async fn analyze_with_cancel(
        &self,
        input: &AnalysisInput,
        cancel: CancellationToken,
    ) -> Result<AnalysisResult> {
        self.run(input, Some(&cancel)).await
    }

    /// Independent calls run concurrently; results keep input order
    pub async fn analyze_batch(&self, inputs: Vec<AnalysisInput>) -> Vec<Result<AnalysisResult>> {
        join_all(inputs.iter().map(|input| self.analyze_input(input))).await
    }

    async fn run(
        &self,
        input: &AnalysisInput,
        cancel: Option<&CancellationToken>,
    ) -> Result<AnalysisResult> {
        let schema = self.registry.resolve(&input.task)?;
        let description = input.description()?;
        let language = if input.language.trim().is_empty() {
            self.settings.default_language.as_str()
        } else {
            input.language.trim()
        };

        let call_id = Uuid::new_v4();
        let span = tracing::info_span!("analysis", %call_id, task = %schema.id);

        async move {
            let mut step = Step::Idle;
            loop {
                let from = step.state();
                step = match step {
                    Step::Idle => match &self.client {
                        Some(client) => Step::RemoteAttempt(Arc::clone(client)),
                        None => Step::HeuristicFallback { remote_error: None },
                    },
                    Step::RemoteAttempt(client) => {
                        match self
                            .remote_attempt(client.as_ref(), schema, input, language, cancel)
                            .await
                        {
                            Ok(data) => Step::Success {
                                source: ResultSource::Remote,
                                data,
                                remote_error: None,
                            },
                            Err(e) => Step::RemoteFailed(e),
                        }
                    }
                    Step::RemoteFailed(e) => {
                        if e.is_recoverable() {
                            tracing::warn!(error = %e, "Remote analysis failed; using heuristic fallback");
                        } else {
                            tracing::error!(
                                error = %e,
                                "Unexpected remote path error; using heuristic fallback"
                            );
                        }
                        Step::HeuristicFallback {
                            remote_error: Some(e),
                        }
                    }
                    Step::HeuristicFallback { remote_error } => {
                        match self.heuristic_path(schema, input, description) {
                            Ok(data) => Step::Success {
                                source: ResultSource::Heuristic,
                                data,
                                remote_error,
                            },
                            Err(defect) => {
                                tracing::error!(error = %defect, "Heuristic fallback failed");
                                Step::HardFailure(hard_failure(remote_error, defect))
                            }
                        }
                    }
                    Step::Success {
                        source,
                        data,
                        remote_error,
                    } => {
                        tracing::info!(source = ?source, "Analysis complete");
                        return Ok(AnalysisResult {
                            task: schema.id,
                            source,
                            data,
                            remote_error: remote_error.map(|e| e.to_string()),
                            call_id,
                            completed_at: Utc::now(),
                        });
                    }
                    Step::HardFailure(e) => return Err(e),
                };
                tracing::debug!(from = ?from, to = ?step.state(), "state transition");
            }
        }
        .instrument(span)
        .await
    }

    async fn remote_attempt(
        &self,
        client: &dyn InferenceClient,
        schema: &TaskSchema,
        input: &AnalysisInput,
        language: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Value> {
        let request = prompts::compile(schema, input, language)?.into_request();
        let timeout_ms = self.settings.remote_timeout.as_millis() as u64;
        tracing::debug!(client = client.name(), timeout_ms, "Sending remote inference request");

        let call = tokio::time::timeout(self.settings.remote_timeout, client.complete(&request));
        let outcome = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    return Err(MarketMindError::Cancelled {
                        operation: "remote inference".to_string(),
                    });
                }
                outcome = call => outcome,
            },
            None => call.await,
        };

        let text = match outcome {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                return Err(MarketMindError::Timeout {
                    operation: "remote inference".to_string(),
                    timeout_ms,
                });
            }
        };

        let candidate = self
            .extractor
            .extract(Some(text.as_str()).filter(|t| !t.trim().is_empty()))?;
        let (data, drift) = sanitize_tracked(&schema.template, &candidate);
        if !drift.is_clean() {
            tracing::debug!(?drift, "Remote output normalized to template");
        }
        if self.settings.verify_conformance && !schema.template.conforms(&data) {
            return Err(MarketMindError::MalformedOutput {
                message: format!("remote output for {} does not match its template", schema.id),
            });
        }
        Ok(data)
    }

    fn heuristic_path(
        &self,
        schema: &TaskSchema,
        input: &AnalysisInput,
        description: &str,
    ) -> Result<Value> {
        let produced = catch_unwind(AssertUnwindSafe(|| {
            let auxiliary = input.auxiliary_text();
            let report = self.engine.analyze(input.name(), description, &auxiliary);
            fallback::map_report(schema, &report)
        }));

        match produced {
            Ok(result) => result,
            Err(_) => Err(MarketMindError::HeuristicDefect {
                message: format!("heuristic mapping for {} panicked", schema.id),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_failure_prefers_the_remote_error() {
        let err = hard_failure(
            Some(MarketMindError::Remote {
                message: "503".into(),
            }),
            MarketMindError::HeuristicDefect {
                message: "bad".into(),
            },
        );
        assert!(matches!(err, MarketMindError::Remote { message } if message == "503"));
    }

    #[test]
    fn hard_failure_without_remote_is_a_defect() {
        let err = hard_failure(
            None,
            MarketMindError::HeuristicDefect {
                message: "bad".into(),
            },
        );
        assert!(matches!(err, MarketMindError::HeuristicDefect { .. }));
    }

    #[test]
    fn remote_path_errors_are_recoverable() {
        use crate::clients::InferenceError;

        let expected = [
            MarketMindError::from(InferenceError::Unauthorized),
            MarketMindError::from(InferenceError::RateLimited),
            MarketMindError::from(InferenceError::Timeout { timeout_ms: 10 }),
            MarketMindError::Cancelled {
                operation: "remote inference".into(),
            },
            MarketMindError::MalformedOutput {
                message: "no JSON".into(),
            },
        ];
        for err in expected {
            assert!(err.is_recoverable(), "{}", err);
        }
        assert!(
            !MarketMindError::Internal {
                message: "bug".into()
            }
            .is_recoverable()
        );
    }

    #[test]
    fn offline_config_has_no_client() {
        let mut config = Config::default();
        config.remote.enabled = false;
        let orchestrator = AnalysisOrchestrator::from_config(&config);
        assert!(!orchestrator.has_remote());
        assert_eq!(orchestrator.registry().iter().count(), 4);
    }

    #[tokio::test]
    async fn unknown_task_is_rejected_before_any_path_runs() {
        let mut config = Config::default();
        config.remote.enabled = false;
        let orchestrator = AnalysisOrchestrator::from_config(&config);
        let err = orchestrator
            .analyze("horoscope", Map::new(), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, MarketMindError::UnknownTask { .. }));
    }
}
