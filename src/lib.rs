pub mod clients;
pub mod config;
pub mod error;
pub mod extraction;
pub mod fallback;
pub mod features;
pub mod heuristics;
pub mod orchestrator;
pub mod prompts;
pub mod schema;
pub mod taxonomy;
pub mod types;

pub use error::{MarketMindError, Result};
pub use orchestrator::{AnalysisOrchestrator, AnalysisState, OrchestratorSettings};
pub use schema::{TaskId, TaskRegistry};
pub use taxonomy::Taxonomy;
pub use types::{AnalysisInput, AnalysisResult, ResultSource};
