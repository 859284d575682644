//! Domain-specific error types for market-mind

use thiserror::Error;

use crate::clients::InferenceError;

/// Main error type for the analysis pipeline
#[derive(Error, Debug)]
pub enum MarketMindError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Remote inference error: {message}")]
    Remote { message: String },

    #[error("Timeout error: {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Cancelled: {operation}")]
    Cancelled { operation: String },

    #[error("Malformed output: {message}")]
    MalformedOutput { message: String },

    #[error("Unknown task: {task}")]
    UnknownTask { task: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Heuristic defect: {message}")]
    HeuristicDefect { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl MarketMindError {
    /// Whether the fallback path should absorb this error.
    /// Transport, timeout, cancellation and malformed output are all recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MarketMindError::Remote { .. }
                | MarketMindError::Timeout { .. }
                | MarketMindError::Cancelled { .. }
                | MarketMindError::MalformedOutput { .. }
                | MarketMindError::Serialization { .. }
        )
    }
}

impl From<anyhow::Error> for MarketMindError {
    fn from(err: anyhow::Error) -> Self {
        MarketMindError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MarketMindError {
    fn from(err: serde_json::Error) -> Self {
        MarketMindError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for MarketMindError {
    fn from(err: reqwest::Error) -> Self {
        MarketMindError::Remote {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<InferenceError> for MarketMindError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Timeout { timeout_ms } => MarketMindError::Timeout {
                operation: "remote inference".to_string(),
                timeout_ms,
            },
            other => MarketMindError::Remote {
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias for market-mind operations
pub type Result<T> = std::result::Result<T, MarketMindError>;
