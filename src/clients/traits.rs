use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One role-tagged message sent to the remote model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Everything a remote model needs for one completion
#[derive(Debug, Clone, Serialize)]
pub struct InferenceRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    pub instruction: String,
}

#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("remote rejected credentials")]
    Unauthorized,
    #[error("remote quota exhausted")]
    RateLimited,
    #[error("remote returned no content")]
    EmptyResponse,
    #[error("remote timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Opaque generative text service. Returns raw text; callers own parsing.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: &InferenceRequest) -> Result<String, InferenceError>;
}
