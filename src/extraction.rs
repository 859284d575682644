//! Response extraction: recover a JSON object from raw model text.
//!
//! Strategies run in order and the first one that yields an object wins.
//! New repair passes can be appended without touching the orchestrator.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{MarketMindError, Result};

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)```").unwrap());
static FENCE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[A-Za-z0-9_+-]*").unwrap());

/// One way of turning raw text into a structured candidate
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, raw: &str) -> Option<Value>;
}

/// Remove markdown code fences, keeping the first fenced block's body if any
pub fn strip_fences(raw: &str) -> String {
    if let Some(body) = FENCED_BLOCK.captures(raw).and_then(|c| c.get(1)) {
        return body.as_str().trim().to_string();
    }
    FENCE_MARKER.replace_all(raw, "").trim().to_string()
}

fn parse_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// The text is already a JSON object
pub struct StrictParse;

impl ExtractionStrategy for StrictParse {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn extract(&self, raw: &str) -> Option<Value> {
        parse_object(raw)
    }
}

/// JSON wrapped in a ```json fence
pub struct FenceStripped;

impl ExtractionStrategy for FenceStripped {
    fn name(&self) -> &'static str {
        "fence_stripped"
    }

    fn extract(&self, raw: &str) -> Option<Value> {
        parse_object(&strip_fences(raw))
    }
}

/// Last resort: slice from the first `{` to the last `}`
pub struct BraceSliced;

impl ExtractionStrategy for BraceSliced {
    fn name(&self) -> &'static str {
        "brace_sliced"
    }

    fn extract(&self, raw: &str) -> Option<Value> {
        let cleaned = strip_fences(raw);
        let candidate = if cleaned.contains('{') { cleaned.as_str() } else { raw };
        let start = candidate.find('{')?;
        let end = candidate.rfind('}')?;
        if end <= start {
            return None;
        }
        parse_object(&candidate[start..=end])
    }
}

/// Ordered list of extraction strategies
pub struct ResponseExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl ResponseExtractor {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// strict -> fence-stripped -> brace-sliced
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(StrictParse),
            Box::new(FenceStripped),
            Box::new(BraceSliced),
        ])
    }

    /// Append a repair pass after the existing ones
    pub fn with_strategy(mut self, strategy: Box<dyn ExtractionStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Absent text is a remote failure; unparseable text is malformed output
    pub fn extract(&self, raw: Option<&str>) -> Result<Value> {
        let raw = raw.ok_or_else(|| MarketMindError::Remote {
            message: "remote returned no text".to_string(),
        })?;

        for strategy in &self.strategies {
            if let Some(value) = strategy.extract(raw) {
                tracing::debug!(strategy = strategy.name(), "extracted structured response");
                return Ok(value);
            }
        }

        let preview: String = raw.chars().take(120).collect();
        Err(MarketMindError::MalformedOutput {
            message: format!("no JSON object found in response: {:?}", preview),
        })
    }
}

impl Default for ResponseExtractor {
    fn default() -> Self {
        Self::standard()
    }
}
