use serde::{Deserialize, Serialize};

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8111";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MIN_TIMEOUT_MS: u64 = 1_000;
const MAX_TIMEOUT_MS: u64 = 300_000;

/// Main configuration structure loaded from market_mind.toml and environment variables
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Remote inference endpoint settings (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub timeout_ms: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: 30_000,
            max_tokens: 2_000,
            temperature: 0.2,
        }
    }
}

impl RemoteConfig {
    /// Endpoint with the chat completions path appended when missing
    pub fn completions_url(&self) -> String {
        if self.endpoint.ends_with("/v1/chat/completions") {
            self.endpoint.clone()
        } else {
            format!("{}/v1/chat/completions", self.endpoint.trim_end_matches('/'))
        }
    }
}

/// Analysis behavior shared by both producers
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub default_language: String,
    /// Re-check shape conformance on every produced result
    pub verify_conformance: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            verify_conformance: true,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub api_key: Option<String>,
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            log_level: "market_mind=info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        Self {
            api_key: std::env::var("MKT_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "market_mind=info".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses MARKET_MIND_CONFIG environment variable or defaults to "market_mind.toml"
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(env_path) = std::env::var("MKT_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path = std::env::var("MARKET_MIND_CONFIG")
            .unwrap_or_else(|_| "market_mind.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            toml::from_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Apply MKT_* environment overrides (env-first)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(enabled) = std::env::var("MKT_REMOTE_ENABLED") {
            self.remote.enabled = enabled == "1" || enabled.eq_ignore_ascii_case("true");
        }
        if let Ok(offline) = std::env::var("MKT_OFFLINE")
            && (offline == "1" || offline.eq_ignore_ascii_case("true"))
        {
            self.remote.enabled = false;
            tracing::debug!("MKT_OFFLINE set, remote inference disabled");
        }
        if let Ok(endpoint) = std::env::var("MKT_REMOTE_ENDPOINT") {
            self.remote.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("MKT_REMOTE_MODEL") {
            self.remote.model = model;
        }
        if let Some(timeout) = std::env::var("MKT_REMOTE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.remote.timeout_ms = timeout;
        }
        if let Some(max_tokens) = std::env::var("MKT_REMOTE_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            self.remote.max_tokens = max_tokens;
        }
        if let Ok(language) = std::env::var("MKT_LANGUAGE")
            && !language.trim().is_empty()
        {
            self.analysis.default_language = language.trim().to_string();
        }
    }

    /// Validate and clamp values in place
    pub fn validate(&mut self) -> anyhow::Result<()> {
        if !self.remote.endpoint.starts_with("http://")
            && !self.remote.endpoint.starts_with("https://")
        {
            anyhow::bail!(
                "Remote endpoint '{}' must start with http:// or https://",
                self.remote.endpoint
            );
        }

        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.remote.timeout_ms) {
            let clamped = self.remote.timeout_ms.clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS);
            tracing::warn!(
                "remote timeout_ms {} outside {}..={}, clamping to {}",
                self.remote.timeout_ms,
                MIN_TIMEOUT_MS,
                MAX_TIMEOUT_MS,
                clamped
            );
            self.remote.timeout_ms = clamped;
        }

        if !(0.0..=2.0).contains(&self.remote.temperature) {
            tracing::warn!(
                "remote temperature {} outside 0.0..=2.0, clamping",
                self.remote.temperature
            );
            self.remote.temperature = self.remote.temperature.clamp(0.0, 2.0);
        }

        if self.analysis.default_language.trim().is_empty() {
            self.analysis.default_language = "en".to_string();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_normalization() {
        let mut remote = RemoteConfig::default();
        assert_eq!(
            remote.completions_url(),
            "http://127.0.0.1:8111/v1/chat/completions"
        );
        remote.endpoint = "https://api.example.com/".to_string();
        assert_eq!(
            remote.completions_url(),
            "https://api.example.com/v1/chat/completions"
        );
        remote.endpoint = "https://api.example.com/v1/chat/completions".to_string();
        assert_eq!(remote.completions_url(), remote.endpoint);
    }

    #[test]
    fn test_toml_partial_sections_use_defaults() {
        let config: Config = toml::from_str(
            r#"
            [remote]
            model = "local-model"
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.remote.model, "local-model");
        assert!(!config.remote.enabled);
        assert_eq!(config.remote.timeout_ms, 30_000);
        assert_eq!(config.analysis.default_language, "en");
    }

    #[test]
    fn test_validate_clamps_and_rejects() {
        let mut config = Config::default();
        config.remote.timeout_ms = 5;
        config.remote.temperature = 9.0;
        config.validate().unwrap();
        assert_eq!(config.remote.timeout_ms, MIN_TIMEOUT_MS);
        assert_eq!(config.remote.temperature, 2.0);

        config.remote.endpoint = "127.0.0.1:8111".to_string();
        assert!(config.validate().is_err());
    }
}
