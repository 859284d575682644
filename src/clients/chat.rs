use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;

use crate::clients::traits::{ChatMessage, InferenceClient, InferenceError, InferenceRequest};
use crate::config::{Config, RemoteConfig};

/// Client for any OpenAI-compatible `/v1/chat/completions` endpoint
#[derive(Clone, Debug)]
pub struct ChatCompletionsClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
    timeout_ms: u64,
    client: Client,
}

impl ChatCompletionsClient {
    pub fn new(remote: &RemoteConfig, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(remote.timeout_ms))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: remote.completions_url(),
            model: remote.model.clone(),
            api_key,
            max_tokens: remote.max_tokens,
            temperature: remote.temperature,
            timeout_ms: remote.timeout_ms,
            client,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.remote, config.runtime.api_key.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_body(&self, request: &InferenceRequest) -> Value {
        let mut messages = vec![ChatMessage::system(&request.instruction)];
        messages.extend(request.messages.iter().cloned());

        if let Some(ctx) = &request.context {
            let rendered = serde_json::to_string_pretty(ctx).unwrap_or_else(|_| ctx.to_string());
            messages.push(ChatMessage::user(format!("Context:\n{}", rendered)));
        }

        json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> InferenceError {
        if err.is_timeout() {
            InferenceError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            InferenceError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl InferenceClient for ChatCompletionsClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &InferenceRequest) -> Result<String, InferenceError> {
        let body = self.build_body(request);

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let res = builder.send().await.map_err(|e| self.map_send_error(e))?;

        let status = res.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => InferenceError::Unauthorized,
                StatusCode::TOO_MANY_REQUESTS => InferenceError::RateLimited,
                _ => InferenceError::Status {
                    status: status.as_u16(),
                    body: res.text().await.unwrap_or_default(),
                },
            });
        }

        let response_json: Value = res
            .json()
            .await
            .map_err(|e| InferenceError::Transport(format!("invalid response body: {}", e)))?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .unwrap_or("");

        if content.is_empty() {
            return Err(InferenceError::EmptyResponse);
        }

        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_places_instruction_first_and_context_last() {
        let client = ChatCompletionsClient::new(&RemoteConfig::default(), None);
        let request = InferenceRequest {
            messages: vec![ChatMessage::user("payload")],
            context: Some(json!({"task": "brand_evaluation"})),
            instruction: "Respond with JSON only.".to_string(),
        };
        let body = client.build_body(&request);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "Respond with JSON only.");
        assert_eq!(messages[1]["content"], "payload");
        assert!(
            messages[2]["content"]
                .as_str()
                .unwrap()
                .contains("brand_evaluation")
        );
        assert_eq!(body["max_tokens"], 2000);
    }

    #[test]
    fn endpoint_is_normalized() {
        let client = ChatCompletionsClient::new(&RemoteConfig::default(), None);
        assert!(client.endpoint().ends_with("/v1/chat/completions"));
    }
}
