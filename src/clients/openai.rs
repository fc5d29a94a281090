//! OpenAI-compatible chat-completions client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::clients::traits::{ChatMessage, ClientError, CompletionClient};
use crate::config::LlmConfig;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self, ClientError> {
        let endpoint = if config.base_url.ends_with("/chat/completions") {
            config.base_url.clone()
        } else {
            format!("{}/chat/completions", config.base_url.trim_end_matches('/'))
        };

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ClientError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, messages: &[ChatMessage]) -> Value {
        json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }
}

/// `choices[0].message.content`, if present and non-empty
pub fn extract_content(response: &Value) -> Option<&str> {
    response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(messages))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let val: Value = res.json().await?;
        extract_content(&val)
            .map(str::to_string)
            .ok_or(ClientError::EmptyContent)
    }
}
