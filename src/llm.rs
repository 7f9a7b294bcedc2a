// 🤖 Text Generation - the external AI collaborator
// One operation: system instruction + prompt + model → text.

use crate::config::{AdvisorConfig, ApiKey};
use crate::error::GenerationError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub model: String,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

// ============================================================================
// OPENAI-COMPATIBLE CLIENT
// ============================================================================

/// Chat Completions client (OpenAI or any compatible endpoint).
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: ApiKey, timeout: Duration) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(OpenAiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// `None` when no credential is configured.
    pub fn from_config(config: &AdvisorConfig) -> Result<Option<Self>, GenerationError> {
        match &config.api_key {
            Some(key) => Ok(Some(Self::new(&config.base_url, key.clone(), config.timeout)?)),
            None => Ok(None),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = chat_body(request);
        debug!(model = %request.model, "calling text generation service");

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = resp.json().await?;
        completion_text(&value)
    }
}

fn chat_body(request: &GenerationRequest) -> serde_json::Value {
    serde_json::json!({
        "model": request.model,
        "messages": [
            {"role": "system", "content": request.system},
            {"role": "user", "content": request.prompt}
        ],
        "temperature": 0.2
    })
}

fn completion_text(value: &serde_json::Value) -> Result<String, GenerationError> {
    value
        .pointer("/choices/0/message/content")
        .and_then(|content| content.as_str())
        .filter(|content| !content.trim().is_empty())
        .map(str::to_string)
        .ok_or(GenerationError::EmptyCompletion)
}
