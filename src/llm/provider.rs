// src/llm/provider.rs
//! Chat provider abstraction over OpenAI-compatible HTTP backends

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Failure classes a provider can report. Classification is done from the
/// HTTP status code, never by matching error-message text.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rate limited")]
    RateLimited,
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("malformed provider output: {0}")]
    MalformedOutput(String),
}

/// One logical generative request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Issue the request and return the raw completion text.
    async fn chat(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}

// ===== Wire Types =====

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// A (provider, credential) pair over the OpenAI-compatible chat completions
/// protocol. Both Groq and OpenRouter speak it.
pub struct HttpChatProvider {
    name: String,
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpChatProvider {
    pub fn new(name: &str, base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            name: name.to_string(),
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn groq(name: &str, api_key: &str, model: &str) -> Result<Self> {
        Self::new(name, GROQ_BASE_URL, api_key, model)
    }

    pub fn openrouter(name: &str, api_key: &str, model: &str) -> Result<Self> {
        Self::new(name, OPENROUTER_BASE_URL, api_key, model)
    }
}

#[async_trait]
impl ChatProvider for HttpChatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt.clone(),
                },
            ],
            temperature: request.temperature,
        };

        debug!(provider = %self.name, model = %self.model, "generative chat request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Unavailable(format!(
                "HTTP {} from {}: {}",
                status, self.name, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedOutput(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                ProviderError::MalformedOutput(format!("{} returned no choices", self.name))
            })
    }
}
