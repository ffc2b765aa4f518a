//! Completion providers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use verdict_core::{ChatMessage, Error, Result};

/// Text in, text out.
///
/// Implementations must be shareable across tasks; the DUET runner queries
/// both models of a round concurrently.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete a conversation with `model`, returning the assistant text
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String>;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Sampling settings sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionSettings {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_temperature() -> f32 {
    1.0
}

fn default_max_tokens() -> u32 {
    1024
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_completion_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Any endpoint speaking the OpenAI chat completions protocol (Groq, OpenAI,
/// vLLM, ...)
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    settings: CompletionSettings,
}

impl OpenAiCompatibleProvider {
    /// Create a provider for `base_url` (e.g. `https://api.groq.com/openai/v1`)
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        settings: CompletionSettings,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| Error::provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            settings,
        })
    }

    /// Create a provider whose API key is read from the environment variable `key_var`
    pub fn from_env(
        base_url: impl Into<String>,
        key_var: &str,
        settings: CompletionSettings,
    ) -> Result<Self> {
        let api_key = std::env::var(key_var)
            .map_err(|_| Error::config(format!("{} not found in environment", key_var)))?;
        Self::new(base_url, api_key, settings)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatCompletionRequest {
            model,
            messages,
            temperature: self.settings.temperature,
            max_completion_tokens: self.settings.max_tokens,
            top_p: 1.0,
            stream: false,
        };

        debug!(model, messages = messages.len(), "sending completion request");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::provider(format!("{} request failed: {}", model, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider(format!(
                "{} returned {}: {}",
                model, status, body
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(format!("{} sent an unreadable response: {}", model, e)))?;
        extract_content(model, body)
    }

    fn name(&self) -> &str {
        "openai_compatible"
    }
}

fn extract_content(model: &str, body: ChatCompletionResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| Error::provider(format!("{} returned no message content", model)))
}
