//! Chat-completion transport.
//!
//! [`OpenAiCompatClient`] speaks the OpenAI Chat Completions wire format,
//! which the Gemini API also serves under its `/openai` path. One request
//! per call; no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::GenerationError;

/// Sampling temperature used for every planning request.
pub const TEMPERATURE: f32 = 0.5;

/// A stateless text-completion backend.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send `prompt` as a single user message to `model_id` and return the
    /// text of the first choice.
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, GenerationError>;
}

/// Connection settings for the generation endpoint.
#[derive(Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    pub timeout: Duration,
}

impl GenerationConfig {
    pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Config with the default endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for an OpenAI-compatible chat completions endpoint.
pub struct OpenAiCompatClient {
    url: String,
    api_key: String,
    http: Client,
}

impl OpenAiCompatClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        debug!(?config, "OpenAiCompatClient::new");
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            url: config.completions_url(),
            api_key: config.api_key.clone(),
            http,
        })
    }
}

#[async_trait]
impl ChatCompletion for OpenAiCompatClient {
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: model_id,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        debug!(url = %self.url, model = model_id, prompt_len = prompt.len(), "sending completion request");
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}
