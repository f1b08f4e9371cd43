//! Chat-completion client for the planner and the code executor.
//!
//! Speaks the OpenAI-compatible chat completions API so any hosted provider
//! (Together, OpenAI, a local server) works by pointing `endpoint` at it.

pub mod parser;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single chat completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// Errors from the LLM transport and response handling.
#[derive(Debug)]
pub enum LlmError {
    /// Transport-level failure (connect, timeout, TLS, ...).
    Http(String),
    /// The API answered with a non-success status or an unusable body.
    Response(String),
    /// The body was not valid JSON of the expected shape.
    Serialization(String),
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::Http(msg) => write!(f, "http error: {}", msg),
            LlmError::Response(msg) => write!(f, "response error: {}", msg),
            LlmError::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for LlmError {}

/// Abstraction over the chat model so planning and code generation can be
/// tested without network access.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

/// Configuration for [`HttpLlmClient`].
#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    /// Full chat completions URL, e.g.
    /// `https://api.together.xyz/v1/chat/completions`.
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// HTTP client for an OpenAI-compatible chat completions endpoint.
pub struct HttpLlmClient {
    client: reqwest::Client,
    config: LlmClientConfig,
}

impl HttpLlmClient {
    pub fn new(config: LlmClientConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequestBody {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
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

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let body = ChatRequestBody {
            model: request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut builder = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Response(format!("HTTP {}: {}", status, text)));
        }

        let parsed: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| LlmError::Serialization(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::Response("missing choices".to_string()))
    }
}

/// Canned-response client for tests.
pub struct MockLlmClient {
    pub response: String,
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, LlmError> {
        Ok(self.response.clone())
    }
}
