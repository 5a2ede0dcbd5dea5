//! LLM Client: the single point of entry for all model calls in the tagging service.
//!
//! ARCHITECTURAL RULE: No other module may call a model provider directly.
//! All LLM interactions go through the `ModelClient` trait defined here.
//!
//! The production implementation speaks the OpenAI-compatible chat completions API
//! (Alibaba DashScope compatible mode by default). There is no retry loop: a failed or
//! timed-out call is surfaced to the caller immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

/// DashScope's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// A model that callers may select.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelOption {
    pub id: &'static str,
    pub label: &'static str,
}

/// Models served through the compatible-mode endpoint.
pub const AVAILABLE_MODELS: &[ModelOption] = &[
    ModelOption {
        id: "deepseek-chat",
        label: "DeepSeek",
    },
    ModelOption {
        id: "qwen-plus",
        label: "Qwen Plus",
    },
    ModelOption {
        id: "qwen-max",
        label: "Qwen Max",
    },
    ModelOption {
        id: "qwen-turbo",
        label: "Qwen Turbo",
    },
    ModelOption {
        id: "baichuan2-turbo",
        label: "Baichuan2 Turbo",
    },
    ModelOption {
        id: "yi-large",
        label: "Yi Large",
    },
];

pub fn is_available_model(id: &str) -> bool {
    AVAILABLE_MODELS.iter().any(|m| m.id == id)
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model call timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Which model to call and how.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub model: String,
    pub temperature: f32,
}

/// A prompt ready to send: an optional system instruction plus the user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
}

/// The model collaborator. Implement this to swap providers without touching the pipeline.
///
/// Carried in `AppState` as `Arc<dyn ModelClient>`.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends the prompt and returns the raw text of the model's reply.
    async fn send(&self, prompt: &Prompt, model: &ModelConfig) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (OpenAI-compatible chat completions)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl<'a> ChatRequest<'a> {
    fn new(prompt: &'a Prompt, model: &'a ModelConfig) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = prompt.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &prompt.user,
        });
        Self {
            model: &model.model,
            temperature: model.temperature,
            messages,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmClient (OpenAI-compatible)
// ────────────────────────────────────────────────────────────────────────────

/// HTTP client for an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ModelClient for LlmClient {
    async fn send(&self, prompt: &Prompt, model: &ModelConfig) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request_body = ChatRequest::new(prompt, model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await.map_err(map_transport_error)?;

        if let Some(usage) = &chat.usage {
            debug!(
                model = %model.model,
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

fn map_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Http(e)
    }
}
