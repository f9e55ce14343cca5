//! LLM-backed stages and the text-generation service boundary
//!
//! Works with any OpenAI-compatible chat-completions endpoint (Groq, OpenAI,
//! vLLM, Ollama).

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use swarm_core::{ExecutionContext, Stage, StageError};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
/// Upper bound for one LLM stage call, on top of the HTTP client timeout.
pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 180;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const MODEL_VAR: &str = "SWARM_MODEL";
pub const BASE_URL_VAR: &str = "SWARM_BASE_URL";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("LLM/CLIENT: {0}")]
    Client(String),

    #[error("LLM/NETWORK: {0}")]
    Network(String),

    #[error("LLM/AUTH: authentication failed")]
    AuthenticationFailed,

    #[error("LLM/RATE: rate limited")]
    RateLimited,

    #[error("LLM/API: status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("LLM/PARSE: {0}")]
    Parse(String),

    #[error("LLM/EMPTY: response had no content")]
    EmptyResponse,
}

/// A service that turns a prompt into text.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError>;
}

/// Connection settings for [`ChatCompletionsClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// Overrides key, model and base URL from `lookup`; blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup(API_KEY_VAR) {
            self.api_key = Some(key);
        }
        if let Some(model) = lookup(MODEL_VAR) {
            self.model = model;
        }
        if let Some(url) = lookup(BASE_URL_VAR) {
            self.base_url = url;
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub(crate) struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    pub content: Option<String>,
}

/// Blocking OpenAI-compatible chat-completions client.
pub struct ChatCompletionsClient {
    client: Client,
    config: LlmConfig,
}

impl ChatCompletionsClient {
    pub fn new(config: LlmConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub(crate) fn build_request(&self, system_prompt: &str, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

impl TextGenerator for ChatCompletionsClient {
    fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
        let request = self.build_request(system_prompt, prompt);
        debug!(model = %request.model, prompt_chars = prompt.len(), "chat completion request");

        let mut req = self.client.post(self.endpoint()).json(&request);
        if let Some(api_key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            req = req.bearer_auth(api_key);
        }

        let response = req
            .send()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        check_status(status, &body)?;
        parse_completion(&body)
    }
}

pub(crate) fn check_status(status: u16, body: &str) -> Result<(), GenerationError> {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(GenerationError::AuthenticationFailed),
        429 => Err(GenerationError::RateLimited),
        _ => Err(GenerationError::Api {
            status,
            message: body.to_string(),
        }),
    }
}

pub(crate) fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Parse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}

/// Agent whose work is a single LLM call under a fixed system prompt.
pub struct LlmStage {
    id: String,
    system_prompt: String,
    generator: Arc<dyn TextGenerator>,
}

impl LlmStage {
    pub fn new(
        id: impl Into<String>,
        system_prompt: impl Into<String>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            id: id.into(),
            system_prompt: system_prompt.into(),
            generator,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

impl Stage for LlmStage {
    fn id(&self) -> &str {
        &self.id
    }

    fn deterministic(&self) -> bool {
        false
    }

    fn run(&self, input: &str, ctx: &ExecutionContext) -> Result<String, StageError> {
        debug!(trace_id = %ctx.trace_id, stage = %self.id, "calling text generator");
        self.generator
            .generate(&self.system_prompt, input)
            .map_err(|e| StageError::ExecutionFailed(e.to_string()))
    }
}
