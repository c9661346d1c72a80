//! Chat-completion backend used for SEO content generation

use super::JsonClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Text-in / text-out chat backend
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send a prompt and return the raw text reply
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Chat backend settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// OpenAI-compatible API base URL
    pub base_url: String,
    /// Optional bearer token
    pub api_key: Option<String>,
    /// Model identifier sent with every request
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "http://chat-gateway:8080".to_string(),
            api_key: None,
            model: "gpt-4".to_string(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

/// OpenAI-compatible `/v1/chat/completions` client
pub struct OpenAiChatClient {
    http: JsonClient,
    config: ChatConfig,
}

impl OpenAiChatClient {
    pub fn new(config: ChatConfig) -> Result<Self> {
        let http = JsonClient::new(&config.base_url, Duration::from_secs(config.timeout_secs))
            .context("Invalid chat backend URL")?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model, prompt_chars = prompt.len(), "Sending chat completion");

        let response: ChatCompletionResponse = self
            .http
            .post_with_auth("v1/chat/completions", &request, self.config.api_key.as_deref())
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("Chat backend returned no choices")
    }
}
