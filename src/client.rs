use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{LlmProvider, LlmSettings};

/// Chat-completion backend used by the narrative stages.
#[async_trait]
pub trait ChatClient {
    async fn chat_completion(&self, request: ChatCompletionRequest)
    -> Result<ChatCompletionResponse>;
}

pub type DynChatClient = dyn ChatClient + Send + Sync;

#[derive(Debug, Clone)]
pub struct AIClient {
    http: Client,
    base_url: String,
    api_key: String,
    user_agent: String,
    provider: LlmProvider,
    api_version: String,
}

impl AIClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let base_url = settings.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(anyhow!(
                "{} base URL cannot be empty",
                settings.provider.display_name()
            ));
        }

        let timeout = Duration::from_secs(settings.timeout_secs);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            api_key: settings.api_key.clone(),
            user_agent: settings.user_agent.clone(),
            provider: settings.provider,
            api_version: settings.api_version.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        match self.provider {
            LlmProvider::OpenRouter => format!("{}/chat/completions", self.base_url),
            LlmProvider::Azure => format!(
                "{}/openai/deployments/{}/chat/completions",
                self.base_url, model
            ),
        }
    }
}

#[async_trait]
impl ChatClient for AIClient {
    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let url = self.endpoint(&request.model);
        debug!(provider = %self.provider, model = %request.model, "sending chat completion");

        let mut req_builder = self
            .http
            .post(&url)
            .header("User-Agent", &self.user_agent)
            .header("Content-Type", "application/json");

        req_builder = match self.provider {
            LlmProvider::OpenRouter => req_builder
                .bearer_auth(&self.api_key)
                .header("X-Title", "laie"),
            LlmProvider::Azure => req_builder
                .header("api-key", &self.api_key)
                .query(&[("api-version", self.api_version.as_str())]),
        };

        let response = req_builder
            .json(&request)
            .send()
            .await
            .context("Failed to send request to chat completions endpoint")?;

        match response.status() {
            reqwest::StatusCode::OK => response
                .json::<ChatCompletionResponse>()
                .await
                .context("Failed to parse chat completion response JSON"),
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                let error_text = response.text().await.unwrap_or_default();
                Err(anyhow!(
                    "Rate limit exceeded. Please wait before trying again. (API response: {})",
                    error_text
                ))
            }
            reqwest::StatusCode::UNAUTHORIZED => Err(anyhow!(
                "Invalid API key. Please check your API key configuration."
            )),
            reqwest::StatusCode::BAD_REQUEST => {
                let error_text = response.text().await.unwrap_or_default();
                Err(anyhow!("Invalid request: {}", error_text))
            }
            reqwest::StatusCode::INTERNAL_SERVER_ERROR
            | reqwest::StatusCode::SERVICE_UNAVAILABLE => Err(anyhow!(
                "Service is temporarily unavailable. Please try again later."
            )),
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(anyhow!("API error (status {}): {}", status, error_text))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatMessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

impl ChatCompletionResponse {
    /// Trimmed content of the first choice.
    pub fn first_content(self) -> Result<String> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Model returned no choices"))?;

        let content = choice.message.content.trim().to_string();
        if content.is_empty() {
            return Err(anyhow!("Model response was empty"));
        }
        Ok(content)
    }
}
