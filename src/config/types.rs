use anyhow::anyhow;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::AnalysisWindow;

use super::constants::DEFAULT_OPENROUTER_BASE_URL;

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub models: ModelSettings,
    pub analysis: AnalysisSettings,
    pub sources: SourceSettings,
}

impl Config {
    /// Whether narrative stages can reach a language model at all.
    pub fn has_llm(&self) -> bool {
        !self.llm.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub api_key: String,
    pub timeout_secs: u64,
    pub base_url: String,
    pub user_agent: String,
    /// Only sent to Azure deployments.
    pub api_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LlmProvider {
    OpenRouter,
    Azure,
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::OpenRouter => write!(f, "openrouter"),
            LlmProvider::Azure => write!(f, "azure"),
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openrouter" => Ok(LlmProvider::OpenRouter),
            "azure" => Ok(LlmProvider::Azure),
            other => Err(anyhow!("Unknown LLM provider '{other}'")),
        }
    }
}

impl LlmProvider {
    /// Azure endpoints are per-resource, so there is no shared default.
    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::OpenRouter => DEFAULT_OPENROUTER_BASE_URL,
            LlmProvider::Azure => "",
        }
    }

    pub fn api_key_env_var(self) -> &'static str {
        match self {
            LlmProvider::OpenRouter => "OPENROUTER_API_KEY",
            LlmProvider::Azure => "AZURE_OPENAI_API_KEY",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LlmProvider::OpenRouter => "OpenRouter",
            LlmProvider::Azure => "Azure OpenAI",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// Model name, or deployment name on Azure.
    pub narrative: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
}

impl AnalysisSettings {
    pub fn window(&self) -> AnalysisWindow {
        AnalysisWindow::new(self.start, self.end)
    }
}

/// Fallback credentials for the collection stage.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub proxycurl_api_key: Option<String>,
    pub proxycurl_base_url: String,
    pub linkedin_base_url: String,
    pub li_at: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

// File configuration types
#[derive(Debug, Default, Deserialize)]
pub(super) struct FileConfig {
    #[serde(default)]
    pub llm: Option<FileLlmSettings>,
    #[serde(default)]
    pub models: Option<FileModelSettings>,
    #[serde(default)]
    pub analysis: Option<FileAnalysisSettings>,
    #[serde(default)]
    pub sources: Option<FileSourceSettings>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FileLlmSettings {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub api_version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FileModelSettings {
    pub narrative: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FileAnalysisSettings {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FileSourceSettings {
    pub proxycurl_api_key: Option<String>,
    pub proxycurl_base_url: Option<String>,
    pub linkedin_base_url: Option<String>,
    pub li_at: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

// Serialization helpers
#[derive(Serialize)]
pub(super) struct PersistedConfig<'a> {
    pub llm: PersistedLlm<'a>,
    pub models: PersistedModels<'a>,
    pub analysis: PersistedAnalysis,
    pub sources: PersistedSources<'a>,
}

#[derive(Serialize)]
pub(super) struct PersistedLlm<'a> {
    pub provider: LlmProvider,
    pub api_key: &'a str,
    pub timeout_secs: u64,
    pub base_url: &'a str,
    pub user_agent: &'a str,
    pub api_version: &'a str,
}

#[derive(Serialize)]
pub(super) struct PersistedModels<'a> {
    pub narrative: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Serialize)]
pub(super) struct PersistedAnalysis {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Serialize)]
pub(super) struct PersistedSources<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxycurl_api_key: Option<&'a str>,
    pub proxycurl_base_url: &'a str,
    pub linkedin_base_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub li_at: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
}

impl<'a> From<&'a Config> for PersistedConfig<'a> {
    fn from(config: &'a Config) -> Self {
        PersistedConfig {
            llm: PersistedLlm {
                provider: config.llm.provider,
                api_key: &config.llm.api_key,
                timeout_secs: config.llm.timeout_secs,
                base_url: &config.llm.base_url,
                user_agent: &config.llm.user_agent,
                api_version: &config.llm.api_version,
            },
            models: PersistedModels {
                narrative: &config.models.narrative,
                max_tokens: config.models.max_tokens,
                temperature: config.models.temperature,
            },
            analysis: PersistedAnalysis {
                start: config.analysis.start,
                end: config.analysis.end,
            },
            sources: PersistedSources {
                proxycurl_api_key: config.sources.proxycurl_api_key.as_deref(),
                proxycurl_base_url: &config.sources.proxycurl_base_url,
                linkedin_base_url: &config.sources.linkedin_base_url,
                li_at: config.sources.li_at.as_deref(),
                email: config.sources.email.as_deref(),
                password: config.sources.password.as_deref(),
            },
        }
    }
}
