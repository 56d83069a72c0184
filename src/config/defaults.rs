use chrono::NaiveDate;

use super::constants::*;
use super::types::{AnalysisSettings, LlmProvider, LlmSettings, ModelSettings, SourceSettings};

pub fn default_user_agent() -> String {
    format!("laie/{}", env!("CARGO_PKG_VERSION"))
}

fn date((year, month, day): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

impl Default for LlmSettings {
    fn default() -> Self {
        let provider = LlmProvider::OpenRouter;
        Self {
            provider,
            api_key: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: provider.default_base_url().to_string(),
            user_agent: default_user_agent(),
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            narrative: DEFAULT_NARRATIVE_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            start: date(DEFAULT_ANALYSIS_START),
            end: date(DEFAULT_ANALYSIS_END),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            proxycurl_api_key: None,
            proxycurl_base_url: DEFAULT_PROXYCURL_BASE_URL.to_string(),
            linkedin_base_url: DEFAULT_LINKEDIN_BASE_URL.to_string(),
            li_at: None,
            email: None,
            password: None,
        }
    }
}
