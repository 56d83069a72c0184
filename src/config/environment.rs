use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use std::env;

use super::builder::ConfigBuilder;
use super::types::LlmProvider;

pub fn apply_env_overrides(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    if let Some(provider_raw) = env_string("LAIE_PROVIDER")? {
        let provider = provider_raw
            .parse::<LlmProvider>()
            .with_context(|| format!("Failed to parse LAIE_PROVIDER value '{provider_raw}'"))?;
        builder = builder.with_llm(|llm| {
            if llm.provider != provider {
                llm.provider = provider;
                llm.base_url = provider.default_base_url().to_string();
            }
        });
    }

    if let Some(base_url) = env_string("LAIE_LLM_BASE_URL")? {
        builder = builder.with_llm(|llm| llm.base_url = base_url.clone());
    }

    if let Some(api_key) = env_string("OPENROUTER_API_KEY")? {
        builder = builder.with_llm(|llm| {
            if llm.provider == LlmProvider::OpenRouter {
                llm.api_key = api_key.clone();
            }
        });
    }

    if let Some(api_key) = env_string("AZURE_OPENAI_API_KEY")? {
        builder = builder.with_llm(|llm| {
            if llm.provider == LlmProvider::Azure {
                llm.api_key = api_key.clone();
            }
        });
    }

    if let Some(endpoint) = env_string("AZURE_OPENAI_ENDPOINT")? {
        builder = builder.with_llm(|llm| {
            if llm.provider == LlmProvider::Azure {
                llm.base_url = endpoint.clone();
            }
        });
    }

    if let Some(version) = env_string("AZURE_OPENAI_API_VERSION")? {
        builder = builder.with_llm(|llm| llm.api_version = version);
    }

    if let Some(deployment) = env_string("AZURE_OPENAI_DEPLOYMENT")? {
        builder = builder.with_models(|models| models.narrative = deployment);
    }

    if let Some(timeout) = env_u64("LAIE_TIMEOUT_SECS")? {
        builder = builder.with_llm(|llm| llm.timeout_secs = timeout);
    }

    if let Some(max_tokens) = env_u32("LAIE_MAX_TOKENS")? {
        builder = builder.with_models(|models| models.max_tokens = max_tokens);
    }

    if let Some(model) = env_string("LAIE_MODEL")? {
        builder = builder.with_models(|models| models.narrative = model);
    }

    if let Some(start) = env_date("LAIE_ANALYSIS_START")? {
        builder = builder.with_analysis(|analysis| analysis.start = start);
    }

    if let Some(end) = env_date("LAIE_ANALYSIS_END")? {
        builder = builder.with_analysis(|analysis| analysis.end = end);
    }

    if let Some(api_key) = env_string("PROXYCURL_API_KEY")? {
        builder = builder.with_sources(|sources| sources.proxycurl_api_key = Some(api_key));
    }

    if let Some(li_at) = env_string("LINKEDIN_LI_AT")? {
        builder = builder.with_sources(|sources| sources.li_at = Some(li_at));
    }

    if let Some(email) = env_string("LINKEDIN_EMAIL")? {
        builder = builder.with_sources(|sources| sources.email = Some(email));
    }

    if let Some(password) = env_string("LINKEDIN_PASSWORD")? {
        builder = builder.with_sources(|sources| sources.password = Some(password));
    }

    Ok(builder)
}

pub fn env_string(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(anyhow!("{key} contains invalid UTF-8")),
    }
}

pub fn env_u64(key: &str) -> Result<Option<u64>> {
    if let Some(value) = env_string(key)? {
        let parsed = value
            .parse::<u64>()
            .with_context(|| format!("Failed to parse {key} as u64"))?;
        Ok(Some(parsed))
    } else {
        Ok(None)
    }
}

pub fn env_u32(key: &str) -> Result<Option<u32>> {
    if let Some(value) = env_string(key)? {
        let parsed = value
            .parse::<u32>()
            .with_context(|| format!("Failed to parse {key} as u32"))?;
        Ok(Some(parsed))
    } else {
        Ok(None)
    }
}

pub fn env_date(key: &str) -> Result<Option<NaiveDate>> {
    if let Some(value) = env_string(key)? {
        let parsed = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .with_context(|| format!("Failed to parse {key} as a YYYY-MM-DD date"))?;
        Ok(Some(parsed))
    } else {
        Ok(None)
    }
}
