use anyhow::{Result, bail};

use super::types::{Config, LlmProvider};

pub fn validate(config: &Config) -> Result<()> {
    if config.analysis.start >= config.analysis.end {
        bail!(
            "Analysis window start {} must be before end {}",
            config.analysis.start,
            config.analysis.end
        );
    }

    if config.llm.timeout_secs == 0 {
        bail!("LLM timeout must be a positive number of seconds");
    }

    if config.models.max_tokens == 0 {
        bail!("max_tokens must be greater than zero");
    }

    if config.has_llm()
        && config.llm.provider == LlmProvider::Azure
        && config.llm.base_url.trim().is_empty()
    {
        bail!("Azure OpenAI endpoint not set. Set AZURE_OPENAI_ENDPOINT or llm.base_url");
    }

    Ok(())
}
