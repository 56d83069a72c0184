use anyhow::Result;
use colored::*;

use laie::config::{Config, LlmProvider};

use super::args::ConfigArgs;
use super::util::mask_secret;

pub(crate) fn handle_config(args: &ConfigArgs, mut config: Config) -> Result<()> {
    if let Some(provider) = &args.provider {
        let provider: LlmProvider = provider.trim().parse()?;
        if provider != config.llm.provider {
            config.llm.provider = provider;
            config.llm.base_url = provider.default_base_url().to_string();
        }
    }
    if let Some(api_key) = &args.api_key {
        config.llm.api_key = api_key.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.llm.base_url = base_url.clone();
    }
    if let Some(model) = &args.model {
        config.models.narrative = model.clone();
    }
    if let Some(timeout) = args.timeout {
        config.llm.timeout_secs = timeout;
    }
    if let Some(max_tokens) = args.max_tokens {
        config.models.max_tokens = max_tokens;
    }
    if let Some(key) = &args.proxycurl_key {
        config.sources.proxycurl_api_key = Some(key.clone());
    }
    if let Some(li_at) = &args.li_at {
        config.sources.li_at = Some(li_at.clone());
    }
    if let Some(start) = args.start {
        config.analysis.start = start;
    }
    if let Some(end) = args.end {
        config.analysis.end = end;
    }

    config.validate()?;
    config.save()?;

    println!(
        "{} {}",
        "✅ Configuration saved to".green(),
        Config::config_path()?.display()
    );
    println!("📋 Current configuration:");
    println!("   Provider: {}", config.llm.provider.display_name());
    println!("   API Key: {}", mask_secret(&config.llm.api_key));
    println!("   Base URL: {}", config.llm.base_url);
    println!("   Model: {}", config.models.narrative);
    println!("   Timeout: {}s", config.llm.timeout_secs);
    println!("   Max Tokens: {}", config.models.max_tokens);
    println!(
        "   Window: {} .. {}",
        config.analysis.start, config.analysis.end
    );
    println!(
        "   Proxycurl Key: {}",
        mask_secret(config.sources.proxycurl_api_key.as_deref().unwrap_or_default())
    );
    println!(
        "   li_at: {}",
        mask_secret(config.sources.li_at.as_deref().unwrap_or_default())
    );

    Ok(())
}
