use anyhow::{Context, Result};
use dirs::home_dir;
use std::{fs, path::Path};

use super::Config;
use super::builder::ConfigBuilder;
use super::environment::apply_env_overrides;
use super::types::{FileConfig, LlmProvider, PersistedConfig};
use super::validation::validate;

impl Config {
    pub fn config_path() -> Result<std::path::PathBuf> {
        let mut path = home_dir().context("Could not determine home directory")?;
        path.push(".laie/config");
        Ok(path)
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut builder = ConfigBuilder::new();

        if path.exists() {
            builder = Self::apply_file(builder, &path)?;
        }

        builder = apply_env_overrides(builder)?;

        let config = builder.build()?;
        validate(&config)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create config directory {}", parent.display())
            })?;
        }

        let payload = PersistedConfig::from(self);
        let json = serde_json::to_string_pretty(&payload)
            .context("Failed to serialize configuration to JSON")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate(self)
    }

    fn apply_file(builder: ConfigBuilder, path: &Path) -> Result<ConfigBuilder> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed reading config at {}", path.display()))?;

        if contents.trim().is_empty() {
            return Ok(builder);
        }

        let file: FileConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed parsing JSON config at {}", path.display()))?;

        file.apply(builder)
    }
}

impl FileConfig {
    pub fn apply(self, builder: ConfigBuilder) -> Result<ConfigBuilder> {
        let mut builder = builder;

        if let Some(llm_file) = self.llm {
            let provider = llm_file
                .provider
                .as_deref()
                .map(str::parse::<LlmProvider>)
                .transpose()
                .context("Invalid llm.provider in config file")?;

            builder = builder.with_llm(|llm| {
                if let Some(parsed) = provider {
                    if llm.provider != parsed {
                        llm.provider = parsed;
                        llm.base_url = parsed.default_base_url().to_string();
                    }
                }
                if let Some(api_key) = llm_file.api_key {
                    llm.api_key = api_key;
                }
                if let Some(timeout) = llm_file.timeout_secs {
                    llm.timeout_secs = timeout;
                }
                if let Some(base_url) = llm_file.base_url {
                    llm.base_url = base_url;
                }
                if let Some(user_agent) = llm_file.user_agent {
                    llm.user_agent = user_agent;
                }
                if let Some(api_version) = llm_file.api_version {
                    llm.api_version = api_version;
                }
            });
        }

        if let Some(models_file) = self.models {
            builder = builder.with_models(|models| {
                if let Some(narrative) = models_file.narrative {
                    models.narrative = narrative;
                }
                if let Some(max_tokens) = models_file.max_tokens {
                    models.max_tokens = max_tokens;
                }
                if let Some(temperature) = models_file.temperature {
                    models.temperature = temperature;
                }
            });
        }

        if let Some(analysis_file) = self.analysis {
            builder = builder.with_analysis(|analysis| {
                if let Some(start) = analysis_file.start {
                    analysis.start = start;
                }
                if let Some(end) = analysis_file.end {
                    analysis.end = end;
                }
            });
        }

        if let Some(sources_file) = self.sources {
            builder = builder.with_sources(|sources| {
                if sources_file.proxycurl_api_key.is_some() {
                    sources.proxycurl_api_key = sources_file.proxycurl_api_key;
                }
                if let Some(base_url) = sources_file.proxycurl_base_url {
                    sources.proxycurl_base_url = base_url;
                }
                if let Some(base_url) = sources_file.linkedin_base_url {
                    sources.linkedin_base_url = base_url;
                }
                if sources_file.li_at.is_some() {
                    sources.li_at = sources_file.li_at;
                }
                if sources_file.email.is_some() {
                    sources.email = sources_file.email;
                }
                if sources_file.password.is_some() {
                    sources.password = sources_file.password;
                }
            });
        }

        Ok(builder)
    }
}
