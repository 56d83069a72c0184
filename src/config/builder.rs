use anyhow::Result;

use super::types::{AnalysisSettings, Config, LlmSettings, ModelSettings, SourceSettings};

#[derive(Debug)]
pub struct ConfigBuilder {
    pub(super) llm: LlmSettings,
    pub(super) models: ModelSettings,
    pub(super) analysis: AnalysisSettings,
    pub(super) sources: SourceSettings,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            llm: LlmSettings::default(),
            models: ModelSettings::default(),
            analysis: AnalysisSettings::default(),
            sources: SourceSettings::default(),
        }
    }

    pub fn with_llm<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut LlmSettings),
    {
        update(&mut self.llm);
        self
    }

    pub fn with_models<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut ModelSettings),
    {
        update(&mut self.models);
        self
    }

    pub fn with_analysis<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut AnalysisSettings),
    {
        update(&mut self.analysis);
        self
    }

    pub fn with_sources<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut SourceSettings),
    {
        update(&mut self.sources);
        self
    }

    pub fn build(self) -> Result<Config> {
        Ok(Config {
            llm: self.llm,
            models: self.models,
            analysis: self.analysis,
            sources: self.sources,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
