//! Configuration management for the analysis pipeline.
//!
//! Settings are layered in this order, later layers winning:
//! - built-in defaults
//! - the JSON file at `~/.laie/config`
//! - environment variable overrides
//! - command-line flags applied by the caller
//!
//! The result is validated before use.

mod builder;
mod constants;
mod defaults;
mod environment;
mod loader;
mod types;
mod validation;

pub use builder::ConfigBuilder;
pub use types::{AnalysisSettings, Config, LlmProvider, LlmSettings, ModelSettings, SourceSettings};

pub use constants::{DEFAULT_AZURE_API_VERSION, DEFAULT_MAX_TOKENS, DEFAULT_OPENROUTER_BASE_URL};
