use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use laie::config::Config;

use super::commands;

/// Entry point for the `laie` command-line interface.
#[derive(Debug, Parser)]
#[command(
    name = "laie",
    about = "LinkedIn activity intelligence pipeline",
    version,
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging for the pipeline
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the analysis pipeline for one LinkedIn member.
    Analyze(AnalyzeArgs),
    /// Show the wired stages and the transition table.
    Status,
    /// Update and persist settings in ~/.laie/config.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Public profile id (the part after linkedin.com/in/)
    pub public_id: String,

    /// Path to a LinkedIn data export archive
    #[arg(long)]
    pub gdpr_export: Option<PathBuf>,

    /// Proxycurl API key
    #[arg(long)]
    pub proxycurl_key: Option<String>,

    /// LinkedIn `li_at` session cookie
    #[arg(long)]
    pub li_at: Option<String>,

    /// LinkedIn login email
    #[arg(long, requires = "password")]
    pub email: Option<String>,

    /// LinkedIn login password
    #[arg(long, requires = "email")]
    pub password: Option<String>,

    /// Override the narrative model (deployment name on Azure)
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Skip the language model and use deterministic narratives
    #[arg(long)]
    pub offline: bool,

    /// Print the result record as JSON
    #[arg(long)]
    pub json: bool,

    /// Also write the result record to this file
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// LLM provider (openrouter or azure)
    #[arg(long)]
    pub provider: Option<String>,

    /// API key for the selected provider
    #[arg(long)]
    pub api_key: Option<String>,

    /// Provider base URL (Azure resource endpoint)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Narrative model or deployment name
    #[arg(long)]
    pub model: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Completion token limit
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Default Proxycurl API key
    #[arg(long)]
    pub proxycurl_key: Option<String>,

    /// Default LinkedIn `li_at` session cookie
    #[arg(long)]
    pub li_at: Option<String>,

    /// First day of the analysis window (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Day after the analysis window (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

impl Cli {
    pub async fn run(self, config: Config) -> Result<()> {
        commands::run(self, config).await
    }
}
