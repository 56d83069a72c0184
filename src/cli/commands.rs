use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::info;

use laie::client::{AIClient, DynChatClient};
use laie::config::Config;
use laie::pipeline::Engine;

use super::args::{AnalyzeArgs, Cli, Command};
use super::config_cmd;
use super::render;
use super::util;

pub(crate) async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Command::Analyze(args) => analyze(args, config).await,
        Command::Status => status(&config),
        Command::Config(args) => config_cmd::handle_config(&args, config),
    }
}

fn chat_client(config: &Config, offline: bool) -> Result<Option<Arc<DynChatClient>>> {
    if offline {
        info!("offline mode; narrative stages use fallbacks");
        return Ok(None);
    }
    if !config.has_llm() {
        info!(
            provider = %config.llm.provider,
            "no API key configured; narrative stages use fallbacks"
        );
        return Ok(None);
    }

    let client: Arc<DynChatClient> = Arc::new(AIClient::new(&config.llm)?);
    Ok(Some(client))
}

async fn analyze(args: AnalyzeArgs, mut config: Config) -> Result<()> {
    if let Some(model) = &args.model {
        config.models.narrative = model.clone();
    }

    let client = chat_client(&config, args.offline)?;
    let engine = Engine::builder()
        .with_standard_stages(&config, client)?
        .build()?;

    let data_sources = util::data_sources(&args, &config.sources);
    let report = engine.analyze(args.public_id.clone(), data_sources).await;

    if let Some(path) = &args.output {
        util::write_report(path, &report)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::print_report(&report);
        if let Some(path) = &args.output {
            render::print_saved(path);
        }
    }

    if !report.success {
        bail!(
            "Analysis of '{}' finished with {} error(s)",
            report.subject_id,
            report.errors.len()
        );
    }
    Ok(())
}

fn status(config: &Config) -> Result<()> {
    let engine = Engine::builder()
        .with_standard_stages(config, None)?
        .build()?;
    render::print_status(&engine.status(), config);
    Ok(())
}
