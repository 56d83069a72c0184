use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use laie::config::SourceSettings;
use laie::ingestion::{CREDENTIALS_KEY, GDPR_EXPORT_KEY, PROXYCURL_KEY};
use laie::pipeline::{DataSources, RunReport};

use super::args::AnalyzeArgs;

/// Per-run data sources from flags, with configured defaults filling the
/// gaps. Flags always win over configuration.
pub(crate) fn data_sources(args: &AnalyzeArgs, defaults: &SourceSettings) -> DataSources {
    let mut sources = DataSources::new();

    if let Some(path) = &args.gdpr_export {
        sources.insert(
            GDPR_EXPORT_KEY.to_string(),
            Value::String(path.display().to_string()),
        );
    }

    if let Some(key) = args
        .proxycurl_key
        .clone()
        .or_else(|| defaults.proxycurl_api_key.clone())
    {
        sources.insert(PROXYCURL_KEY.to_string(), Value::String(key));
    }

    let mut credentials = Map::new();
    let fields = [
        ("li_at", &args.li_at, &defaults.li_at),
        ("email", &args.email, &defaults.email),
        ("password", &args.password, &defaults.password),
    ];
    for (name, flag, default) in fields {
        if let Some(value) = flag.clone().or_else(|| default.clone()) {
            credentials.insert(name.to_string(), Value::String(value));
        }
    }
    if !credentials.is_empty() {
        sources.insert(CREDENTIALS_KEY.to_string(), Value::Object(credentials));
    }

    sources
}

pub(crate) fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialize result")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

pub(crate) fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }

    let visible: String = secret.chars().take(8).collect();
    format!("{visible}***")
}
