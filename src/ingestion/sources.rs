use anyhow::{Result, bail};
use serde_json::Value;

use crate::pipeline::DataSources;

pub const GDPR_EXPORT_KEY: &str = "gdpr_export";
pub const PROXYCURL_KEY: &str = "proxycurl_api_key";
pub const CREDENTIALS_KEY: &str = "linkedin_credentials";

/// Credentials for a LinkedIn session; any field may be filled from
/// configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedInCredentials {
    pub li_at: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LinkedInCredentials {
    pub fn or(self, fallback: &LinkedInCredentials) -> Self {
        Self {
            li_at: self.li_at.or_else(|| fallback.li_at.clone()),
            email: self.email.or_else(|| fallback.email.clone()),
            password: self.password.or_else(|| fallback.password.clone()),
        }
    }
}

/// Source picked for a run, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    GdprExport(String),
    Proxycurl { api_key: String },
    LinkedIn(LinkedInCredentials),
}

impl DataSource {
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::GdprExport(_) => "gdpr_export",
            DataSource::Proxycurl { .. } => "proxycurl",
            DataSource::LinkedIn(_) => "linkedin_api",
        }
    }
}

/// Pick the source to collect from: export, then Proxycurl, then a session.
pub fn select_source(sources: &DataSources) -> Result<DataSource> {
    if let Some(export) = sources.get(GDPR_EXPORT_KEY).filter(|value| is_present(value)) {
        let reference = match export {
            Value::String(path) => path.clone(),
            other => other.to_string(),
        };
        return Ok(DataSource::GdprExport(reference));
    }

    if let Some(key) = sources.get(PROXYCURL_KEY).filter(|value| is_present(value)) {
        let Some(api_key) = key.as_str() else {
            bail!("Proxycurl API key must be a string");
        };
        return Ok(DataSource::Proxycurl {
            api_key: api_key.to_string(),
        });
    }

    if let Some(credentials) = sources.get(CREDENTIALS_KEY).filter(|value| is_present(value)) {
        return Ok(DataSource::LinkedIn(parse_credentials(credentials)));
    }

    bail!("No valid data source provided")
}

fn parse_credentials(value: &Value) -> LinkedInCredentials {
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    };
    LinkedInCredentials {
        li_at: field("li_at"),
        email: field("email"),
        password: field("password"),
    }
}

/// Truthiness of a configured source value.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
