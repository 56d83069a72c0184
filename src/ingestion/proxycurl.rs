use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::domain::{Post, Profile};

#[derive(Debug, Deserialize)]
struct ProxycurlProfile {
    full_name: Option<String>,
    headline: Option<String>,
    occupation: Option<String>,
    follower_count: Option<u64>,
    connections: Option<u64>,
    industry: Option<String>,
    city: Option<ProxycurlCity>,
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProxycurlCity {
    full: Option<String>,
}

/// Profile lookup through the Proxycurl person endpoint. Proxycurl exposes
/// no posts, so collection through it always returns an empty post list.
#[derive(Debug, Clone)]
pub struct ProxycurlClient {
    http: Client,
    base_url: String,
}

impl ProxycurlClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build Proxycurl HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch(&self, public_id: &str, api_key: &str) -> Result<(Profile, Vec<Post>)> {
        info!(public_id, "fetching profile data from Proxycurl");
        let profile = self
            .fetch_profile(public_id, api_key)
            .await
            .map_err(|error| anyhow!("Failed to fetch Proxycurl data: {error:#}"))?;
        Ok((profile, Vec::new()))
    }

    async fn fetch_profile(&self, public_id: &str, api_key: &str) -> Result<Profile> {
        let url = format!("{}/proxycurl/api/v2/linkedin", self.base_url);
        let profile_url = format!("https://www.linkedin.com/in/{public_id}");

        let response = self
            .http
            .get(&url)
            .bearer_auth(api_key)
            .query(&[
                ("url", profile_url.as_str()),
                ("fallback_to_cache", "on-error"),
            ])
            .send()
            .await
            .context("request failed")?
            .error_for_status()
            .context("Proxycurl returned an error status")?;

        let data: ProxycurlProfile = response
            .json()
            .await
            .context("Failed to parse Proxycurl response")?;

        Ok(Profile {
            user_id: public_id.to_string(),
            full_name: data
                .full_name
                .unwrap_or_else(|| format!("User {public_id}")),
            headline: data
                .headline
                .or(data.occupation)
                .unwrap_or_else(|| "Professional".to_string()),
            followers_count: data.follower_count.unwrap_or(0),
            connections_count: data.connections.unwrap_or(0),
            industry: data.industry,
            location: data.city.and_then(|city| city.full),
            about: data.summary,
        })
    }
}
