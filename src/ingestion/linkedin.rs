use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::header::{COOKIE, SET_COOKIE};
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::{AnalysisWindow, ContentType, Post, Profile};

use super::sources::LinkedInCredentials;

const CSRF_TOKEN: &str = "ajax:0000000000000000000";
const MAX_POSTS: u32 = 50;

/// Minimal client for the LinkedIn web session API.
#[derive(Debug, Clone)]
pub struct LinkedInClient {
    http: Client,
    base_url: String,
}

impl LinkedInClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build LinkedIn HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch(
        &self,
        public_id: &str,
        credentials: &LinkedInCredentials,
        window: &AnalysisWindow,
    ) -> Result<(Profile, Vec<Post>)> {
        let li_at = self.session_cookie(credentials).await?;
        self.fetch_with_session(public_id, &li_at, window)
            .await
            .map_err(|error| anyhow!("Failed to fetch LinkedIn API data: {error:#}"))
    }

    async fn session_cookie(&self, credentials: &LinkedInCredentials) -> Result<String> {
        if let Some(li_at) = &credentials.li_at {
            return Ok(li_at.clone());
        }

        match (&credentials.email, &credentials.password) {
            (Some(email), Some(password)) => self
                .authenticate(email, password)
                .await
                .map_err(|error| anyhow!("Failed to fetch LinkedIn API data: {error:#}")),
            _ => bail!("No valid LinkedIn credentials provided"),
        }
    }

    /// Exchange email and password for an `li_at` session cookie.
    async fn authenticate(&self, email: &str, password: &str) -> Result<String> {
        let url = format!("{}/uas/authenticate", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("csrf-token", CSRF_TOKEN)
            .header(COOKIE, format!("JSESSIONID=\"{CSRF_TOKEN}\""))
            .form(&[("session_key", email), ("session_password", password)])
            .send()
            .await
            .context("authentication request failed")?
            .error_for_status()
            .context("authentication rejected")?;

        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|cookie| {
                let pair = cookie.split(';').next()?.trim();
                let value = pair.strip_prefix("li_at=")?;
                (!value.is_empty()).then(|| value.trim_matches('"').to_string())
            })
            .ok_or_else(|| anyhow!("authentication did not return a session cookie"))
    }

    async fn get_json(&self, path: &str, li_at: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/voyager/api{}", self.base_url, path);
        self.http
            .get(&url)
            .header("csrf-token", CSRF_TOKEN)
            .header(
                COOKIE,
                format!("li_at={li_at}; JSESSIONID=\"{CSRF_TOKEN}\""),
            )
            .query(query)
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?
            .error_for_status()
            .with_context(|| format!("{path} returned an error status"))?
            .json::<Value>()
            .await
            .with_context(|| format!("{path} returned invalid JSON"))
    }

    async fn fetch_with_session(
        &self,
        public_id: &str,
        li_at: &str,
        window: &AnalysisWindow,
    ) -> Result<(Profile, Vec<Post>)> {
        info!(public_id, "fetching profile data from LinkedIn API");
        let profile_data = self
            .get_json(&format!("/identity/profiles/{public_id}"), li_at, &[])
            .await?;
        let profile = parse_profile(public_id, &profile_data);

        info!(public_id, "fetching posts data from LinkedIn API");
        let urn_id = profile_data
            .get("public_id")
            .and_then(Value::as_str)
            .unwrap_or(public_id)
            .to_string();
        let posts_data = self
            .get_json(
                "/identity/profileUpdatesV2",
                li_at,
                &[
                    ("profileId", urn_id),
                    ("q", "memberShareFeed".to_string()),
                    ("count", MAX_POSTS.to_string()),
                ],
            )
            .await?;

        let posts = parse_posts(public_id, &posts_data, window);
        info!(public_id, posts = posts.len(), "fetched LinkedIn API data");
        Ok((profile, posts))
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn count_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

pub(crate) fn parse_profile(public_id: &str, data: &Value) -> Profile {
    let full_name = match text_field(data, "firstName") {
        Some(first) => {
            let last = text_field(data, "lastName").unwrap_or_default();
            format!("{first} {last}").trim_end().to_string()
        }
        None => format!("User {public_id}"),
    };

    Profile {
        user_id: public_id.to_string(),
        full_name,
        headline: text_field(data, "headline").unwrap_or_else(|| "Professional".to_string()),
        followers_count: count_field(data, "followerCount"),
        connections_count: count_field(data, "connectionsCount"),
        industry: text_field(data, "industryName"),
        location: text_field(data, "locationName"),
        about: text_field(data, "summary"),
    }
}

pub(crate) fn parse_posts(public_id: &str, data: &Value, window: &AnalysisWindow) -> Vec<Post> {
    let Some(elements) = data.get("elements").and_then(Value::as_array) else {
        return Vec::new();
    };

    let fallback_date = window.start.and_hms_opt(0, 0, 0).unwrap_or_default();
    let mut posts = Vec::new();

    for element in elements {
        let Some(share) = element
            .pointer("/update/share")
            .filter(|share| share.as_object().is_some_and(|fields| !fields.is_empty()))
        else {
            continue;
        };

        let post_id = share
            .get("urn")
            .and_then(Value::as_str)
            .and_then(|urn| urn.rsplit(':').next())
            .unwrap_or_default()
            .to_string();
        let content = share
            .pointer("/text/text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let published_at = match share.pointer("/created/time") {
            Some(raw) => {
                let millis = raw
                    .as_i64()
                    .or_else(|| raw.as_str().and_then(|text| text.parse().ok()));
                match millis.and_then(DateTime::<Utc>::from_timestamp_millis) {
                    Some(at) => at.naive_utc(),
                    None => {
                        warn!(post_id, "unreadable post timestamp; using window start");
                        fallback_date
                    }
                }
            }
            None => fallback_date,
        };

        if !window.contains(published_at) {
            continue;
        }

        let counts = share
            .pointer("/socialDetail/totalSocialActivityCounts")
            .cloned()
            .unwrap_or(Value::Null);

        let has_items = |pointer: &str| {
            share
                .pointer(pointer)
                .is_some_and(|items| items.as_array().is_some_and(|list| !list.is_empty()))
        };
        let content_type = if has_items("/content/images") {
            ContentType::Image
        } else if has_items("/content/videos") {
            ContentType::Video
        } else {
            ContentType::Text
        };

        posts.push(Post {
            post_id,
            user_id: public_id.to_string(),
            content,
            content_type,
            published_at,
            likes_count: count_field(&counts, "numLikes"),
            comments_count: count_field(&counts, "numComments"),
            reposts_count: count_field(&counts, "numShares"),
            impressions: count_field(&counts, "numImpressions"),
        });
    }

    posts
}
