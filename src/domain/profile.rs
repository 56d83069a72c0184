use std::fmt;

use anyhow::anyhow;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Image,
    Video,
    Article,
    Carousel,
    Poll,
    Document,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Video => "video",
            ContentType::Article => "article",
            ContentType::Carousel => "carousel",
            ContentType::Poll => "poll",
            ContentType::Document => "document",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ContentType::Text),
            "image" => Ok(ContentType::Image),
            "video" => Ok(ContentType::Video),
            "article" => Ok(ContentType::Article),
            "carousel" => Ok(ContentType::Carousel),
            "poll" => Ok(ContentType::Poll),
            "document" => Ok(ContentType::Document),
            other => Err(anyhow!("Unknown content type '{other}'")),
        }
    }
}

/// Public profile of the analysed member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub full_name: String,
    pub headline: String,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub connections_count: u64,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub about: Option<String>,
}

impl Profile {
    /// Share of the descriptive fields that carry a non-blank value.
    pub fn completeness(&self) -> f64 {
        let present = |value: Option<&str>| value.is_some_and(|v| !v.trim().is_empty());
        let fields = [
            present(Some(&self.full_name)),
            present(Some(&self.headline)),
            present(self.industry.as_deref()),
            present(self.location.as_deref()),
            present(self.about.as_deref()),
        ];
        let filled = fields.iter().filter(|filled| **filled).count();
        filled as f64 / fields.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: String,
    pub user_id: String,
    pub content: String,
    pub content_type: ContentType,
    pub published_at: NaiveDateTime,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub comments_count: u64,
    #[serde(default)]
    pub reposts_count: u64,
    #[serde(default)]
    pub impressions: u64,
}

impl Post {
    pub fn engagements(&self) -> u64 {
        self.likes_count + self.comments_count + self.reposts_count
    }

    /// Calendar month key in `YYYY-MM` form.
    pub fn month_key(&self) -> String {
        self.published_at.format("%Y-%m").to_string()
    }
}
