use anyhow::Result;
use chrono::{Duration, NaiveDate};
use sha2::{Digest, Sha256};

use crate::domain::{AnalysisWindow, ContentType, Post, Profile};

/// Stable 64-bit hash so generated data is identical across processes.
pub fn stable_hash(input: &str) -> u64 {
    let digest = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Deterministic profile and posts standing in for a parsed export archive.
pub fn generate(subject_id: &str, window: &AnalysisWindow) -> Result<(Profile, Vec<Post>)> {
    let profile = Profile {
        user_id: subject_id.to_string(),
        full_name: "Demo User".to_string(),
        headline: "Professional Title".to_string(),
        followers_count: 1000,
        connections_count: 500,
        industry: None,
        location: None,
        about: None,
    };

    let mut posts = Vec::new();
    let mut post_index: u64 = 0;

    for step in window.monthly_steps() {
        let month_key = step.format("%Y-%m").to_string();
        let count = 2 + stable_hash(&format!("{subject_id}{month_key}")) % 4;

        for i in 0..count {
            let published = step + Duration::days(7 * i as i64);
            if published >= window.end {
                break;
            }
            posts.push(synthetic_post(subject_id, post_index, published));
            post_index += 1;
        }
    }

    Ok((profile, posts))
}

fn synthetic_post(subject_id: &str, index: u64, published: NaiveDate) -> Post {
    let metric = |offset: u64| stable_hash(&(index + offset).to_string());
    Post {
        post_id: format!("post_{index}"),
        user_id: subject_id.to_string(),
        content: format!(
            "Sample LinkedIn post content for {}",
            published.format("%B %Y")
        ),
        content_type: ContentType::Text,
        published_at: published.and_hms_opt(0, 0, 0).unwrap_or_default(),
        likes_count: 10 + metric(0) % 90,
        comments_count: 1 + metric(1) % 9,
        reposts_count: metric(2) % 5,
        impressions: 100 + metric(3) % 900,
    }
}
