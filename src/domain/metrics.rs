use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::profile::ContentType;

/// Aggregated activity for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub user_id: String,
    pub month: String,
    pub posts_count: u64,
    pub total_impressions: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_reposts: u64,
    /// Engagements over impressions, computed on the summed totals.
    pub engagement_rate: f64,
    pub content_types: BTreeMap<ContentType, u64>,
}

impl PeriodMetrics {
    pub fn total_engagements(&self) -> u64 {
        self.total_likes + self.total_comments + self.total_reposts
    }

    /// Most frequent content type, ties resolved by declaration order.
    pub fn primary_content_type(&self) -> Option<ContentType> {
        let mut best: Option<(ContentType, u64)> = None;
        for (kind, count) in &self.content_types {
            if best.is_none_or(|(_, top)| *count > top) {
                best = Some((*kind, *count));
            }
        }
        best.map(|(kind, _)| kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentStats {
    pub count: u64,
    pub total_impressions: u64,
    pub total_engagements: u64,
    pub avg_impressions: f64,
    pub avg_engagements: f64,
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPerformance {
    pub content_stats: BTreeMap<ContentType, ContentStats>,
    pub best_performing_type: Option<ContentType>,
    pub total_posts_analyzed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalPatterns {
    pub posting_consistency: f64,
    pub active_days: usize,
    pub total_days: i64,
    pub best_posting_weekday: Option<String>,
    pub best_posting_hour: Option<u32>,
    pub posts_by_month: BTreeMap<String, u64>,
    pub avg_posts_per_day: f64,
}
