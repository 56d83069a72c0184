use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Timelike};

use crate::domain::{
    AnalysisWindow, ContentPerformance, ContentStats, ContentType, PeriodMetrics, Post,
    TemporalPatterns,
};

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Per-month totals, ascending by month. The engagement rate is taken over
/// the summed totals, never averaged across posts.
pub fn period_metrics(user_id: &str, posts: &[Post]) -> Vec<PeriodMetrics> {
    let mut months: BTreeMap<String, PeriodMetrics> = BTreeMap::new();

    for post in posts {
        let month = post.month_key();
        let entry = months.entry(month.clone()).or_insert_with(|| PeriodMetrics {
            user_id: user_id.to_string(),
            month,
            posts_count: 0,
            total_impressions: 0,
            total_likes: 0,
            total_comments: 0,
            total_reposts: 0,
            engagement_rate: 0.0,
            content_types: BTreeMap::new(),
        });

        entry.posts_count += 1;
        entry.total_impressions += post.impressions;
        entry.total_likes += post.likes_count;
        entry.total_comments += post.comments_count;
        entry.total_reposts += post.reposts_count;
        *entry.content_types.entry(post.content_type).or_insert(0) += 1;
    }

    months
        .into_values()
        .map(|mut metrics| {
            metrics.engagement_rate = ratio(metrics.total_engagements(), metrics.total_impressions);
            metrics
        })
        .collect()
}

pub fn content_performance(posts: &[Post]) -> ContentPerformance {
    let mut content_stats: BTreeMap<ContentType, ContentStats> = BTreeMap::new();
    for post in posts {
        let stats = content_stats.entry(post.content_type).or_default();
        stats.count += 1;
        stats.total_impressions += post.impressions;
        stats.total_engagements += post.engagements();
    }

    for stats in content_stats.values_mut() {
        stats.avg_impressions = ratio(stats.total_impressions, stats.count);
        stats.avg_engagements = ratio(stats.total_engagements, stats.count);
        stats.engagement_rate = ratio(stats.total_engagements, stats.total_impressions);
    }

    // Ties go to the type posted first.
    let mut best_performing_type: Option<(ContentType, f64)> = None;
    for kind in first_seen(posts.iter().map(|post| post.content_type)) {
        let Some(stats) = content_stats.get(&kind) else {
            continue;
        };
        if best_performing_type.is_none_or(|(_, top)| stats.avg_impressions > top) {
            best_performing_type = Some((kind, stats.avg_impressions));
        }
    }

    ContentPerformance {
        content_stats,
        best_performing_type: best_performing_type.map(|(kind, _)| kind),
        total_posts_analyzed: posts.len(),
    }
}

pub fn temporal_patterns(posts: &[Post], window: &AnalysisWindow) -> TemporalPatterns {
    if posts.is_empty() {
        return TemporalPatterns {
            total_days: window.total_days(),
            ..TemporalPatterns::default()
        };
    }

    let mut posts_by_month: BTreeMap<String, u64> = BTreeMap::new();
    let mut days = BTreeSet::new();

    for post in posts {
        *posts_by_month.entry(post.month_key()).or_insert(0) += 1;
        days.insert(post.published_at.date());
    }

    let total_days = window.total_days();
    let active_days = days.len();

    TemporalPatterns {
        posting_consistency: ratio(active_days as u64, total_days.max(0) as u64),
        active_days,
        total_days,
        best_posting_weekday: busiest(
            posts
                .iter()
                .map(|post| post.published_at.weekday().num_days_from_monday()),
        )
        .and_then(weekday_name),
        best_posting_hour: busiest(posts.iter().map(|post| post.published_at.hour())),
        posts_by_month,
        avg_posts_per_day: ratio(posts.len() as u64, total_days.max(0) as u64),
    }
}

/// Distinct values in the order they first appear.
fn first_seen<T: PartialEq>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// Most frequent key; a tie goes to the key seen first.
fn busiest(keys: impl IntoIterator<Item = u32>) -> Option<u32> {
    let mut counts: Vec<(u32, u64)> = Vec::new();
    for key in keys {
        match counts.iter_mut().find(|(seen, _)| *seen == key) {
            Some((_, count)) => *count += 1,
            None => counts.push((key, 1)),
        }
    }

    let mut best: Option<(u32, u64)> = None;
    for (key, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key)
}

fn weekday_name(days_from_monday: u32) -> Option<String> {
    WEEKDAYS
        .get(days_from_monday as usize)
        .map(|name| name.to_string())
}
