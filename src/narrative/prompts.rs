use crate::domain::{ContentPerformance, MonthlyNote, PeriodMetrics, TemporalPatterns};

use super::{percent, thousands};

const HIGHLIGHT_NOTES: usize = 6;
const HIGHLIGHT_CHARS: usize = 100;

pub(super) fn monthly_note(subject_name: &str, metrics: &PeriodMetrics) -> String {
    let content_types = metrics
        .content_types
        .iter()
        .map(|(kind, count)| format!("{kind}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a LinkedIn analytics expert. Write a monthly activity note for {subject_name} covering {month}.

KEY METRICS:
- Posts: {posts}
- Total Impressions: {impressions}
- Total Likes: {likes}
- Engagement Rate: {rate}
- Content Types: {content_types}

Answer with these sections, in this order:

1. ACTIVITY SUMMARY: two or three sentences describing the month's activity

2. KEY ACHIEVEMENTS: three or four bullet points on the strongest results

3. CONTENT PERFORMANCE: which content types did best and why

4. ENGAGEMENT HIGHLIGHTS: notable engagement patterns, as bullet points

5. RECOMMENDATIONS: two or three concrete actions for next month, as bullet points

6. AI INSIGHTS: observations about audience behaviour and content strategy

Stay professional and ground every statement in the metrics above.",
        month = metrics.month,
        posts = metrics.posts_count,
        impressions = thousands(metrics.total_impressions),
        likes = metrics.total_likes,
        rate = percent(metrics.engagement_rate),
    )
}

pub(super) struct SummaryFacts<'a> {
    pub subject_name: &'a str,
    pub period: (String, String),
    pub total_months: usize,
    pub total_posts: u64,
    pub avg_engagement: f64,
    pub best_month: Option<&'a str>,
    pub content_performance: Option<&'a ContentPerformance>,
    pub temporal_patterns: Option<&'a TemporalPatterns>,
    pub notes: &'a [MonthlyNote],
}

fn json_or_empty<T: serde::Serialize>(value: Option<&T>) -> String {
    value
        .and_then(|value| serde_json::to_string(value).ok())
        .unwrap_or_else(|| "{}".to_string())
}

pub(super) fn executive_summary(facts: &SummaryFacts<'_>) -> String {
    let highlights = facts
        .notes
        .iter()
        .take(HIGHLIGHT_NOTES)
        .map(|note| {
            let excerpt: String = note.activity_summary.chars().take(HIGHLIGHT_CHARS).collect();
            format!("- {}: {excerpt}...", note.month)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Write an executive summary of {name}'s LinkedIn activity from {start} to {end}.

OVERVIEW
- Total months analyzed: {months}
- Total posts: {posts}
- Average engagement rate: {rate}
- Best performing month: {best}

CONTENT & PERFORMANCE DATA:
- Content performance: {content}
- Temporal patterns: {temporal}

MONTHLY HIGHLIGHTS:
{highlights}

Structure the summary as:

1. EXECUTIVE OVERVIEW: three or four sentences on overall performance

2. PERFORMANCE METRICS: the key numbers and their trend

3. CONTENT STRATEGY ANALYSIS: what worked and what did not

4. AUDIENCE ENGAGEMENT: how the audience responded

5. STRATEGIC INSIGHTS: observations about the member's presence and growth

Keep it professional and data-driven.",
        name = facts.subject_name,
        start = facts.period.0,
        end = facts.period.1,
        months = facts.total_months,
        posts = facts.total_posts,
        rate = percent(facts.avg_engagement),
        best = facts.best_month.unwrap_or("N/A"),
        content = json_or_empty(facts.content_performance),
        temporal = json_or_empty(facts.temporal_patterns),
    )
}

pub(super) fn recommendations(
    content_performance: Option<&ContentPerformance>,
    temporal_patterns: Option<&TemporalPatterns>,
    metrics: &[PeriodMetrics],
) -> String {
    let best_type = content_performance
        .and_then(|performance| performance.best_performing_type)
        .map(|kind| kind.to_string())
        .unwrap_or_else(|| "text".to_string());
    let consistency = temporal_patterns
        .map(|patterns| patterns.posting_consistency)
        .unwrap_or(0.0);
    let weekday = temporal_patterns
        .and_then(|patterns| patterns.best_posting_weekday.clone())
        .unwrap_or_else(|| "Wednesday".to_string());
    let hour = temporal_patterns
        .and_then(|patterns| patterns.best_posting_hour)
        .unwrap_or(9);
    let activity = metrics
        .iter()
        .map(|period| format!("{}: {} posts", period.month, period.posts_count))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Using the LinkedIn analytics below, give 5-7 actionable recommendations for improving this member's LinkedIn presence.

PERFORMANCE DATA:
- Best performing content type: {best_type}
- Posting consistency: {consistency}
- Best posting day: {weekday}
- Best posting hour: {hour}:00
- Monthly activity: {activity}

Cover content strategy, posting schedule, engagement tactics, audience growth and how to measure progress.
Every recommendation must be specific, measurable where possible, and realistic.

Answer as a numbered list with one recommendation per line.",
        consistency = percent(consistency),
    )
}
