use crate::domain::{ContentType, MonthlyNote, NoteAnalysis, PeriodMetrics};

use super::{percent, thousands};

pub fn fallback_note(subject_name: &str, metrics: &PeriodMetrics) -> MonthlyNote {
    let primary = metrics
        .primary_content_type()
        .unwrap_or(ContentType::Text);

    MonthlyNote {
        month: metrics.month.clone(),
        activity_summary: format!(
            "{subject_name} published {} posts in {}, generating {} impressions.",
            metrics.posts_count,
            metrics.month,
            thousands(metrics.total_impressions)
        ),
        key_achievements: vec![format!(
            "Achieved {} engagement rate",
            percent(metrics.engagement_rate)
        )],
        content_performance: NoteAnalysis {
            analysis: Some(format!("Primary content type: {primary}")),
        },
        engagement_highlights: vec![format!("{} total likes received", metrics.total_likes)],
        recommendations: vec![
            "Continue current content strategy".to_string(),
            "Experiment with different posting times".to_string(),
        ],
        ai_insights: "Analysis generated with limited data. Consider providing more detailed \
                      metrics for deeper insights."
            .to_string(),
    }
}

pub fn fallback_summary(subject_name: &str, total_posts: u64, avg_engagement: f64) -> String {
    format!(
        "Executive Summary for {subject_name}'s LinkedIn Activity

During the analysis period, {subject_name} published {total_posts} posts with an average engagement rate of {rate}. The activity shows consistent professional engagement on the LinkedIn platform.

Key highlights include steady content creation and audience interaction. The performance metrics indicate a solid foundation for professional networking and thought leadership.

Strategic focus areas include content optimization and engagement enhancement to further grow influence and reach on the platform.",
        rate = percent(avg_engagement),
    )
}

pub fn fallback_recommendations() -> Vec<String> {
    [
        "Focus on creating high-quality, value-driven content",
        "Post consistently 3-5 times per week",
        "Engage actively with comments on your posts",
        "Experiment with different content formats",
        "Track engagement metrics to measure success",
        "Network with professionals in your industry",
        "Share insights and thought leadership content",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}
