use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::client::DynChatClient;
use crate::config::ModelSettings;
use crate::domain::{
    AnalysisPeriod, AnalysisReport, AnalysisWindow, FinalReport, PeriodMetrics, ProfileSummary,
};
use crate::pipeline::{AgentResponse, PipelineState, Stage, StageKind, StagePayload};

use super::complete;
use super::fallback::{fallback_recommendations, fallback_summary};
use super::parsing::parse_recommendations;
use super::prompts::{self, SummaryFacts};

const REPORT_VERSION: &str = "1.0";

/// Closes a run with an executive summary, recommendations and the final
/// report.
pub struct SummaryStage {
    client: Option<Arc<DynChatClient>>,
    models: ModelSettings,
    window: AnalysisWindow,
}

impl SummaryStage {
    pub fn new(
        client: Option<Arc<DynChatClient>>,
        models: ModelSettings,
        window: AnalysisWindow,
    ) -> Self {
        Self {
            client,
            models,
            window,
        }
    }

    async fn summarize(&self, state: &PipelineState) -> Result<StagePayload> {
        let notes = state.monthly_notes().unwrap_or_default();
        if notes.is_empty() {
            bail!("No monthly notes available for summary");
        }

        let metrics = state.monthly_analytics().unwrap_or_default();
        let subject_name = state
            .raw_profile()
            .map(|profile| profile.full_name.as_str())
            .unwrap_or("Professional");
        let total_posts: u64 = metrics.iter().map(|period| period.posts_count).sum();
        let avg_engagement = average_engagement(metrics);

        let facts = SummaryFacts {
            subject_name,
            period: (self.window.start_label(), self.window.end_label()),
            total_months: notes.len(),
            total_posts,
            avg_engagement,
            best_month: best_month(metrics),
            content_performance: state.content_performance(),
            temporal_patterns: state.temporal_patterns(),
            notes,
        };

        let executive_summary = match complete(
            self.client.as_deref(),
            &self.models,
            prompts::executive_summary(&facts),
        )
        .await
        {
            Ok(summary) => summary,
            Err(error) => {
                warn!(error = %format!("{error:#}"), "using fallback executive summary");
                fallback_summary(subject_name, total_posts, avg_engagement)
            }
        };

        let recommendations = match complete(
            self.client.as_deref(),
            &self.models,
            prompts::recommendations(
                state.content_performance(),
                state.temporal_patterns(),
                metrics,
            ),
        )
        .await
        {
            Ok(answer) => parse_recommendations(&answer),
            Err(error) => {
                warn!(error = %format!("{error:#}"), "using fallback recommendations");
                fallback_recommendations()
            }
        };

        let final_report = FinalReport::Analysis(AnalysisReport {
            report_title: format!("LinkedIn Activity Intelligence Report - {subject_name}"),
            analysis_period: AnalysisPeriod {
                start: self.window.start_label(),
                end: self.window.end_label(),
                total_months: notes.len(),
            },
            profile_summary: ProfileSummary::from_profile(state.raw_profile()),
            executive_summary: executive_summary.clone(),
            monthly_activity_notes: notes.to_vec(),
            key_recommendations: recommendations.clone(),
            generated_at: Utc::now(),
            report_version: REPORT_VERSION.to_string(),
        });

        Ok(StagePayload::Summary {
            executive_summary,
            recommendations,
            final_report,
        })
    }
}

fn average_engagement(metrics: &[PeriodMetrics]) -> f64 {
    if metrics.is_empty() {
        return 0.0;
    }
    metrics.iter().map(|period| period.engagement_rate).sum::<f64>() / metrics.len() as f64
}

/// Month with the most impressions; the earliest wins a tie.
fn best_month(metrics: &[PeriodMetrics]) -> Option<&str> {
    let mut best: Option<&PeriodMetrics> = None;
    for period in metrics {
        if best.is_none_or(|top| period.total_impressions > top.total_impressions) {
            best = Some(period);
        }
    }
    best.map(|period| period.month.as_str())
}

#[async_trait]
impl Stage for SummaryStage {
    fn kind(&self) -> StageKind {
        StageKind::Summary
    }

    async fn process(&self, state: &PipelineState) -> AgentResponse {
        let result = self.summarize(state).await.map(|payload| {
            info!(subject_id = %state.subject_id, "generated executive summary");
            (
                payload,
                "Executive summary and recommendations generated successfully".to_string(),
            )
        });
        if let Err(error) = &result {
            warn!(subject_id = %state.subject_id, %error, "summary generation failed");
        }
        AgentResponse::from_result(result, None, "Summary generation failed")
    }
}
