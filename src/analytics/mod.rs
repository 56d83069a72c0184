//! Deterministic metrics over the collected posts.

mod compute;

pub use compute::{content_performance, period_metrics, temporal_patterns};

use anyhow::{Result, bail};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::AnalysisWindow;
use crate::pipeline::{AgentResponse, PipelineState, Stage, StageKind, StagePayload};

#[derive(Debug, Clone, Copy)]
pub struct AnalyticsStage {
    window: AnalysisWindow,
}

impl AnalyticsStage {
    pub fn new(window: AnalysisWindow) -> Self {
        Self { window }
    }

    fn compute(&self, state: &PipelineState) -> Result<StagePayload> {
        let (Some(profile), Some(posts)) = (state.raw_profile(), state.raw_posts()) else {
            bail!("Insufficient data for analytics");
        };
        if posts.is_empty() {
            bail!("Insufficient data for analytics");
        }

        let monthly_analytics = period_metrics(&profile.user_id, posts);
        info!(
            subject_id = %state.subject_id,
            periods = monthly_analytics.len(),
            posts = posts.len(),
            "computed period metrics"
        );

        Ok(StagePayload::Analytics {
            monthly_analytics,
            content_performance: content_performance(posts),
            temporal_patterns: temporal_patterns(posts, &self.window),
        })
    }
}

#[async_trait]
impl Stage for AnalyticsStage {
    fn kind(&self) -> StageKind {
        StageKind::Analytics
    }

    async fn process(&self, state: &PipelineState) -> AgentResponse {
        let result = self.compute(state).map(|payload| {
            (
                payload,
                "Analytics computation completed successfully".to_string(),
            )
        });
        if let Err(error) = &result {
            warn!(subject_id = %state.subject_id, %error, "analytics computation failed");
        }
        AgentResponse::from_result(
            result,
            Some(StageKind::MonthlyAnalysis),
            "Analytics computation failed",
        )
    }
}
