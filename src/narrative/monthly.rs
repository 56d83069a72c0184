use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::client::DynChatClient;
use crate::config::ModelSettings;
use crate::domain::{MonthlyNote, PeriodMetrics};
use crate::pipeline::{AgentResponse, PipelineState, Stage, StageKind, StagePayload};

use super::fallback::fallback_note;
use super::parsing::parse_monthly_note;
use super::{complete, prompts};

/// Writes one narrative note per period of metrics.
pub struct MonthlyAnalysisStage {
    client: Option<Arc<DynChatClient>>,
    models: ModelSettings,
}

impl MonthlyAnalysisStage {
    pub fn new(client: Option<Arc<DynChatClient>>, models: ModelSettings) -> Self {
        Self { client, models }
    }

    async fn note_for(&self, subject_name: &str, metrics: &PeriodMetrics) -> MonthlyNote {
        let prompt = prompts::monthly_note(subject_name, metrics);
        match complete(self.client.as_deref(), &self.models, prompt).await {
            Ok(answer) => {
                debug!(month = %metrics.month, "parsing monthly note");
                parse_monthly_note(&metrics.month, &answer)
            }
            Err(error) => {
                warn!(month = %metrics.month, error = %format!("{error:#}"), "using fallback monthly note");
                fallback_note(subject_name, metrics)
            }
        }
    }

    async fn write_notes(&self, state: &PipelineState) -> Result<Vec<MonthlyNote>> {
        let periods = state.monthly_analytics().unwrap_or_default();
        if periods.is_empty() {
            bail!("No monthly analytics data available");
        }

        let subject_name = state
            .raw_profile()
            .map(|profile| profile.full_name.as_str())
            .unwrap_or("Professional");

        let mut notes = Vec::with_capacity(periods.len());
        for metrics in periods {
            notes.push(self.note_for(subject_name, metrics).await);
        }
        Ok(notes)
    }
}

#[async_trait]
impl Stage for MonthlyAnalysisStage {
    fn kind(&self) -> StageKind {
        StageKind::MonthlyAnalysis
    }

    async fn process(&self, state: &PipelineState) -> AgentResponse {
        let result = self.write_notes(state).await.map(|notes| {
            info!(subject_id = %state.subject_id, notes = notes.len(), "generated monthly notes");
            let message = format!("Generated {} monthly activity notes", notes.len());
            (StagePayload::MonthlyAnalysis { notes }, message)
        });
        if let Err(error) = &result {
            warn!(subject_id = %state.subject_id, %error, "monthly analysis failed");
        }
        AgentResponse::from_result(result, Some(StageKind::Summary), "Monthly analysis failed")
    }
}
