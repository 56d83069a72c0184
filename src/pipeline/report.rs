use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FinalReport, MonthlyNote, PeriodMetrics, Profile};

use super::state::{AuditRecord, PipelineState};
use super::types::StageKind;

/// Number of analysis stages in the fixed sequence.
pub const TOTAL_AGENTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub total_agents: usize,
    pub agents_executed: usize,
    pub final_agent: StageKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResults {
    pub profile: Option<Profile>,
    pub monthly_analytics: Vec<PeriodMetrics>,
    pub monthly_notes: Vec<MonthlyNote>,
    pub executive_summary: String,
    pub recommendations: Vec<String>,
    pub final_report: Option<FinalReport>,
}

/// Result record handed back to callers of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub success: bool,
    pub subject_id: String,
    pub analysis_timestamp: DateTime<Utc>,
    pub data_quality_score: f64,
    pub workflow: WorkflowSummary,
    /// Present only when the run finished without errors.
    pub results: Option<RunResults>,
    /// Set by the summary or error-escalation stage; kept even on failure.
    pub final_report: Option<FinalReport>,
    pub errors: Vec<String>,
    pub audit_trail: Vec<AuditRecord>,
    pub messages: Vec<String>,
}

impl RunReport {
    pub fn from_state(state: PipelineState, analysis_timestamp: DateTime<Utc>) -> Self {
        let success = state.is_success();
        let workflow = WorkflowSummary {
            total_agents: TOTAL_AGENTS,
            agents_executed: state.audit_trail().len(),
            final_agent: state.current_agent(),
        };
        let errors = state.errors().to_vec();
        let audit_trail = state.audit_trail().to_vec();
        let messages = state
            .messages()
            .iter()
            .map(|message| message.content.clone())
            .collect();

        let results = success.then(|| RunResults {
            profile: state.raw_profile().cloned(),
            monthly_analytics: state.monthly_analytics().map(<[_]>::to_vec).unwrap_or_default(),
            monthly_notes: state.monthly_notes().map(<[_]>::to_vec).unwrap_or_default(),
            executive_summary: state.executive_summary().unwrap_or_default().to_string(),
            recommendations: state.recommendations().map(<[_]>::to_vec).unwrap_or_default(),
            final_report: state.final_report().cloned(),
        });
        let data_quality_score = state.data_quality_score().unwrap_or(0.0);
        let final_report = state.final_report().cloned();

        Self {
            success,
            subject_id: state.subject_id,
            analysis_timestamp,
            data_quality_score,
            workflow,
            results,
            final_report,
            errors,
            audit_trail,
            messages,
        }
    }
}
