use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::{
    ContentPerformance, FinalReport, MonthlyNote, PeriodMetrics, Post, Profile, TemporalPatterns,
};

use super::response::{AgentResponse, StagePayload};
use super::types::StageKind;

/// Source kind → source-specific configuration. Opaque to the engine; only
/// the collection stage interprets it.
pub type DataSources = BTreeMap<String, Value>;

/// One entry of the execution transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub agent: StageKind,
    pub content: String,
}

/// One record per stage invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub agent: StageKind,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The record threaded through a pipeline run.
///
/// Snapshots are never mutated in place: [`PipelineState::apply`] returns a
/// new snapshot that carries every untouched field forward. Stage outputs
/// are readable through accessors and only written by `apply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub subject_id: String,
    pub data_sources: DataSources,

    raw_profile: Option<Profile>,
    raw_posts: Option<Vec<Post>>,
    data_quality_score: Option<f64>,

    monthly_analytics: Option<Vec<PeriodMetrics>>,
    content_performance: Option<ContentPerformance>,
    temporal_patterns: Option<TemporalPatterns>,

    monthly_notes: Option<Vec<MonthlyNote>>,
    executive_summary: Option<String>,
    recommendations: Option<Vec<String>>,
    final_report: Option<FinalReport>,

    current_agent: StageKind,
    next_agent: Option<StageKind>,

    errors: Vec<String>,
    retry_count: u32,

    messages: Vec<AgentMessage>,
    audit_trail: Vec<AuditRecord>,
}

impl PipelineState {
    pub fn new(subject_id: impl Into<String>, data_sources: DataSources) -> Self {
        Self {
            subject_id: subject_id.into(),
            data_sources,
            raw_profile: None,
            raw_posts: None,
            data_quality_score: None,
            monthly_analytics: None,
            content_performance: None,
            temporal_patterns: None,
            monthly_notes: None,
            executive_summary: None,
            recommendations: None,
            final_report: None,
            current_agent: StageKind::Ingestion,
            next_agent: None,
            errors: Vec::new(),
            retry_count: 0,
            messages: Vec::new(),
            audit_trail: Vec::new(),
        }
    }

    pub fn raw_profile(&self) -> Option<&Profile> {
        self.raw_profile.as_ref()
    }

    pub fn raw_posts(&self) -> Option<&[Post]> {
        self.raw_posts.as_deref()
    }

    pub fn data_quality_score(&self) -> Option<f64> {
        self.data_quality_score
    }

    pub fn monthly_analytics(&self) -> Option<&[PeriodMetrics]> {
        self.monthly_analytics.as_deref()
    }

    pub fn content_performance(&self) -> Option<&ContentPerformance> {
        self.content_performance.as_ref()
    }

    pub fn temporal_patterns(&self) -> Option<&TemporalPatterns> {
        self.temporal_patterns.as_ref()
    }

    pub fn monthly_notes(&self) -> Option<&[MonthlyNote]> {
        self.monthly_notes.as_deref()
    }

    pub fn executive_summary(&self) -> Option<&str> {
        self.executive_summary.as_deref()
    }

    pub fn recommendations(&self) -> Option<&[String]> {
        self.recommendations.as_deref()
    }

    /// Set by the summary or error-handler stage, whichever merges first.
    ///
    /// ```compile_fail
    /// let mut state = laie::PipelineState::new("jane", Default::default());
    /// state.final_report = None;
    /// ```
    pub fn final_report(&self) -> Option<&FinalReport> {
        self.final_report.as_ref()
    }

    pub fn current_agent(&self) -> StageKind {
        self.current_agent
    }

    pub fn next_agent(&self) -> Option<StageKind> {
        self.next_agent
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Escalation counter read by the router. Nothing in the engine raises
    /// it, so the escalation branch only fires for states built elsewhere.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn messages(&self) -> &[AgentMessage] {
        &self.messages
    }

    pub fn audit_trail(&self) -> &[AuditRecord] {
        &self.audit_trail
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Produce the next snapshot from this one and a stage delta.
    pub fn apply(&self, delta: StateDelta) -> PipelineState {
        let mut next = self.clone();
        let StateDelta {
            stage,
            outcome,
            timestamp,
        } = delta;

        match outcome {
            DeltaOutcome::Succeeded {
                payload,
                next_agent,
                message,
            } => {
                next.absorb(payload);
                next.current_agent = stage;
                next.next_agent = next_agent;
                next.messages.push(AgentMessage {
                    agent: stage,
                    content: message,
                });
                next.audit_trail.push(AuditRecord {
                    agent: stage,
                    action: stage.action().to_string(),
                    timestamp,
                    success: true,
                    error: None,
                });
            }
            DeltaOutcome::Failed { errors, message } => {
                next.errors.extend(errors);
                next.messages.push(AgentMessage {
                    agent: stage,
                    content: format!("{} failed: {message}", stage.display_name()),
                });
                next.audit_trail.push(AuditRecord {
                    agent: stage,
                    action: stage.action().to_string(),
                    timestamp,
                    success: false,
                    error: Some(message),
                });
            }
        }

        next
    }

    fn absorb(&mut self, payload: StagePayload) {
        match payload {
            StagePayload::Ingestion {
                profile,
                posts,
                quality_score,
            } => {
                self.raw_profile = Some(profile);
                self.raw_posts = Some(posts);
                self.data_quality_score = Some(quality_score);
            }
            StagePayload::Analytics {
                monthly_analytics,
                content_performance,
                temporal_patterns,
            } => {
                self.monthly_analytics = Some(monthly_analytics);
                self.content_performance = Some(content_performance);
                self.temporal_patterns = Some(temporal_patterns);
            }
            StagePayload::MonthlyAnalysis { notes } => {
                self.monthly_notes = Some(notes);
            }
            StagePayload::Summary {
                executive_summary,
                recommendations,
                final_report,
            } => {
                self.executive_summary = Some(executive_summary);
                self.recommendations = Some(recommendations);
                self.set_final_report(final_report);
            }
            StagePayload::ErrorReport(report) => {
                self.set_final_report(FinalReport::Error(report));
            }
        }
    }

    fn set_final_report(&mut self, report: FinalReport) {
        if self.final_report.is_some() {
            warn!(
                subject_id = %self.subject_id,
                "final report already set; ignoring second write"
            );
            return;
        }
        self.final_report = Some(report);
    }

    /// Merge a successful `payload` from the stage that owns it.
    #[cfg(test)]
    pub(crate) fn merged(&self, payload: StagePayload) -> Self {
        let stage = payload.kind();
        self.apply(StateDelta::from_response(
            stage,
            AgentResponse::success(payload, format!("{stage} ok"), None),
            Utc::now(),
        ))
    }

    #[cfg(test)]
    pub(crate) fn with_errors<I, S>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.errors.extend(errors.into_iter().map(Into::into));
        self
    }

    #[cfg(test)]
    pub(crate) fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count.max(self.retry_count);
        self
    }

    #[cfg(test)]
    pub(crate) fn with_next_agent(mut self, next_agent: Option<StageKind>) -> Self {
        self.next_agent = next_agent;
        self
    }
}

/// Change produced by one stage invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDelta {
    stage: StageKind,
    outcome: DeltaOutcome,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
enum DeltaOutcome {
    Succeeded {
        payload: StagePayload,
        next_agent: Option<StageKind>,
        message: String,
    },
    Failed {
        errors: Vec<String>,
        message: String,
    },
}

impl StateDelta {
    /// Convert a stage response into a delta for `stage`.
    ///
    /// A successful response whose payload belongs to another role is
    /// recorded as a failure of `stage`.
    pub fn from_response(stage: StageKind, response: AgentResponse, timestamp: DateTime<Utc>) -> Self {
        let success = response.is_success();
        let (data, next_agent, errors, message) = response.into_parts();

        let outcome = match (success, data) {
            (true, Some(payload)) if payload.kind() == stage => DeltaOutcome::Succeeded {
                payload,
                next_agent,
                message,
            },
            (true, Some(payload)) => {
                let error = format!(
                    "{stage} stage returned a payload for {}",
                    payload.kind()
                );
                DeltaOutcome::Failed {
                    errors: vec![error.clone()],
                    message: error,
                }
            }
            (true, None) => {
                let error = format!("{stage} stage reported success without data");
                DeltaOutcome::Failed {
                    errors: vec![error.clone()],
                    message: error,
                }
            }
            (false, _) => DeltaOutcome::Failed { errors, message },
        };

        Self {
            stage,
            outcome,
            timestamp,
        }
    }

    pub fn stage(&self) -> StageKind {
        self.stage
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, DeltaOutcome::Succeeded { .. })
    }
}
