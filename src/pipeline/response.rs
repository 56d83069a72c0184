use anyhow::Result;

use crate::domain::{
    ContentPerformance, ErrorReport, FinalReport, MonthlyNote, PeriodMetrics, Post, Profile,
    TemporalPatterns,
};

use super::types::StageKind;

/// Output produced by a successful stage, one variant per role.
#[derive(Debug, Clone, PartialEq)]
pub enum StagePayload {
    Ingestion {
        profile: Profile,
        posts: Vec<Post>,
        quality_score: f64,
    },
    Analytics {
        monthly_analytics: Vec<PeriodMetrics>,
        content_performance: ContentPerformance,
        temporal_patterns: TemporalPatterns,
    },
    MonthlyAnalysis {
        notes: Vec<MonthlyNote>,
    },
    Summary {
        executive_summary: String,
        recommendations: Vec<String>,
        final_report: FinalReport,
    },
    ErrorReport(ErrorReport),
}

impl StagePayload {
    /// Role whose state fields this payload populates.
    pub fn kind(&self) -> StageKind {
        match self {
            StagePayload::Ingestion { .. } => StageKind::Ingestion,
            StagePayload::Analytics { .. } => StageKind::Analytics,
            StagePayload::MonthlyAnalysis { .. } => StageKind::MonthlyAnalysis,
            StagePayload::Summary { .. } => StageKind::Summary,
            StagePayload::ErrorReport(_) => StageKind::ErrorHandler,
        }
    }
}

/// Self-contained success or failure report returned by every stage.
///
/// Constructed only through [`AgentResponse::success`] and
/// [`AgentResponse::failure`], so `data` is present exactly when the stage
/// succeeded and `errors` is non-empty exactly when it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    success: bool,
    data: Option<StagePayload>,
    next_agent: Option<StageKind>,
    errors: Vec<String>,
    message: String,
}

impl AgentResponse {
    pub fn success(
        data: StagePayload,
        message: impl Into<String>,
        next_agent: Option<StageKind>,
    ) -> Self {
        Self {
            success: true,
            data: Some(data),
            next_agent,
            errors: Vec::new(),
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        let error = if error.trim().is_empty() {
            "unknown error".to_string()
        } else {
            error
        };
        Self {
            success: false,
            data: None,
            next_agent: None,
            errors: vec![error],
            message: message.into(),
        }
    }

    /// Convert a stage-internal result into a response, prefixing failures.
    pub fn from_result(
        result: Result<(StagePayload, String)>,
        next_agent: Option<StageKind>,
        failure_prefix: &str,
    ) -> Self {
        match result {
            Ok((payload, message)) => Self::success(payload, message, next_agent),
            Err(error) => {
                let error = error.to_string();
                Self::failure(format!("{failure_prefix}: {error}"), error)
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&StagePayload> {
        self.data.as_ref()
    }

    pub fn next_agent(&self) -> Option<StageKind> {
        self.next_agent
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn into_parts(self) -> (Option<StagePayload>, Option<StageKind>, Vec<String>, String) {
        (self.data, self.next_agent, self.errors, self.message)
    }
}
