use async_trait::async_trait;
use tracing::error;

use crate::domain::{ErrorReport, PartialData};

use super::response::{AgentResponse, StagePayload};
use super::stages::Stage;
use super::state::PipelineState;
use super::types::StageKind;

pub const ERROR_RECOMMENDATION: &str = "Please check data sources and try again";
pub const ERROR_HANDLER_MESSAGE: &str =
    "Workflow completed with errors - see final_report for details";

/// Terminal stage that turns accumulated failures into a fallback report.
/// It never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorHandlerStage;

impl ErrorHandlerStage {
    pub fn build_report(state: &PipelineState) -> ErrorReport {
        ErrorReport {
            error_report: true,
            errors: state.errors().to_vec(),
            partial_data: PartialData {
                profile: state.raw_profile().cloned(),
                monthly_analytics: state.monthly_analytics().map(<[_]>::to_vec).unwrap_or_default(),
            },
            recommendation: ERROR_RECOMMENDATION.to_string(),
        }
    }
}

#[async_trait]
impl Stage for ErrorHandlerStage {
    fn kind(&self) -> StageKind {
        StageKind::ErrorHandler
    }

    async fn process(&self, state: &PipelineState) -> AgentResponse {
        error!(
            subject_id = %state.subject_id,
            errors = ?state.errors(),
            "workflow failed with errors"
        );
        let report = Self::build_report(state);
        AgentResponse::success(
            StagePayload::ErrorReport(report),
            ERROR_HANDLER_MESSAGE,
            None,
        )
    }
}
