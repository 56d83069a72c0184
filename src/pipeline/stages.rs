use async_trait::async_trait;

use super::response::AgentResponse;
use super::state::PipelineState;
use super::types::StageKind;

/// A unit of pipeline work bound to one role.
///
/// Implementations may block on external I/O but must report every failure
/// through [`AgentResponse::failure`]; the return type leaves no other way
/// out. The engine sets `current_agent`/`next_agent` from the response, so a
/// stage only ever reads the state.
#[async_trait]
pub trait Stage: Send + Sync {
    fn kind(&self) -> StageKind;

    async fn process(&self, state: &PipelineState) -> AgentResponse;
}
