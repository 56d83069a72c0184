//! Orchestration core: the state aggregate, the stage contract, routing and
//! the execution loop.

pub mod engine;
pub mod error_handler;
pub mod report;
pub mod response;
pub mod router;
pub mod stages;
pub mod state;
pub mod transitions;
pub mod types;

pub use engine::{Engine, EngineBuilder, EngineStatus};
pub use error_handler::ErrorHandlerStage;
pub use report::{RunReport, RunResults, WorkflowSummary};
pub use response::{AgentResponse, StagePayload};
pub use router::{RETRY_CEILING, route};
pub use stages::Stage;
pub use state::{AgentMessage, AuditRecord, DataSources, PipelineState, StateDelta};
pub use transitions::{Edge, TransitionTable};
pub use types::{Route, StageKind};

#[cfg(test)]
mod tests;
