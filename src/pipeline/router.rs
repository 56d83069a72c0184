use super::state::PipelineState;
use super::types::{Route, StageKind};

/// Failure count at which accumulated errors escalate to the error handler.
pub const RETRY_CEILING: u32 = 3;

/// Decide where a run goes next from the merged state alone.
///
/// Only `errors`, `retry_count` and `next_agent` are read, so the decision
/// can be reproduced from a serialized snapshot.
pub fn route(state: &PipelineState) -> Route {
    if !state.errors().is_empty() && state.retry_count() >= RETRY_CEILING {
        return Route::Stage(StageKind::ErrorHandler);
    }

    match state.next_agent() {
        Some(kind) if !kind.is_terminal() => Route::Stage(kind),
        _ => Route::End,
    }
}
