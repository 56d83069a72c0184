use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analytics::AnalyticsStage;
use crate::client::DynChatClient;
use crate::config::Config;
use crate::ingestion::IngestionStage;
use crate::narrative::{MonthlyAnalysisStage, SummaryStage};

use super::error_handler::ErrorHandlerStage;
use super::report::RunReport;
use super::stages::Stage;
use super::state::{DataSources, PipelineState, StateDelta};
use super::transitions::TransitionTable;
use super::types::StageKind;

/// Drives one pipeline run per call. Holds no run-scoped state, so a single
/// engine can serve independent runs concurrently.
pub struct Engine {
    stages: BTreeMap<StageKind, Arc<dyn Stage>>,
    transitions: TransitionTable,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("stages", &self.stages.keys().collect::<Vec<_>>())
            .field("transitions", &self.transitions)
            .finish()
    }
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// Upper bound on stage invocations per run.
    pub fn max_invocations(&self) -> usize {
        StageKind::ALL.len() + 1
    }

    /// Roles wired into this engine, in pipeline order.
    pub fn roles(&self) -> Vec<StageKind> {
        self.stages.keys().copied().collect()
    }

    /// Wired roles and the transition table, one row per edge.
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            roles: self.roles(),
            max_invocations: self.max_invocations(),
            transitions: self.transitions.describe(),
        }
    }

    /// Invoke one stage against `state` and return the merged snapshot.
    pub async fn invoke(&self, kind: StageKind, state: &PipelineState) -> Result<PipelineState> {
        let stage = self
            .stages
            .get(&kind)
            .ok_or_else(|| anyhow!("No stage registered for role '{kind}'"))?;

        debug!(subject_id = %state.subject_id, stage = %kind, "invoking stage");
        let response = stage.process(state).await;
        let delta = StateDelta::from_response(kind, response, Utc::now());
        if !delta.succeeded() {
            warn!(subject_id = %state.subject_id, stage = %kind, "stage failed");
        }
        Ok(state.apply(delta))
    }

    /// Run the whole pipeline for one subject and return the final state.
    pub async fn run(&self, subject_id: impl Into<String>, data_sources: DataSources) -> PipelineState {
        let mut state = PipelineState::new(subject_id, data_sources);
        info!(subject_id = %state.subject_id, "starting analysis run");

        let mut current = Some(StageKind::Ingestion);
        let mut invocations = 0;

        while let Some(kind) = current {
            if invocations >= self.max_invocations() {
                warn!(
                    subject_id = %state.subject_id,
                    invocations,
                    "invocation limit reached; stopping run"
                );
                break;
            }

            state = match self.invoke(kind, &state).await {
                Ok(next) => next,
                Err(error) => {
                    warn!(subject_id = %state.subject_id, stage = %kind, %error, "cannot dispatch stage");
                    break;
                }
            };
            invocations += 1;

            current = self.transitions.next(kind, &state);
            debug!(
                subject_id = %state.subject_id,
                from = %kind,
                to = %current.map(|next| next.to_string()).unwrap_or_else(|| "end".to_string()),
                "routed"
            );
        }

        info!(
            subject_id = %state.subject_id,
            invocations,
            success = state.is_success(),
            "analysis run finished"
        );
        state
    }

    /// Run the pipeline and flatten the final state into a result record.
    pub async fn analyze(&self, subject_id: impl Into<String>, data_sources: DataSources) -> RunReport {
        let state = self.run(subject_id, data_sources).await;
        RunReport::from_state(state, Utc::now())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    pub roles: Vec<StageKind>,
    pub max_invocations: usize,
    pub transitions: Vec<String>,
}

pub struct EngineBuilder {
    stages: Vec<Arc<dyn Stage>>,
    transitions: Option<TransitionTable>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            transitions: None,
        }
    }

    pub fn add_stage<S>(self, stage: S) -> Self
    where
        S: Stage + 'static,
    {
        self.add_shared(Arc::new(stage))
    }

    pub fn add_shared(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn with_transitions(mut self, transitions: TransitionTable) -> Self {
        self.transitions = Some(transitions);
        self
    }

    /// Wire the production stages for every role.
    pub fn with_standard_stages(
        self,
        config: &Config,
        client: Option<Arc<DynChatClient>>,
    ) -> Result<Self> {
        let ingestion = IngestionStage::from_config(config)?;
        Ok(self
            .add_stage(ingestion)
            .add_stage(AnalyticsStage::new(config.analysis.window()))
            .add_stage(MonthlyAnalysisStage::new(client.clone(), config.models.clone()))
            .add_stage(SummaryStage::new(
                client,
                config.models.clone(),
                config.analysis.window(),
            ))
            .add_stage(ErrorHandlerStage))
    }

    pub fn build(self) -> Result<Engine> {
        let mut stages: BTreeMap<StageKind, Arc<dyn Stage>> = BTreeMap::new();
        for stage in self.stages {
            let kind = stage.kind();
            if stages.insert(kind, stage).is_some() {
                bail!("Stage role '{kind}' registered more than once");
            }
        }

        stages
            .entry(StageKind::ErrorHandler)
            .or_insert_with(|| Arc::new(ErrorHandlerStage));

        let missing: Vec<String> = StageKind::ALL
            .into_iter()
            .filter(|kind| !stages.contains_key(kind))
            .map(|kind| kind.to_string())
            .collect();
        if !missing.is_empty() {
            bail!("Missing stage roles: {}", missing.join(", "));
        }

        let transitions = match self.transitions {
            Some(table) => table,
            None => TransitionTable::standard()?,
        };

        Ok(Engine {
            stages,
            transitions,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
