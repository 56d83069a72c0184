use std::collections::BTreeMap;

use anyhow::{Result, anyhow, bail};

use super::router::route;
use super::state::PipelineState;
use super::types::{Route, StageKind};

/// Outgoing edge kind for a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Always continue with the given stage, or stop when `None`.
    Always(Option<StageKind>),
    /// Continue with the given stage whether or not the stage succeeded,
    /// unless the router escalates to the error handler.
    Sequential(StageKind),
    /// Consult the router and look the result up in the table.
    Conditional,
}

/// Explicit `(stage, route) → next stage` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    edges: BTreeMap<StageKind, Edge>,
    conditional: BTreeMap<(StageKind, Route), Option<StageKind>>,
}

impl TransitionTable {
    /// Build a table, rejecting it unless every stage has an edge and every
    /// conditional stage maps every possible route.
    pub fn new(
        edges: impl IntoIterator<Item = (StageKind, Edge)>,
        conditional: impl IntoIterator<Item = ((StageKind, Route), Option<StageKind>)>,
    ) -> Result<Self> {
        let edges: BTreeMap<_, _> = edges.into_iter().collect();
        let conditional: BTreeMap<_, _> = conditional.into_iter().collect();

        for kind in StageKind::ALL {
            let edge = edges
                .get(&kind)
                .ok_or_else(|| anyhow!("No outgoing edge declared for stage '{kind}'"))?;

            if *edge == Edge::Conditional {
                for route in Route::all() {
                    if !conditional.contains_key(&(kind, route)) {
                        bail!("Conditional stage '{kind}' has no transition for route '{route}'");
                    }
                }
            }
        }

        for (from, _) in conditional.keys() {
            if edges.get(from) != Some(&Edge::Conditional) {
                bail!("Stage '{from}' has conditional transitions but an unconditional edge");
            }
        }

        Ok(Self { edges, conditional })
    }

    /// The fixed analysis graph:
    /// `ingestion → analytics ⇒ monthly_analysis ⇒ summary → end`, with
    /// `⇒` diverting to the error handler when the router escalates and
    /// `error_handler → end`. A failed stage still hands over to its
    /// successor, so failures cascade down the sequence.
    pub fn standard() -> Result<Self> {
        let edges = [
            (StageKind::Ingestion, Edge::Always(Some(StageKind::Analytics))),
            (StageKind::Analytics, Edge::Sequential(StageKind::MonthlyAnalysis)),
            (StageKind::MonthlyAnalysis, Edge::Sequential(StageKind::Summary)),
            (StageKind::Summary, Edge::Always(None)),
            (StageKind::ErrorHandler, Edge::Always(None)),
        ];

        Self::new(edges, Vec::new())
    }

    pub fn edge(&self, from: StageKind) -> Edge {
        self.edges.get(&from).copied().unwrap_or(Edge::Always(None))
    }

    /// Stage to invoke after `from` has been merged into `state`.
    pub fn next(&self, from: StageKind, state: &PipelineState) -> Option<StageKind> {
        match self.edge(from) {
            Edge::Always(next) => next,
            Edge::Sequential(next) => match route(state) {
                Route::Stage(StageKind::ErrorHandler) => Some(StageKind::ErrorHandler),
                Route::Stage(_) | Route::End => Some(next),
            },
            Edge::Conditional => self.lookup(from, route(state)),
        }
    }

    pub fn lookup(&self, from: StageKind, route: Route) -> Option<StageKind> {
        self.conditional.get(&(from, route)).copied().flatten()
    }

    /// Human-readable rows, one per edge, for status output.
    pub fn describe(&self) -> Vec<String> {
        let mut rows = Vec::new();
        for (from, edge) in &self.edges {
            match edge {
                Edge::Always(next) => rows.push(format!("{from} -> {}", label(*next))),
                Edge::Sequential(next) => {
                    rows.push(format!("{from} -> {next}"));
                    rows.push(format!(
                        "{from} [{}] -> {}",
                        StageKind::ErrorHandler,
                        StageKind::ErrorHandler
                    ));
                }
                Edge::Conditional => {
                    for ((source, route), next) in &self.conditional {
                        if source == from && (next.is_some() || *route == Route::End) {
                            rows.push(format!("{from} [{route}] -> {}", label(*next)));
                        }
                    }
                }
            }
        }
        rows
    }
}

fn label(next: Option<StageKind>) -> String {
    next.map(|kind| kind.to_string())
        .unwrap_or_else(|| "end".to_string())
}
