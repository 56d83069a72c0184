use std::fmt;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Named roles in the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Ingestion,
    Analytics,
    MonthlyAnalysis,
    Summary,
    ErrorHandler,
}

impl StageKind {
    pub const ALL: [StageKind; 5] = [
        StageKind::Ingestion,
        StageKind::Analytics,
        StageKind::MonthlyAnalysis,
        StageKind::Summary,
        StageKind::ErrorHandler,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Ingestion => "ingestion",
            StageKind::Analytics => "analytics",
            StageKind::MonthlyAnalysis => "monthly_analysis",
            StageKind::Summary => "summary",
            StageKind::ErrorHandler => "error_handler",
        }
    }

    /// Label used when a failed invocation is written to the transcript.
    pub fn display_name(self) -> &'static str {
        match self {
            StageKind::Ingestion => "Ingestion",
            StageKind::Analytics => "Analytics",
            StageKind::MonthlyAnalysis => "Monthly analysis",
            StageKind::Summary => "Summary",
            StageKind::ErrorHandler => "Error handler",
        }
    }

    /// Action recorded in the audit trail for this role.
    pub fn action(self) -> &'static str {
        match self {
            StageKind::Ingestion => "data_collection",
            StageKind::Analytics => "analytics_computation",
            StageKind::MonthlyAnalysis => "monthly_notes_generation",
            StageKind::Summary => "final_report_generation",
            StageKind::ErrorHandler => "error_report_generation",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, StageKind::ErrorHandler)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| anyhow!("Unknown stage '{s}'"))
    }
}

/// Decision produced by the router after a stage has been merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Stage(StageKind),
    End,
}

impl Route {
    /// Every value the router can produce, used to check transition tables.
    pub fn all() -> impl Iterator<Item = Route> {
        StageKind::ALL
            .into_iter()
            .map(Route::Stage)
            .chain(std::iter::once(Route::End))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Stage(kind) => write!(f, "{kind}"),
            Route::End => f.write_str("end"),
        }
    }
}
