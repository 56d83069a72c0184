//! Records exchanged between the pipeline stages.

mod metrics;
mod profile;
mod report;
mod window;

pub use metrics::{ContentPerformance, ContentStats, PeriodMetrics, TemporalPatterns};
pub use profile::{ContentType, Post, Profile};
pub use report::{
    AnalysisPeriod, AnalysisReport, ErrorReport, FinalReport, MonthlyNote, NoteAnalysis,
    PartialData, ProfileSummary,
};
pub use window::AnalysisWindow;
