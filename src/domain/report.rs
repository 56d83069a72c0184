use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::PeriodMetrics;
use super::profile::Profile;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

/// Narrative note written for one month of activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyNote {
    pub month: String,
    pub activity_summary: String,
    pub key_achievements: Vec<String>,
    pub content_performance: NoteAnalysis,
    pub engagement_highlights: Vec<String>,
    pub recommendations: Vec<String>,
    pub ai_insights: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    pub start: String,
    pub end: String,
    pub total_months: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub name: String,
    pub headline: String,
    pub followers: u64,
    pub connections: u64,
}

impl ProfileSummary {
    pub fn from_profile(profile: Option<&Profile>) -> Self {
        match profile {
            Some(profile) => Self {
                name: profile.full_name.clone(),
                headline: profile.headline.clone(),
                followers: profile.followers_count,
                connections: profile.connections_count,
            },
            None => Self {
                name: String::new(),
                headline: String::new(),
                followers: 0,
                connections: 0,
            },
        }
    }
}

/// Report produced when every stage of the pipeline succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_title: String,
    pub analysis_period: AnalysisPeriod,
    pub profile_summary: ProfileSummary,
    pub executive_summary: String,
    pub monthly_activity_notes: Vec<MonthlyNote>,
    pub key_recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub report_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialData {
    pub profile: Option<Profile>,
    pub monthly_analytics: Vec<PeriodMetrics>,
}

/// Fallback report assembled by the error-escalation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error_report: bool,
    pub errors: Vec<String>,
    pub partial_data: PartialData,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FinalReport {
    Analysis(AnalysisReport),
    Error(ErrorReport),
}

impl FinalReport {
    pub fn is_error(&self) -> bool {
        matches!(self, FinalReport::Error(_))
    }

    pub fn executive_summary(&self) -> Option<&str> {
        match self {
            FinalReport::Analysis(report) => Some(&report.executive_summary),
            FinalReport::Error(_) => None,
        }
    }

    pub fn recommendations(&self) -> &[String] {
        match self {
            FinalReport::Analysis(report) => &report.key_recommendations,
            FinalReport::Error(_) => &[],
        }
    }
}
