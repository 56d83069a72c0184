use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;

use crate::config::Config;
use crate::domain::{
    AnalysisPeriod, AnalysisReport, ContentPerformance, FinalReport, Profile, ProfileSummary,
    TemporalPatterns,
};

use super::error_handler::{ERROR_HANDLER_MESSAGE, ERROR_RECOMMENDATION};
use super::*;

type CallLog = Arc<Mutex<Vec<StageKind>>>;

enum Script {
    Succeed(Option<StageKind>),
    Fail(&'static str),
    /// Succeed but hand back another role's payload.
    WrongPayload,
}

/// Stage whose outcome is fixed up front; records every invocation.
struct ScriptedStage {
    kind: StageKind,
    script: Script,
    calls: CallLog,
}

impl ScriptedStage {
    fn new(kind: StageKind, script: Script, calls: &CallLog) -> Self {
        Self {
            kind,
            script,
            calls: calls.clone(),
        }
    }
}

#[async_trait]
impl Stage for ScriptedStage {
    fn kind(&self) -> StageKind {
        self.kind
    }

    async fn process(&self, _state: &PipelineState) -> AgentResponse {
        self.calls.lock().unwrap().push(self.kind);
        match self.script {
            Script::Succeed(next) => {
                AgentResponse::success(payload_for(self.kind), format!("{} ok", self.kind), next)
            }
            Script::Fail(error) => {
                AgentResponse::failure(format!("{} broke: {error}", self.kind), error)
            }
            Script::WrongPayload => AgentResponse::success(
                StagePayload::MonthlyAnalysis { notes: Vec::new() },
                "wrong",
                None,
            ),
        }
    }
}

fn profile() -> Profile {
    Profile {
        user_id: "jane".to_string(),
        full_name: "Jane Doe".to_string(),
        headline: "Engineer".to_string(),
        followers_count: 10,
        connections_count: 5,
        industry: None,
        location: None,
        about: None,
    }
}

fn analysis_report(summary: &str) -> FinalReport {
    FinalReport::Analysis(AnalysisReport {
        report_title: "LinkedIn Activity Intelligence Report - Jane Doe".to_string(),
        analysis_period: AnalysisPeriod {
            start: "January 2025".to_string(),
            end: "January 2026".to_string(),
            total_months: 0,
        },
        profile_summary: ProfileSummary::from_profile(None),
        executive_summary: summary.to_string(),
        monthly_activity_notes: Vec::new(),
        key_recommendations: vec!["Post weekly".to_string()],
        generated_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        report_version: "1.0".to_string(),
    })
}

fn payload_for(kind: StageKind) -> StagePayload {
    match kind {
        StageKind::Ingestion => StagePayload::Ingestion {
            profile: profile(),
            posts: Vec::new(),
            quality_score: 0.75,
        },
        StageKind::Analytics => StagePayload::Analytics {
            monthly_analytics: Vec::new(),
            content_performance: ContentPerformance::default(),
            temporal_patterns: TemporalPatterns::default(),
        },
        StageKind::MonthlyAnalysis => StagePayload::MonthlyAnalysis { notes: Vec::new() },
        StageKind::Summary => StagePayload::Summary {
            executive_summary: "A strong year".to_string(),
            recommendations: vec!["Post weekly".to_string()],
            final_report: analysis_report("A strong year"),
        },
        StageKind::ErrorHandler => StagePayload::ErrorReport(ErrorHandlerStage::build_report(
            &PipelineState::new("jane", DataSources::new()),
        )),
    }
}

fn happy_path(calls: &CallLog) -> EngineBuilder {
    Engine::builder()
        .add_stage(ScriptedStage::new(
            StageKind::Ingestion,
            Script::Succeed(Some(StageKind::Analytics)),
            calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::Analytics,
            Script::Succeed(Some(StageKind::MonthlyAnalysis)),
            calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::MonthlyAnalysis,
            Script::Succeed(Some(StageKind::Summary)),
            calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::Summary,
            Script::Succeed(None),
            calls,
        ))
}

fn calls() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn ts() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn full_success_records_one_entry_per_stage() {
    let calls = calls();
    let engine = happy_path(&calls).build().unwrap();

    let state = engine.run("jane", DataSources::new()).await;

    assert!(state.is_success());
    assert_eq!(
        *calls.lock().unwrap(),
        [
            StageKind::Ingestion,
            StageKind::Analytics,
            StageKind::MonthlyAnalysis,
            StageKind::Summary
        ]
    );
    assert_eq!(state.audit_trail().len(), 4);
    assert!(state.audit_trail().iter().all(|record| record.success));
    let actions: Vec<&str> = state
        .audit_trail()
        .iter()
        .map(|record| record.action.as_str())
        .collect();
    assert_eq!(
        actions,
        [
            "data_collection",
            "analytics_computation",
            "monthly_notes_generation",
            "final_report_generation"
        ]
    );
    let messages: Vec<&str> = state
        .messages()
        .iter()
        .map(|message| message.content.as_str())
        .collect();
    assert_eq!(
        messages,
        ["ingestion ok", "analytics ok", "monthly_analysis ok", "summary ok"]
    );
    assert_eq!(state.current_agent(), StageKind::Summary);
    assert_eq!(state.next_agent(), None);

    let report = state.final_report().unwrap();
    assert_eq!(report.executive_summary(), Some("A strong year"));
    assert_eq!(report.recommendations(), ["Post weekly"]);
}

#[tokio::test]
async fn run_report_flattens_successful_state() {
    let calls = calls();
    let engine = happy_path(&calls).build().unwrap();

    let report = engine.analyze("jane", DataSources::new()).await;

    assert!(report.success);
    assert_eq!(report.subject_id, "jane");
    assert_eq!(report.data_quality_score, 0.75);
    assert_eq!(report.workflow.total_agents, 4);
    assert_eq!(report.workflow.agents_executed, 4);
    assert_eq!(report.workflow.final_agent, StageKind::Summary);
    let results = report.results.as_ref().unwrap();
    assert_eq!(results.executive_summary, "A strong year");
    assert_eq!(results.profile.as_ref().unwrap().full_name, "Jane Doe");
    assert_eq!(report.messages.len(), 4);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["audit_trail"][0]["agent"], "ingestion");
    assert_eq!(json["final_report"]["kind"], "analysis");
}

/// Table whose analytics and monthly stages stop unless the stage named its
/// successor, and escalate to the error handler for any other route.
fn conditional_table(escalate_rest: bool) -> TransitionTable {
    let mut conditional = Vec::new();
    for (from, expected) in [
        (StageKind::Analytics, StageKind::MonthlyAnalysis),
        (StageKind::MonthlyAnalysis, StageKind::Summary),
    ] {
        for route in Route::all() {
            let next = match route {
                Route::Stage(kind) if kind == expected => Some(kind),
                Route::Stage(StageKind::ErrorHandler) => Some(StageKind::ErrorHandler),
                _ if escalate_rest => Some(StageKind::ErrorHandler),
                _ => None,
            };
            conditional.push(((from, route), next));
        }
    }
    TransitionTable::new(
        [
            (StageKind::Ingestion, Edge::Always(Some(StageKind::Analytics))),
            (StageKind::Analytics, Edge::Conditional),
            (StageKind::MonthlyAnalysis, Edge::Conditional),
            (StageKind::Summary, Edge::Always(None)),
            (StageKind::ErrorHandler, Edge::Always(None)),
        ],
        conditional,
    )
    .unwrap()
}

#[tokio::test]
async fn failed_collection_cascades_through_every_stage() {
    let config = Config::builder().build().unwrap();
    let engine = Engine::builder()
        .with_standard_stages(&config, None)
        .unwrap()
        .build()
        .unwrap();

    let report = engine.analyze("jane", DataSources::new()).await;

    assert!(!report.success);
    assert_eq!(
        report.errors,
        [
            "No valid data source provided",
            "Insufficient data for analytics",
            "No monthly analytics data available",
            "No monthly notes available for summary",
        ]
    );
    assert_eq!(
        report.messages,
        [
            "Ingestion failed: Data ingestion failed: No valid data source provided",
            "Analytics failed: Analytics computation failed: Insufficient data for analytics",
            "Monthly analysis failed: Monthly analysis failed: No monthly analytics data available",
            "Summary failed: Summary generation failed: No monthly notes available for summary",
        ]
    );
    let agents: Vec<StageKind> = report.audit_trail.iter().map(|record| record.agent).collect();
    assert_eq!(
        agents,
        [
            StageKind::Ingestion,
            StageKind::Analytics,
            StageKind::MonthlyAnalysis,
            StageKind::Summary
        ]
    );
    assert!(report.audit_trail.iter().all(|record| !record.success));
    assert_eq!(report.workflow.agents_executed, 4);
    assert_eq!(
        report.audit_trail[0].error.as_deref(),
        Some("Data ingestion failed: No valid data source provided")
    );
    assert!(report.final_report.is_none());
    assert!(report.results.is_none());
    assert_eq!(report.data_quality_score, 0.0);
}

#[tokio::test]
async fn offline_run_from_export_completes_every_stage() {
    let config = Config::builder().build().unwrap();
    let engine = Engine::builder()
        .with_standard_stages(&config, None)
        .unwrap()
        .build()
        .unwrap();
    let sources: DataSources = [("gdpr_export".to_string(), json!("export.zip"))]
        .into_iter()
        .collect();

    let report = engine.analyze("jane", sources).await;

    assert!(report.success, "{:?}", report.errors);
    assert_eq!(report.audit_trail.len(), 4);
    assert_eq!(report.messages[0], "Successfully collected data for jane");
    assert_eq!(report.messages[2], "Generated 12 monthly activity notes");
    let results = report.results.unwrap();
    assert_eq!(results.monthly_analytics.len(), 12);
    assert_eq!(results.recommendations.len(), 7);
    assert!(matches!(results.final_report, Some(FinalReport::Analysis(_))));
}

#[tokio::test]
async fn failed_monthly_analysis_still_reaches_summary() {
    let calls = calls();
    let engine = Engine::builder()
        .add_stage(ScriptedStage::new(
            StageKind::Ingestion,
            Script::Succeed(Some(StageKind::Analytics)),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::Analytics,
            Script::Succeed(Some(StageKind::MonthlyAnalysis)),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::MonthlyAnalysis,
            Script::Fail("model offline"),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::Summary,
            Script::Fail("no notes"),
            &calls,
        ))
        .build()
        .unwrap();

    let state = engine.run("jane", DataSources::new()).await;

    assert_eq!(
        *calls.lock().unwrap(),
        [
            StageKind::Ingestion,
            StageKind::Analytics,
            StageKind::MonthlyAnalysis,
            StageKind::Summary
        ]
    );
    assert_eq!(state.errors(), ["model offline", "no notes"]);
    assert_eq!(state.audit_trail().len(), 4);
    assert!(state.monthly_analytics().is_some());
    assert!(state.monthly_notes().is_none());
    assert!(state.final_report().is_none());
}

#[tokio::test]
async fn standard_sequence_advances_without_a_named_successor() {
    let calls = calls();
    let engine = Engine::builder()
        .add_stage(ScriptedStage::new(
            StageKind::Ingestion,
            Script::Succeed(Some(StageKind::Analytics)),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::Analytics,
            Script::Succeed(None),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::MonthlyAnalysis,
            Script::Succeed(Some(StageKind::Summary)),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::Summary,
            Script::Succeed(None),
            &calls,
        ))
        .build()
        .unwrap();

    let state = engine.run("jane", DataSources::new()).await;

    assert_eq!(calls.lock().unwrap().len(), 4);
    assert!(state.is_success());
    assert!(state.final_report().is_some());
}

#[tokio::test]
async fn conditional_edge_stops_when_next_stage_is_absent() {
    let calls = calls();
    let engine = Engine::builder()
        .add_stage(ScriptedStage::new(
            StageKind::Ingestion,
            Script::Succeed(Some(StageKind::Analytics)),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::Analytics,
            Script::Succeed(None),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::MonthlyAnalysis,
            Script::Succeed(Some(StageKind::Summary)),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::Summary,
            Script::Succeed(None),
            &calls,
        ))
        .with_transitions(conditional_table(false))
        .build()
        .unwrap();

    let state = engine.run("jane", DataSources::new()).await;

    assert_eq!(
        *calls.lock().unwrap(),
        [StageKind::Ingestion, StageKind::Analytics]
    );
    assert!(state.is_success());
    assert!(state.final_report().is_none());
}

#[tokio::test]
async fn escalation_table_hands_failures_to_error_handler() {
    let calls = calls();
    let table = conditional_table(true);

    let engine = Engine::builder()
        .add_stage(ScriptedStage::new(
            StageKind::Ingestion,
            Script::Succeed(Some(StageKind::Analytics)),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::Analytics,
            Script::Fail("metrics backend down"),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::MonthlyAnalysis,
            Script::Succeed(Some(StageKind::Summary)),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::Summary,
            Script::Succeed(None),
            &calls,
        ))
        .with_transitions(table)
        .build()
        .unwrap();

    // The failed analytics merge leaves next_agent naming analytics, which
    // this table sends to the error handler.
    let state = engine.run("jane", DataSources::new()).await;

    assert!(!state.is_success());
    assert_eq!(state.errors(), ["metrics backend down"]);
    assert_eq!(state.current_agent(), StageKind::ErrorHandler);
    let last = state.audit_trail().last().unwrap();
    assert_eq!(last.agent, StageKind::ErrorHandler);
    assert!(last.success);
    assert_eq!(
        state.messages().last().unwrap().content,
        ERROR_HANDLER_MESSAGE
    );

    let Some(FinalReport::Error(report)) = state.final_report() else {
        panic!("expected an error report");
    };
    assert!(report.error_report);
    assert_eq!(report.errors, ["metrics backend down"]);
    assert_eq!(report.recommendation, ERROR_RECOMMENDATION);
    assert_eq!(report.partial_data.profile.as_ref().unwrap().full_name, "Jane Doe");
}

#[tokio::test]
async fn invocation_limit_breaks_cycles() {
    let calls = calls();
    let conditional = Route::all().map(|route| {
        let next = match route {
            Route::Stage(StageKind::Ingestion) => Some(StageKind::Ingestion),
            _ => None,
        };
        ((StageKind::Analytics, route), next)
    });
    let edges = [
        (StageKind::Ingestion, Edge::Always(Some(StageKind::Analytics))),
        (StageKind::Analytics, Edge::Conditional),
        (StageKind::MonthlyAnalysis, Edge::Always(None)),
        (StageKind::Summary, Edge::Always(None)),
        (StageKind::ErrorHandler, Edge::Always(None)),
    ];

    // Analytics routes back to ingestion, so only the limit ends the run.
    let engine = Engine::builder()
        .add_stage(ScriptedStage::new(
            StageKind::Ingestion,
            Script::Succeed(Some(StageKind::Analytics)),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::Analytics,
            Script::Succeed(Some(StageKind::Ingestion)),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::MonthlyAnalysis,
            Script::Succeed(None),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::Summary,
            Script::Succeed(None),
            &calls,
        ))
        .with_transitions(TransitionTable::new(edges, conditional).unwrap())
        .build()
        .unwrap();

    let state = engine.run("jane", DataSources::new()).await;

    assert_eq!(engine.max_invocations(), 6);
    assert_eq!(state.audit_trail().len(), 6);
    assert_eq!(calls.lock().unwrap().len(), 6);
}

#[tokio::test]
async fn concurrent_runs_share_nothing() {
    let calls = calls();
    let engine = happy_path(&calls).build().unwrap();

    let (first, second) = tokio::join!(
        engine.run("alice", DataSources::new()),
        engine.run("bob", DataSources::new())
    );

    assert_eq!(first.subject_id, "alice");
    assert_eq!(second.subject_id, "bob");
    assert_eq!(first.audit_trail().len(), 4);
    assert_eq!(second.audit_trail().len(), 4);
    assert_eq!(calls.lock().unwrap().len(), 8);
}

#[tokio::test]
async fn invoking_error_handler_directly_builds_error_report() {
    let calls = calls();
    let engine = happy_path(&calls).build().unwrap();
    let state = PipelineState::new("jane", DataSources::new()).with_errors(["boom"]);

    let next = engine.invoke(StageKind::ErrorHandler, &state).await.unwrap();

    assert_eq!(next.audit_trail().len(), 1);
    assert!(matches!(next.final_report(), Some(FinalReport::Error(_))));
    // The prior snapshot is untouched.
    assert!(state.audit_trail().is_empty());
    assert!(state.final_report().is_none());
}

#[test]
fn builder_rejects_duplicate_and_missing_roles() {
    let calls = calls();
    let err = happy_path(&calls)
        .add_stage(ScriptedStage::new(
            StageKind::Summary,
            Script::Succeed(None),
            &calls,
        ))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("registered more than once"));

    let err = Engine::builder()
        .add_stage(ScriptedStage::new(
            StageKind::Ingestion,
            Script::Succeed(None),
            &calls,
        ))
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing stage roles: analytics, monthly_analysis, summary"
    );
}

#[test]
fn builder_defaults_error_handler_and_standard_table() {
    let calls = calls();
    let engine = happy_path(&calls).build().unwrap();

    assert_eq!(engine.stage_count(), 5);
    assert_eq!(engine.roles(), StageKind::ALL);
    assert_eq!(engine.transitions(), &TransitionTable::standard().unwrap());

    let status = engine.status();
    assert_eq!(status.max_invocations, 6);
    assert_eq!(
        status.transitions,
        [
            "ingestion -> analytics",
            "analytics -> monthly_analysis",
            "analytics [error_handler] -> error_handler",
            "monthly_analysis -> summary",
            "monthly_analysis [error_handler] -> error_handler",
            "summary -> end",
            "error_handler -> end",
        ]
    );
}

#[test]
fn transition_table_must_be_exhaustive() {
    let err = TransitionTable::new(
        [(StageKind::Ingestion, Edge::Always(None))],
        Vec::new(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("No outgoing edge declared for stage 'analytics'"));

    let edges = StageKind::ALL.map(|kind| {
        let edge = if kind == StageKind::Analytics {
            Edge::Conditional
        } else {
            Edge::Always(None)
        };
        (kind, edge)
    });
    let partial = [((StageKind::Analytics, Route::End), None)];
    let err = TransitionTable::new(edges, partial).unwrap_err();
    assert!(err.to_string().contains("has no transition for route 'ingestion'"));

    let stray = [((StageKind::Summary, Route::End), None)];
    let all_analytics = Route::all().map(|route| ((StageKind::Analytics, route), None));
    let err = TransitionTable::new(edges, all_analytics.chain(stray)).unwrap_err();
    assert!(err.to_string().contains("Stage 'summary' has conditional transitions"));
}

#[test]
fn standard_table_advances_or_escalates() {
    let table = TransitionTable::standard().unwrap();
    let fresh = PipelineState::new("jane", DataSources::new());
    let stale = fresh
        .clone()
        .with_next_agent(Some(StageKind::Analytics))
        .with_errors(["e1"]);
    let exhausted = fresh
        .clone()
        .with_errors(["e1", "e2", "e3"])
        .with_retry_count(RETRY_CEILING);

    assert_eq!(table.edge(StageKind::Ingestion), Edge::Always(Some(StageKind::Analytics)));
    assert_eq!(
        table.edge(StageKind::Analytics),
        Edge::Sequential(StageKind::MonthlyAnalysis)
    );

    // Route::End and stale stage names both fall through to the successor.
    assert_eq!(table.next(StageKind::Analytics, &fresh), Some(StageKind::MonthlyAnalysis));
    assert_eq!(table.next(StageKind::Analytics, &stale), Some(StageKind::MonthlyAnalysis));
    assert_eq!(table.next(StageKind::MonthlyAnalysis, &stale), Some(StageKind::Summary));

    assert_eq!(
        table.next(StageKind::Analytics, &exhausted),
        Some(StageKind::ErrorHandler)
    );
    assert_eq!(
        table.next(StageKind::MonthlyAnalysis, &exhausted),
        Some(StageKind::ErrorHandler)
    );
    assert_eq!(table.next(StageKind::Summary, &exhausted), None);
    assert_eq!(table.next(StageKind::ErrorHandler, &exhausted), None);
}

#[test]
fn sequential_edges_take_no_conditional_rows() {
    let edges = StageKind::ALL.map(|kind| {
        let edge = if kind == StageKind::Analytics {
            Edge::Sequential(StageKind::MonthlyAnalysis)
        } else {
            Edge::Always(None)
        };
        (kind, edge)
    });
    let rows = [((StageKind::Analytics, Route::End), None)];

    let err = TransitionTable::new(edges, rows).unwrap_err();
    assert!(err.to_string().contains("Stage 'analytics' has conditional transitions"));
    assert!(TransitionTable::new(edges, Vec::new()).is_ok());
}

#[test]
fn router_escalates_only_at_the_retry_ceiling() {
    let base = PipelineState::new("jane", DataSources::new())
        .with_next_agent(Some(StageKind::Summary));

    assert_eq!(route(&base), Route::Stage(StageKind::Summary));

    let failing = base.clone().with_errors(["e1", "e2", "e3"]);
    assert_eq!(
        route(&failing.clone().with_retry_count(RETRY_CEILING - 1)),
        Route::Stage(StageKind::Summary)
    );
    assert_eq!(
        route(&failing.with_retry_count(RETRY_CEILING)),
        Route::Stage(StageKind::ErrorHandler)
    );

    // A high counter without errors does not escalate.
    assert_eq!(
        route(&base.clone().with_retry_count(5)),
        Route::Stage(StageKind::Summary)
    );
}

#[test]
fn router_ends_on_absent_or_terminal_next_stage() {
    let state = PipelineState::new("jane", DataSources::new());
    assert_eq!(route(&state), Route::End);

    let terminal = state.clone().with_next_agent(Some(StageKind::ErrorHandler));
    assert_eq!(route(&terminal), Route::End);

    let restart = state.with_next_agent(Some(StageKind::Ingestion));
    assert_eq!(route(&restart), Route::Stage(StageKind::Ingestion));
}

#[test]
fn merge_on_success_carries_untouched_fields_forward() {
    let initial = PipelineState::new("jane", DataSources::new());
    let collected = initial.apply(StateDelta::from_response(
        StageKind::Ingestion,
        AgentResponse::success(
            payload_for(StageKind::Ingestion),
            "collected",
            Some(StageKind::Analytics),
        ),
        ts(),
    ));
    let analysed = collected.apply(StateDelta::from_response(
        StageKind::Analytics,
        AgentResponse::success(
            payload_for(StageKind::Analytics),
            "analysed",
            Some(StageKind::MonthlyAnalysis),
        ),
        ts(),
    ));

    assert_eq!(analysed.raw_profile(), collected.raw_profile());
    assert_eq!(analysed.data_quality_score(), Some(0.75));
    assert!(analysed.monthly_analytics().is_some());
    assert_eq!(analysed.current_agent(), StageKind::Analytics);
    assert_eq!(analysed.next_agent(), Some(StageKind::MonthlyAnalysis));
    assert_eq!(analysed.audit_trail()[1].timestamp, ts());

    // Earlier snapshots are strict prefixes of later ones.
    assert!(analysed.audit_trail().starts_with(collected.audit_trail()));
    assert!(analysed.messages().starts_with(collected.messages()));
    assert!(initial.audit_trail().is_empty());
}

#[test]
fn merge_on_failure_leaves_outputs_and_routing_alone() {
    let state = PipelineState::new("jane", DataSources::new())
        .with_next_agent(Some(StageKind::MonthlyAnalysis));

    let failed = state.apply(StateDelta::from_response(
        StageKind::MonthlyAnalysis,
        AgentResponse::failure("Monthly analysis failed: no data", "no data"),
        ts(),
    ));

    assert!(failed.monthly_notes().is_none());
    assert_eq!(failed.errors(), ["no data"]);
    assert_eq!(failed.next_agent(), Some(StageKind::MonthlyAnalysis));
    assert_eq!(failed.current_agent(), StageKind::Ingestion);
    assert_eq!(
        failed.messages()[0].content,
        "Monthly analysis failed: Monthly analysis failed: no data"
    );
    let record = &failed.audit_trail()[0];
    assert!(!record.success);
    assert_eq!(record.action, "monthly_notes_generation");
    assert_eq!(record.error.as_deref(), Some("Monthly analysis failed: no data"));
}

#[test]
fn mismatched_payload_is_recorded_as_failure() {
    let delta = StateDelta::from_response(
        StageKind::Summary,
        AgentResponse::success(payload_for(StageKind::Analytics), "done", None),
        ts(),
    );
    assert_eq!(delta.stage(), StageKind::Summary);
    assert!(!delta.succeeded());

    let state = PipelineState::new("jane", DataSources::new()).apply(delta);
    assert!(state.monthly_analytics().is_none());
    assert_eq!(
        state.errors(),
        ["summary stage returned a payload for analytics"]
    );
}

#[tokio::test]
async fn wrong_payload_from_a_stage_fails_that_stage() {
    let calls = calls();
    let engine = Engine::builder()
        .add_stage(ScriptedStage::new(StageKind::Ingestion, Script::WrongPayload, &calls))
        .add_stage(ScriptedStage::new(
            StageKind::Analytics,
            Script::Fail("no data"),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::MonthlyAnalysis,
            Script::Fail("no metrics"),
            &calls,
        ))
        .add_stage(ScriptedStage::new(
            StageKind::Summary,
            Script::Fail("no notes"),
            &calls,
        ))
        .build()
        .unwrap();

    let state = engine.run("jane", DataSources::new()).await;

    assert_eq!(
        state.errors(),
        [
            "ingestion stage returned a payload for monthly_analysis",
            "no data",
            "no metrics",
            "no notes"
        ]
    );
    assert!(state.raw_profile().is_none());
    assert!(state.monthly_notes().is_none());
}

#[test]
fn final_report_is_written_once() {
    let summary = PipelineState::new("jane", DataSources::new()).apply(StateDelta::from_response(
        StageKind::Summary,
        AgentResponse::success(payload_for(StageKind::Summary), "summarised", None),
        ts(),
    ));
    let escalated = summary.apply(StateDelta::from_response(
        StageKind::ErrorHandler,
        AgentResponse::success(payload_for(StageKind::ErrorHandler), ERROR_HANDLER_MESSAGE, None),
        ts(),
    ));

    assert_eq!(escalated.final_report(), summary.final_report());
    assert_eq!(escalated.audit_trail().len(), 2);
}

#[test]
fn final_report_changes_only_through_merge() {
    let initial = PipelineState::new("jane", DataSources::new());
    let first = initial.merged(StagePayload::Summary {
        executive_summary: "First pass".to_string(),
        recommendations: Vec::new(),
        final_report: analysis_report("First pass"),
    });
    let second = first.merged(StagePayload::Summary {
        executive_summary: "Second pass".to_string(),
        recommendations: Vec::new(),
        final_report: analysis_report("Second pass"),
    });

    assert!(initial.final_report().is_none());
    assert_eq!(
        first.final_report().and_then(FinalReport::executive_summary),
        Some("First pass")
    );
    // The later summary text lands, the report does not.
    assert_eq!(second.executive_summary(), Some("Second pass"));
    assert_eq!(second.final_report(), first.final_report());

    let json = serde_json::to_value(&second).unwrap();
    let restored: PipelineState = serde_json::from_value(json).unwrap();
    assert_eq!(restored.final_report(), first.final_report());
}

#[test]
fn failure_response_never_carries_an_empty_error() {
    let response = AgentResponse::failure("Summary generation failed: ", "  ");
    assert!(!response.is_success());
    assert!(response.data().is_none());
    assert_eq!(response.errors(), ["unknown error"]);
}

#[test]
fn stage_names_round_trip_through_strings() {
    for kind in StageKind::ALL {
        assert_eq!(kind.as_str().parse::<StageKind>().unwrap(), kind);
    }
    assert!("planner".parse::<StageKind>().is_err());
    assert_eq!(
        serde_json::to_value(StageKind::MonthlyAnalysis).unwrap(),
        "monthly_analysis"
    );
}
