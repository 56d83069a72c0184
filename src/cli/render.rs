use std::path::Path;

use colored::*;

use laie::config::Config;
use laie::domain::FinalReport;
use laie::pipeline::{EngineStatus, RunReport};

pub(crate) fn print_report(report: &RunReport) {
    println!();
    let headline = format!("📊 LinkedIn activity analysis for {}", report.subject_id);
    println!("{}", headline.bold());
    println!(
        "   Data quality: {:.0}%   Stages run: {}/{}   Last stage: {}",
        report.data_quality_score * 100.0,
        report.workflow.agents_executed,
        report.workflow.total_agents,
        report.workflow.final_agent
    );

    println!();
    println!("{}", "🧾 Audit trail".bold());
    for record in &report.audit_trail {
        let mark = if record.success { "✓".green() } else { "✗".red() };
        let time = record.timestamp.format("%H:%M:%S");
        match &record.error {
            Some(error) => println!(
                "  {mark} {time} {} ({}) {}",
                record.agent,
                record.action,
                error.dimmed()
            ),
            None => println!("  {mark} {time} {} ({})", record.agent, record.action),
        }
    }

    match &report.final_report {
        Some(FinalReport::Analysis(analysis)) => {
            println!();
            println!("{}", analysis.report_title.bold().cyan());
            println!(
                "   {} - {} ({} months)",
                analysis.analysis_period.start,
                analysis.analysis_period.end,
                analysis.analysis_period.total_months
            );
            println!();
            println!("{}", analysis.executive_summary);

            if !analysis.key_recommendations.is_empty() {
                println!();
                println!("{}", "💡 Recommendations".bold());
                for (i, recommendation) in analysis.key_recommendations.iter().enumerate() {
                    println!("  [{}] {}", (i + 1).to_string().cyan(), recommendation);
                }
            }
        }
        Some(FinalReport::Error(error_report)) => {
            println!();
            println!("{}", "⚠️  Run escalated to error handling".bold().yellow());
            println!("   {}", error_report.recommendation);
        }
        None => {}
    }

    if report.success {
        println!();
        println!("{}", "✅ Analysis completed successfully".green());
    } else {
        println!();
        println!("{}", "❌ Analysis finished with errors:".red().bold());
        for error in &report.errors {
            println!("   • {error}");
        }
    }
}

pub(crate) fn print_saved(path: &Path) {
    println!("💾 Result written to {}", path.display().to_string().bold());
}

pub(crate) fn print_status(status: &EngineStatus, config: &Config) {
    println!("{}", "🔧 Pipeline status".bold());
    println!(
        "   Narrative model: {} via {}{}",
        config.models.narrative,
        config.llm.provider.display_name(),
        if config.has_llm() {
            String::new()
        } else {
            format!(" {}", "(no API key, fallbacks only)".yellow())
        }
    );
    println!(
        "   Window: {} .. {}",
        config.analysis.start, config.analysis.end
    );
    println!("   Invocation limit: {}", status.max_invocations);

    println!();
    println!("{}", "Stages".bold());
    for role in &status.roles {
        println!("  • {}", role.to_string().green());
    }

    println!();
    println!("{}", "Transitions".bold());
    for row in &status.transitions {
        println!("  {row}");
    }
}
