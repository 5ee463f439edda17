use colored::*;
use sitelens_core::analyzer::report::{
    format_currency, AnalysisReport, Bottleneck, Recommendation, Severity,
};
use sitelens_core::analyzer::risk::ScoredRisk;
use sitelens_core::project::Impact;
use sitelens_core::{AssistantReply, RiskLevel};
use std::path::Path;

/// Print a full analysis report to the terminal.
pub fn print_analysis_report(source: &Path, report: &AnalysisReport) {
    let metrics = &report.project_metrics;

    println!();
    println!(
        "{}",
        format!(
            " SiteLens v{} - Analyzing {}",
            env!("CARGO_PKG_VERSION"),
            source.display()
        )
        .bold()
    );
    println!();

    println!(" {}", "Project".bold().underline());
    println!(" {} Type: {}", "|-".dimmed(), metrics.project_type.cyan());
    println!(
        " {} Timeline: {} to {} ({} days)",
        "|-".dimmed(),
        date_part(&metrics.start_date),
        date_part(&metrics.end_date),
        metrics.project_duration
    );
    println!(
        " {} Completion: {:.1}%",
        "|-".dimmed(),
        metrics.completion_percentage
    );
    println!(
        " {} Risk level: {} (avg score {:.2})",
        "|-".dimmed(),
        risk_level_label(metrics.risk_level),
        metrics.average_risk_score
    );
    println!();

    print_budget(report);

    println!(" {}", "=".repeat(60).dimmed());
    println!();

    let bottlenecks: Vec<&Bottleneck> = report.bottlenecks().collect();
    if bottlenecks.is_empty() {
        println!(
            " {} No resource bottlenecks detected.",
            "OK".green().bold()
        );
        println!();
    } else {
        println!(" {}", "Bottlenecks".bold().underline());
        for bottleneck in bottlenecks {
            print_bottleneck(bottleneck);
        }
        println!();
    }

    println!(" {}", "Risks".bold().underline());
    for risk in &report.risk_assessment {
        print_risk(risk);
        println!();
    }

    println!(" {}", "=".repeat(60).dimmed());
    println!();

    print_schedule(report);
    print_environment(report);

    println!(" {}", "Recommendations".bold().underline());
    let r = &report.resource_optimization;
    let groups: [(&str, &[Recommendation]); 5] = [
        ("Labor", r.labor.recommendations.as_slice()),
        ("Materials", r.materials.recommendations.as_slice()),
        ("Equipment", r.equipment.recommendations.as_slice()),
        ("Environmental", report.environmental_impact.recommendations.as_slice()),
        ("Budget", report.budget_analysis.recommendations.as_slice()),
    ];
    for (group, recommendations) in groups {
        for rec in recommendations {
            print_recommendation(group, rec);
        }
    }
    println!();

    println!(" {}", "Summary".bold().underline());
    let critical = report.critical_risk_count();
    let high = report.high_risk_count();
    println!(
        " {} Risks: {} critical, {} high, {} total",
        "|-".dimmed(),
        if critical > 0 {
            critical.to_string().red().bold().to_string()
        } else {
            "0".to_string()
        },
        if high > 0 {
            high.to_string().yellow().bold().to_string()
        } else {
            "0".to_string()
        },
        report.risk_assessment.len()
    );
    println!(
        " {} {} recommendations, {} bottlenecks",
        "|-".dimmed(),
        report.recommendation_count(),
        report.bottlenecks().count()
    );
    println!();
    println!(
        " Run {} for the full JSON report",
        format!("sitelens analyze {} --format json", source.display()).cyan()
    );
    println!();
}

fn print_budget(report: &AnalysisReport) {
    let budget = &report.budget_analysis;
    let metrics = &report.project_metrics;

    println!(" {}", "Budget".bold().underline());
    println!(
        " {} Materials:  {}",
        "|-".dimmed(),
        format_currency(metrics.total_material_cost)
    );
    println!(
        " {} Labor:      {}",
        "|-".dimmed(),
        format_currency(metrics.total_labor_cost)
    );
    println!(
        " {} Equipment:  {}",
        "|-".dimmed(),
        format_currency(metrics.total_equipment_cost)
    );
    println!(
        " {} Spend:      {} of {} ({:.1}%)",
        "|-".dimmed(),
        format_currency(budget.current_spend).bold(),
        format_currency(budget.total_budget),
        budget.utilization_rate
    );
    println!(
        " {} Forecast:   {}",
        "|-".dimmed(),
        format_currency(budget.forecast)
    );

    let variance = format_currency(budget.variance);
    println!(
        " {} Variance:   {}",
        "|-".dimmed(),
        if budget.variance < 0.0 {
            variance.red().bold()
        } else {
            variance.green()
        }
    );
    println!();
}

fn print_schedule(report: &AnalysisReport) {
    let schedule = &report.schedule_optimization;

    println!(" {}", "Schedule".bold().underline());
    println!(
        " {} Current completion:    {}",
        "|-".dimmed(),
        schedule.current_completion
    );
    println!(
        " {} Optimized completion:  {}",
        "|-".dimmed(),
        schedule.optimized_completion.green()
    );
    println!(
        " {} Potential reduction:   {}",
        "|-".dimmed(),
        schedule.timeline_reduction
    );
    for phase in &schedule.critical_path {
        println!(
            "   {} {} ({} days, {})",
            "|".dimmed(),
            phase.phase,
            phase.duration,
            impact_label(phase.impact)
        );
    }
    for change in &schedule.critical_path_changes {
        println!(
            "   {} {}: {} -> {} ({})",
            "|".dimmed(),
            change.task,
            change.original_duration,
            change.optimized_duration.green(),
            change.strategy.dimmed()
        );
    }
    println!();
}

fn print_environment(report: &AnalysisReport) {
    let env = &report.environmental_impact;
    let current = &env.current_footprint;
    let targets = &env.targets;

    println!(" {}", "Environmental Impact".bold().underline());
    println!(
        " {} Carbon:     {:.1} tons CO₂e (target {:.1})",
        "|-".dimmed(),
        current.carbon,
        targets.carbon
    );
    println!(
        " {} Water:      {:.0} gal (target {:.0})",
        "|-".dimmed(),
        current.water,
        targets.water
    );
    println!(
        " {} Recycling:  {:.0}% (target {:.0}%)",
        "|-".dimmed(),
        current.waste,
        targets.waste
    );
    println!(
        " {} Renewable:  {:.0}% (target {:.0}%)",
        "|-".dimmed(),
        current.renewable,
        targets.renewable
    );
    println!();
}

fn print_bottleneck(bottleneck: &Bottleneck) {
    println!(
        " {} {} [{}] {}",
        "|-".dimmed(),
        bottleneck.name.bold(),
        bottleneck.reason.label(),
        impact_label(bottleneck.impact)
    );
    println!("   {} {}", "|".dimmed(), bottleneck.mitigation.dimmed());
}

fn print_risk(risk: &ScoredRisk) {
    println!(" {} {}", severity_tag(risk.severity), risk.title.bold());
    if !risk.description.is_empty() {
        println!("   {} {}", "|".dimmed(), risk.description);
    }
    println!(
        "   {} Probability {:.0}% | Impact {} | Score {:.2}",
        "|".dimmed(),
        risk.probability * 100.0,
        risk.impact,
        risk.risk_score
    );
    println!("   {} {}", "|".dimmed(), risk.mitigation_strategy.dimmed());
}

fn print_recommendation(group: &str, rec: &Recommendation) {
    let mut extras = Vec::new();
    if let Some(savings) = &rec.savings_estimate {
        extras.push(savings.green().to_string());
    }
    if let Some(carbon) = &rec.carbon_reduction {
        extras.push(format!("-{}", carbon).green().to_string());
    }

    println!(
        " {} [{}] {} {}",
        "|-".dimmed(),
        group.cyan(),
        rec.title.bold(),
        impact_label(rec.impact)
    );
    println!("   {} {}", "|".dimmed(), rec.description);
    if !extras.is_empty() {
        println!("   {} {}", "|".dimmed(), extras.join(" | "));
    }
}

/// Print an assistant answer.
pub fn print_assistant_reply(query: &str, reply: &AssistantReply) {
    println!();
    println!("{}", format!(" SiteLens - {}", query).bold());
    println!();
    for line in reply.generated_text.lines() {
        println!(" {}", line);
    }
    println!();
    let mut footer = format!("model: {}", reply.model);
    if let Some(usage) = &reply.usage {
        footer.push_str(&format!(", {} tokens", usage.total_tokens));
    }
    println!(" {}", footer.dimmed());
    println!();
}

fn severity_tag(severity: Severity) -> String {
    let tag = format!(" {} ", severity.symbol());
    match severity {
        Severity::Critical => tag.on_red().white().bold().to_string(),
        Severity::High => tag.on_yellow().black().bold().to_string(),
        Severity::Medium => tag.on_blue().white().bold().to_string(),
        Severity::Low => tag.dimmed().to_string(),
    }
}

fn risk_level_label(level: RiskLevel) -> ColoredString {
    match level {
        RiskLevel::High => level.label().red().bold(),
        RiskLevel::Medium => level.label().yellow(),
        RiskLevel::Low => level.label().green(),
    }
}

fn impact_label(impact: Impact) -> ColoredString {
    let label = format!("({} impact)", impact.label());
    match impact {
        Impact::High => label.red(),
        Impact::Medium => label.yellow(),
        Impact::Low => label.dimmed(),
    }
}

/// `2024-01-15T00:00:00.000Z` -> `2024-01-15`.
fn date_part(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}
