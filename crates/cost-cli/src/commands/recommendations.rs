//! Recommendation-related CLI commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use super::Context;
use crate::output::{
    color_cold_start, color_score, format_count, format_currency, print_heading,
    print_info, print_json, print_subheading, print_table, OutputFormat,
};

/// Row for memory recommendations table
#[derive(Tabled)]
struct MemoryRow {
    #[tabled(rename = "Function")]
    name: String,
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Current Cost")]
    current_cost: String,
    #[tabled(rename = "New Cost")]
    new_cost: String,
    #[tabled(rename = "Savings")]
    savings: String,
}

/// Row for provisioned concurrency table
#[derive(Tabled)]
struct ConcurrencyRow {
    #[tabled(rename = "Function")]
    name: String,
    #[tabled(rename = "PC")]
    units: u32,
    #[tabled(rename = "Cold Starts")]
    cold_start: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Savings")]
    savings: String,
    #[tabled(rename = "Reasoning")]
    reasoning: &'static str,
}

/// Row for PC vs on-demand comparison table
#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "PC")]
    with_pc: &'static str,
    #[tabled(rename = "Functions")]
    functions: usize,
    #[tabled(rename = "Avg Cost")]
    avg_cost: String,
    #[tabled(rename = "Avg Cold Starts")]
    avg_cold_start: String,
}

/// Row for usage tables
#[derive(Tabled)]
struct UsageRow {
    #[tabled(rename = "Function")]
    name: String,
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Invocations")]
    invocations: String,
    #[tabled(rename = "Share")]
    share: String,
    #[tabled(rename = "Cost")]
    cost: String,
}

/// Row for containerization candidates table
#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "Function")]
    name: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Invocations")]
    invocations: String,
    #[tabled(rename = "Cost")]
    cost: String,
}

/// Row for hosting comparison table
#[derive(Tabled)]
struct HostingRow {
    #[tabled(rename = "Function")]
    name: String,
    #[tabled(rename = "Serverless")]
    function_cost: String,
    #[tabled(rename = "Container")]
    container_cost: String,
    #[tabled(rename = "Savings")]
    savings: String,
}

fn usage_rows(rows: &[cost_lib::analysis::UsageRow]) -> Vec<UsageRow> {
    rows.iter()
        .map(|u| UsageRow {
            name: u.name.clone(),
            environment: u.environment.to_string(),
            invocations: format_count(u.invocations_per_month),
            share: format!("{:.3}%", u.invocation_pct),
            cost: format_currency(u.cost_usd),
        })
        .collect()
}

/// Show memory right-sizing recommendations
pub fn right_sizing(ctx: &Context) -> Result<()> {
    let report = ctx.analyzer.right_sizing(&ctx.records)?;

    match ctx.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_heading("Memory Right-Sizing", 70);
            println!(
                "Over-provisioned:       {} functions, {}",
                report.over_provisioned.len(),
                format_currency(report.over_provisioned_cost_usd)
            );
            println!(
                "Rough Savings:          {}",
                format_currency(report.rough_potential_savings_usd)
            );
            println!(
                "Projected Savings:      {}",
                format_currency(report.projected_savings_usd).green().bold()
            );
            println!();

            let rows: Vec<MemoryRow> = report
                .recommendations
                .iter()
                .map(|r| MemoryRow {
                    name: r.name.clone(),
                    environment: r.environment.to_string(),
                    memory: format!("{} → {} MB", r.current_memory_mb, r.recommended_memory_mb),
                    current_cost: format_currency(r.current_cost_usd),
                    new_cost: format_currency(r.estimated_new_cost_usd),
                    savings: format_currency(r.savings_usd).green().to_string(),
                })
                .collect();
            print_table(rows, "No over-provisioned functions found");
        }
    }

    Ok(())
}

/// Show provisioned concurrency recommendations
pub fn concurrency(ctx: &Context) -> Result<()> {
    let report = ctx.analyzer.concurrency(&ctx.records)?;
    let thresholds = &ctx.analyzer.config().concurrency;

    match ctx.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_heading("Provisioned Concurrency", 70);
            println!(
                "Functions with PC:      {} ({} units)",
                report.functions_with_pc, report.total_pc_units
            );
            println!(
                "Cost of PC Functions:   {}",
                format_currency(report.pc_functions_cost_usd)
            );
            if let Some(rate) = report.avg_cold_start_rate_with_pc {
                println!(
                    "Avg Cold Starts:        {}",
                    color_cold_start(
                        rate,
                        thresholds.low_cold_start_rate,
                        thresholds.high_cold_start_rate
                    )
                );
            }
            println!(
                "Potential Savings:      {}",
                format_currency(report.total_savings_usd).green().bold()
            );
            println!();

            print_subheading("PC vs On-Demand", 70);
            let rows: Vec<ComparisonRow> = report
                .comparison
                .iter()
                .map(|c| ComparisonRow {
                    environment: c.environment.to_string(),
                    with_pc: if c.with_pc { "yes" } else { "no" },
                    functions: c.function_count,
                    avg_cost: format_currency(c.avg_cost_usd),
                    avg_cold_start: format!("{:.2}%", c.avg_cold_start_pct),
                })
                .collect();
            print_table(rows, "No functions found");
            println!();

            print_subheading("Recommendations", 70);
            let rows: Vec<ConcurrencyRow> = report
                .recommendations
                .iter()
                .map(|r| ConcurrencyRow {
                    name: r.name.clone(),
                    units: r.provisioned_concurrency,
                    cold_start: color_cold_start(
                        r.cold_start_rate,
                        thresholds.low_cold_start_rate,
                        thresholds.high_cold_start_rate,
                    ),
                    cost: format_currency(r.cost_usd),
                    action: r.action.label().to_string(),
                    savings: format_currency(r.action.savings_usd()),
                    reasoning: r.action.reasoning(),
                })
                .collect();
            print_table(rows, "All provisioned concurrency is balanced");
        }
    }

    Ok(())
}

/// Show low-value functions and cleanup candidates
pub fn low_value(ctx: &Context) -> Result<()> {
    let report = ctx.analyzer.low_value(&ctx.records)?;

    match ctx.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_heading("Low-Value Functions", 70);
            println!(
                "Median Cost:            {}",
                format_currency(report.median_cost_usd)
            );
            println!(
                "Low-Value:              {} functions, {}",
                report.low_value.len(),
                format_currency(report.low_value_cost_usd)
            );
            println!(
                "Very Low Usage:         {} functions",
                report.very_low_usage.len()
            );
            println!();

            print_subheading("Rarely Used, Above Median Cost", 70);
            print_table(usage_rows(&report.low_value), "No low-value functions found");
            println!();

            print_subheading("Cleanup Candidates (non-production)", 70);
            print_table(
                usage_rows(&report.cleanup_candidates),
                "No cleanup candidates found",
            );
            println!();
            print_info(&format!(
                "Removing these functions saves {} per month",
                format_currency(report.cleanup_savings_usd)
            ));
        }
    }

    Ok(())
}

/// Show containerization candidates
pub fn containers(ctx: &Context) -> Result<()> {
    let report = ctx.analyzer.containerization(&ctx.records)?;
    let candidate_score = ctx.analyzer.config().containerization.candidate_score;

    match ctx.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_heading("Containerization Candidates", 70);
            println!(
                "Candidates:             {} functions, {}",
                report.candidates.len(),
                format_currency(report.candidates_cost_usd)
            );
            println!(
                "Estimated Savings:      {}",
                format_currency(report.aggregate_savings_usd).green().bold()
            );
            println!();

            let rows: Vec<CandidateRow> = report
                .candidates
                .iter()
                .map(|c| CandidateRow {
                    name: c.name.clone(),
                    score: color_score(c.score, candidate_score),
                    duration: format!("{:.0} ms", c.avg_duration_ms),
                    memory: format!("{} MB", c.memory_mb),
                    invocations: format_count(c.invocations_per_month),
                    cost: format_currency(c.cost_usd),
                })
                .collect();
            print_table(rows, "No containerization candidates found");
            println!();

            print_subheading("Hosting Comparison", 70);
            let rows: Vec<HostingRow> = report
                .comparison
                .iter()
                .map(|h| HostingRow {
                    name: h.name.clone(),
                    function_cost: format_currency(h.function_cost_usd),
                    container_cost: format_currency(h.container_cost_usd),
                    savings: format_currency(h.savings_usd).green().to_string(),
                })
                .collect();
            print_table(rows, "No candidates to compare");
            if !report.comparison.is_empty() {
                print_info(&format!(
                    "Moving the top {} saves {} per month",
                    report.comparison.len(),
                    format_currency(report.comparison_savings_usd)
                ));
            }
        }
    }

    Ok(())
}
