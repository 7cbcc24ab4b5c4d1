//! Cost-related CLI commands

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use cost_lib::analysis::{BacktestReport, ForecastReport};
use cost_lib::Scenario;
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::{
    color_change, format_count, format_currency, format_pct, print_heading, print_json,
    print_subheading, print_table, print_warning, OutputFormat,
};

/// Accuracy below which forecasts are flagged as unreliable
const LOW_ACCURACY_PCT: f64 = 50.0;

/// Row for cost by environment table
#[derive(Tabled)]
struct EnvironmentRow {
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Functions")]
    functions: usize,
    #[tabled(rename = "Monthly Cost")]
    cost: String,
    #[tabled(rename = "Share")]
    share: String,
}

/// Row for the Pareto ranking table
#[derive(Tabled)]
struct ParetoRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Function")]
    name: String,
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Cumulative")]
    cumulative: String,
    #[tabled(rename = "Top 80%")]
    in_top_set: String,
}

/// Row for forecast by environment table
#[derive(Tabled)]
struct ForecastEnvironmentRow {
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Forecast")]
    forecast: String,
    #[tabled(rename = "Change")]
    change: String,
}

/// Row for savings breakdown table
#[derive(Tabled)]
struct SavingsRow {
    #[tabled(rename = "Source")]
    source: &'static str,
    #[tabled(rename = "Monthly")]
    monthly: String,
}

#[derive(Serialize)]
struct ForecastOutput<'a> {
    backtest: &'a BacktestReport,
    forecast: &'a ForecastReport,
}

/// Show cost overview
pub fn show(ctx: &Context) -> Result<()> {
    let overview = ctx.analyzer.overview(&ctx.records)?;

    match ctx.format {
        OutputFormat::Json => print_json(&overview)?,
        OutputFormat::Table => {
            print_heading("Cost Overview", 50);
            println!("Functions:              {}", overview.function_count);
            println!(
                "Monthly Cost:           {}",
                format_currency(overview.total_cost_usd).bold()
            );
            println!(
                "Mean per Function:      {}",
                format_currency(overview.mean_cost_usd)
            );
            println!(
                "Production Cost:        {}",
                format_currency(overview.production_cost_usd)
            );
            println!(
                "Invocations / Month:    {}",
                format_count(overview.total_invocations)
            );
            println!();

            print_subheading("Cost by Environment", 50);
            let rows: Vec<EnvironmentRow> = overview
                .by_environment
                .iter()
                .map(|e| EnvironmentRow {
                    environment: e.environment.to_string(),
                    functions: e.function_count,
                    cost: format_currency(e.cost_usd),
                    share: format_pct(e.share_pct),
                })
                .collect();
            print_table(rows, "No functions found");
        }
    }

    Ok(())
}

/// Show the Pareto ranking
pub fn pareto(ctx: &Context, limit: usize) -> Result<()> {
    let report = ctx.analyzer.pareto(&ctx.records)?;

    match ctx.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_heading("Cost Concentration", 60);
            let function_share = report.top_count as f64 / report.rows.len() as f64 * 100.0;
            println!(
                "{} functions ({}) account for {} ({}) of monthly spend",
                report.top_count.to_string().bold(),
                format_pct(function_share),
                format_currency(report.top_cost_usd).bold(),
                format_pct(report.top_share_pct)
            );
            println!();

            let rows: Vec<ParetoRow> = report
                .rows
                .iter()
                .take(limit)
                .map(|r| ParetoRow {
                    rank: r.rank,
                    name: r.name.clone(),
                    environment: r.environment.to_string(),
                    cost: format_currency(r.cost_usd),
                    cumulative: format_pct(r.cumulative_pct),
                    in_top_set: if r.rank <= report.top_count {
                        "●".green().to_string()
                    } else {
                        String::new()
                    },
                })
                .collect();
            print_table(rows, "No functions found");

            if report.rows.len() > limit {
                println!(
                    "\nShowing {} of {} functions",
                    limit.min(report.rows.len()),
                    report.rows.len()
                );
            }
        }
    }

    Ok(())
}

/// Back-test the cost model and forecast a scenario
pub fn forecast(ctx: &Context, scenario: Scenario) -> Result<()> {
    let backtest = ctx.analyzer.backtest(&ctx.records)?;
    let forecast = ctx.analyzer.forecast(&ctx.records, scenario)?;

    match ctx.format {
        OutputFormat::Json => print_json(&ForecastOutput {
            backtest: &backtest,
            forecast: &forecast,
        })?,
        OutputFormat::Table => {
            print_heading("Cost Model", 50);
            println!(
                "Mean Abs. Error:        {}",
                format_pct(backtest.mean_error_pct)
            );
            println!(
                "Accuracy Score:         {}",
                format_pct(backtest.accuracy_pct)
            );
            println!(
                "Predicted Compute:      {}",
                format_currency(backtest.predicted_compute_cost_usd)
            );
            println!(
                "Predicted Transfer:     {}",
                format_currency(backtest.predicted_transfer_cost_usd)
            );
            println!(
                "Predicted Total:        {}",
                format_currency(backtest.predicted_total_cost_usd)
            );
            if backtest.accuracy_pct < LOW_ACCURACY_PCT {
                println!();
                print_warning(
                    "The cost model omits request charges and provisioned concurrency; treat forecasts as relative changes",
                );
            }
            println!();

            print_subheading("Scenario", 50);
            if scenario.is_baseline() {
                println!("No changes (recorded usage)");
            } else {
                println!(
                    "Invocation Growth:      {:+}%",
                    scenario.invocation_growth_pct
                );
                println!("Memory Change:          {:+}%", scenario.memory_change_pct);
                println!(
                    "Duration Change:        {:+}%",
                    scenario.duration_change_pct
                );
            }
            println!();
            println!(
                "Recorded Cost:          {}",
                format_currency(forecast.current_total_usd)
            );
            println!(
                "Forecast Cost:          {}",
                format_currency(forecast.forecast_total_usd).bold()
            );
            println!(
                "Expected Change:        {} ({})",
                color_change(forecast.change_usd),
                forecast
                    .change_pct
                    .map(format_pct)
                    .unwrap_or_else(|| "n/a".to_string())
            );
            println!();

            let rows: Vec<ForecastEnvironmentRow> = forecast
                .by_environment
                .iter()
                .map(|e| ForecastEnvironmentRow {
                    environment: e.environment.to_string(),
                    current: format_currency(e.current_cost_usd),
                    forecast: format_currency(e.forecast_cost_usd),
                    change: color_change(e.change_usd),
                })
                .collect();
            print_table(rows, "No functions found");
        }
    }

    Ok(())
}

/// Show the executive summary
pub fn summary(ctx: &Context) -> Result<()> {
    let summary = ctx.analyzer.executive_summary(&ctx.records, Utc::now())?;

    match ctx.format {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Table => {
            print_heading("Executive Summary", 50);
            println!(
                "Monthly Cost:           {} across {} functions",
                format_currency(summary.baseline_cost_usd).bold(),
                summary.function_count
            );
            println!(
                "Top Spenders:           {} functions, {} ({})",
                summary.top_cost_count,
                format_currency(summary.top_cost_usd),
                format_pct(summary.top_cost_share_pct)
            );
            println!(
                "Model Accuracy:         {}",
                format_pct(summary.forecast_accuracy_pct)
            );
            println!();

            print_subheading("Savings Opportunities", 50);
            let rows = vec![
                SavingsRow {
                    source: "Memory right-sizing",
                    monthly: format_currency(summary.right_sizing_savings_usd),
                },
                SavingsRow {
                    source: "Provisioned concurrency",
                    monthly: format_currency(summary.concurrency_savings_usd),
                },
                SavingsRow {
                    source: "Unused function cleanup",
                    monthly: format_currency(summary.cleanup_savings_usd),
                },
                SavingsRow {
                    source: "Containerization",
                    monthly: format_currency(summary.containerization_savings_usd),
                },
            ];
            print_table(rows, "No savings found");
            println!();

            for (label, scenario) in [
                ("Conservative", &summary.conservative),
                ("Aggressive", &summary.aggressive),
            ] {
                let share = scenario
                    .pct_of_baseline
                    .map(format_pct)
                    .unwrap_or_else(|| "n/a".to_string());
                println!(
                    "{:<24}{} / month, {} / year ({})",
                    format!("{}:", label),
                    format_currency(scenario.monthly_usd).green().bold(),
                    format_currency(scenario.annual_usd).green(),
                    share
                );
            }
            println!();
            println!(
                "Generated: {}",
                summary
                    .generated_at
                    .format("%Y-%m-%d %H:%M:%S UTC")
                    .to_string()
                    .dimmed()
            );
        }
    }

    Ok(())
}
