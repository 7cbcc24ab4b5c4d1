//! Report rollups built from the stage outputs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::{
    BacktestReport, ConcurrencyReport, ContainerizationReport, DerivedTable, LowValueReport,
    ParetoReport, RightSizingReport,
};
use crate::models::Environment;
use crate::stats::percent_of;

/// Months per year, for annualized figures
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Monthly cost of one environment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentCost {
    pub environment: Environment,
    pub function_count: usize,
    pub cost_usd: f64,
    pub share_pct: f64,
}

/// Headline figures for a record table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub function_count: usize,
    pub total_cost_usd: f64,
    pub mean_cost_usd: f64,
    pub production_cost_usd: f64,
    pub total_invocations: u64,
    /// Cost descending
    pub by_environment: Vec<EnvironmentCost>,
}

impl Overview {
    pub fn from_table(table: &DerivedTable) -> Self {
        let total = table.stats.total_cost_usd;

        let mut by_environment: Vec<EnvironmentCost> = Vec::new();
        for d in &table.rows {
            let r = &d.record;
            match by_environment
                .iter_mut()
                .find(|e| e.environment == r.environment)
            {
                Some(env) => {
                    env.function_count += 1;
                    env.cost_usd += r.cost_usd;
                }
                None => by_environment.push(EnvironmentCost {
                    environment: r.environment,
                    function_count: 1,
                    cost_usd: r.cost_usd,
                    share_pct: 0.0,
                }),
            }
        }
        for env in &mut by_environment {
            env.share_pct = percent_of(env.cost_usd, total).unwrap_or(0.0);
        }
        by_environment.sort_by(|a, b| b.cost_usd.total_cmp(&a.cost_usd));

        let production_cost_usd = by_environment
            .iter()
            .find(|e| e.environment == Environment::Production)
            .map(|e| e.cost_usd)
            .unwrap_or(0.0);

        Self {
            function_count: table.len(),
            total_cost_usd: total,
            mean_cost_usd: total / table.len() as f64,
            production_cost_usd,
            total_invocations: table.stats.total_invocations,
            by_environment,
        }
    }
}

/// A savings total at monthly and annual scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SavingsScenario {
    pub monthly_usd: f64,
    pub annual_usd: f64,
    /// Share of the baseline monthly cost; `None` for a zero baseline
    pub pct_of_baseline: Option<f64>,
}

impl SavingsScenario {
    fn new(monthly_usd: f64, baseline_usd: f64) -> Self {
        Self {
            monthly_usd,
            annual_usd: monthly_usd * MONTHS_PER_YEAR,
            pct_of_baseline: percent_of(monthly_usd, baseline_usd),
        }
    }
}

/// Findings of every stage condensed into one summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub generated_at: DateTime<Utc>,
    pub baseline_cost_usd: f64,
    pub function_count: usize,
    pub top_cost_count: usize,
    pub top_cost_usd: f64,
    pub top_cost_share_pct: f64,
    pub right_sizing_savings_usd: f64,
    pub concurrency_savings_usd: f64,
    pub cleanup_savings_usd: f64,
    pub containerization_savings_usd: f64,
    pub forecast_accuracy_pct: f64,
    /// Right-sizing, cleanup and concurrency savings
    pub conservative: SavingsScenario,
    /// Conservative savings plus containerization
    pub aggressive: SavingsScenario,
}

/// Stage outputs an executive summary is built from
pub struct SummaryInputs<'a> {
    pub overview: &'a Overview,
    pub pareto: &'a ParetoReport,
    pub right_sizing: &'a RightSizingReport,
    pub concurrency: &'a ConcurrencyReport,
    pub low_value: &'a LowValueReport,
    pub containerization: &'a ContainerizationReport,
    pub backtest: &'a BacktestReport,
}

impl ExecutiveSummary {
    pub fn build(inputs: SummaryInputs<'_>, generated_at: DateTime<Utc>) -> Self {
        let baseline = inputs.overview.total_cost_usd;
        let right_sizing = inputs.right_sizing.projected_savings_usd;
        let concurrency = inputs.concurrency.total_savings_usd;
        let cleanup = inputs.low_value.cleanup_savings_usd;
        let containerization = inputs.containerization.aggregate_savings_usd;

        let conservative = right_sizing + cleanup + concurrency;
        let aggressive = conservative + containerization;

        Self {
            generated_at,
            baseline_cost_usd: baseline,
            function_count: inputs.overview.function_count,
            top_cost_count: inputs.pareto.top_count,
            top_cost_usd: inputs.pareto.top_cost_usd,
            top_cost_share_pct: inputs.pareto.top_share_pct,
            right_sizing_savings_usd: right_sizing,
            concurrency_savings_usd: concurrency,
            cleanup_savings_usd: cleanup,
            containerization_savings_usd: containerization,
            forecast_accuracy_pct: inputs.backtest.accuracy_pct,
            conservative: SavingsScenario::new(conservative, baseline),
            aggressive: SavingsScenario::new(aggressive, baseline),
        }
    }
}
