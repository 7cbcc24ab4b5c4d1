//! Provisioned concurrency advice
//!
//! Classifies functions that reserve pre-warmed capacity by how often they
//! still hit cold starts. Rates strictly below the low threshold suggest the
//! reservation can shrink; rates strictly above the high threshold suggest
//! it should grow. Anything in between, bounds included, is left alone.

use serde::Serialize;

use crate::analysis::metrics::{DerivedRecord, DerivedTable};
use crate::analysis::Analysis;
use crate::config::ConcurrencyConfig;
use crate::error::AnalyticsResult;
use crate::models::Environment;
use crate::stats;

/// Recommended change to a function's provisioned concurrency
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PcAction {
    /// Cold starts are rare; part of the reservation is wasted
    ReducePc { savings_usd: f64 },
    /// Cold starts are frequent; no cost model exists for added capacity
    IncreasePc,
    Maintain,
}

impl PcAction {
    pub fn label(&self) -> &'static str {
        match self {
            PcAction::ReducePc { .. } => "REDUCE PC",
            PcAction::IncreasePc => "INCREASE PC",
            PcAction::Maintain => "MAINTAIN",
        }
    }

    pub fn reasoning(&self) -> &'static str {
        match self {
            PcAction::ReducePc { .. } => "Low cold start rate, PC may be overkill",
            PcAction::IncreasePc => "High cold start rate, consider more PC units",
            PcAction::Maintain => "Balanced PC configuration",
        }
    }

    pub fn savings_usd(&self) -> f64 {
        match self {
            PcAction::ReducePc { savings_usd } => *savings_usd,
            PcAction::IncreasePc | PcAction::Maintain => 0.0,
        }
    }
}

/// A non-maintain recommendation for one function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PcRecommendation {
    pub name: String,
    pub environment: Environment,
    pub provisioned_concurrency: u32,
    pub cold_start_rate: f64,
    pub cost_usd: f64,
    #[serde(flatten)]
    pub action: PcAction,
}

/// Mean cost and cold start rate of one environment/PC group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PcComparison {
    pub environment: Environment,
    pub with_pc: bool,
    pub function_count: usize,
    pub avg_cost_usd: f64,
    pub avg_cold_start_pct: f64,
}

/// Result of the provisioned concurrency analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcurrencyReport {
    pub functions_with_pc: usize,
    pub total_pc_units: u64,
    pub pc_functions_cost_usd: f64,
    /// Mean cold start rate over functions with PC, `None` if there are none
    pub avg_cold_start_rate_with_pc: Option<f64>,
    pub comparison: Vec<PcComparison>,
    pub recommendations: Vec<PcRecommendation>,
    pub total_savings_usd: f64,
}

/// Classifies provisioned concurrency usage by cold start rate
pub struct ConcurrencyAdvisor {
    config: ConcurrencyConfig,
}

impl ConcurrencyAdvisor {
    pub fn new(config: ConcurrencyConfig) -> Self {
        Self { config }
    }

    /// Classify one function's cold start rate against the thresholds
    pub fn classify(&self, cold_start_rate: f64, cost_usd: f64) -> PcAction {
        if cold_start_rate < self.config.low_cold_start_rate {
            PcAction::ReducePc {
                savings_usd: cost_usd * self.config.reduce_savings_rate,
            }
        } else if cold_start_rate > self.config.high_cold_start_rate {
            PcAction::IncreasePc
        } else {
            PcAction::Maintain
        }
    }

    fn compare_groups(&self, table: &DerivedTable) -> AnalyticsResult<Vec<PcComparison>> {
        let mut environments: Vec<Environment> = Vec::new();
        for d in &table.rows {
            if !environments.contains(&d.record.environment) {
                environments.push(d.record.environment);
            }
        }

        let mut comparison = Vec::new();
        for environment in environments {
            for with_pc in [true, false] {
                let group: Vec<&DerivedRecord> = table
                    .rows
                    .iter()
                    .filter(|d| {
                        d.record.environment == environment
                            && (d.record.provisioned_concurrency > 0) == with_pc
                    })
                    .collect();
                if group.is_empty() {
                    continue;
                }
                let costs: Vec<f64> = group.iter().map(|d| d.record.cost_usd).collect();
                let rates: Vec<f64> = group.iter().map(|d| d.record.cold_start_rate).collect();
                comparison.push(PcComparison {
                    environment,
                    with_pc,
                    function_count: group.len(),
                    avg_cost_usd: stats::mean(&costs, "group cost")?,
                    avg_cold_start_pct: stats::mean(&rates, "group cold start rate")? * 100.0,
                });
            }
        }
        Ok(comparison)
    }
}

impl Analysis for ConcurrencyAdvisor {
    type Output = ConcurrencyReport;
    const NAME: &'static str = "concurrency";

    fn run(&self, table: &DerivedTable) -> AnalyticsResult<ConcurrencyReport> {
        let with_pc: Vec<&DerivedRecord> = table
            .rows
            .iter()
            .filter(|d| d.record.provisioned_concurrency > 0)
            .collect();

        let recommendations: Vec<PcRecommendation> = with_pc
            .iter()
            .filter_map(|d| {
                let r = &d.record;
                match self.classify(r.cold_start_rate, r.cost_usd) {
                    PcAction::Maintain => None,
                    action => Some(PcRecommendation {
                        name: r.name.clone(),
                        environment: r.environment,
                        provisioned_concurrency: r.provisioned_concurrency,
                        cold_start_rate: r.cold_start_rate,
                        cost_usd: r.cost_usd,
                        action,
                    }),
                }
            })
            .collect();

        let rates: Vec<f64> = with_pc.iter().map(|d| d.record.cold_start_rate).collect();
        let avg_cold_start_rate_with_pc = if rates.is_empty() {
            None
        } else {
            Some(stats::mean(&rates, "cold start rate")?)
        };

        Ok(ConcurrencyReport {
            functions_with_pc: with_pc.len(),
            total_pc_units: table.stats.total_provisioned_concurrency,
            pc_functions_cost_usd: with_pc.iter().map(|d| d.record.cost_usd).sum(),
            avg_cold_start_rate_with_pc,
            comparison: self.compare_groups(table)?,
            total_savings_usd: recommendations.iter().map(|r| r.action.savings_usd()).sum(),
            recommendations,
        })
    }
}
