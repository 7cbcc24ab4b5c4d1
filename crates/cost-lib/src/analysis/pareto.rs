//! Pareto (80/20) cost ranking
//!
//! Ranks records by recorded cost, highest first, and finds the prefix
//! that stays within the configured share of total spend. The sort is
//! stable: records with equal cost keep their input order.

use serde::Serialize;

use crate::analysis::metrics::DerivedTable;
use crate::analysis::Analysis;
use crate::config::ParetoConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::Environment;

/// A record at its position in the cost ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoRow {
    pub rank: usize,
    pub name: String,
    pub environment: Environment,
    pub cost_usd: f64,
    pub invocations_per_month: u64,
    pub avg_duration_ms: f64,
    pub memory_mb: u32,
    pub cumulative_cost_usd: f64,
    pub cumulative_pct: f64,
}

/// Result of the Pareto ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoReport {
    /// Every record, cost descending
    pub rows: Vec<ParetoRow>,
    pub threshold_pct: f64,
    /// Length of the ranked prefix within the threshold
    pub top_count: usize,
    pub top_cost_usd: f64,
    pub top_share_pct: f64,
    pub total_cost_usd: f64,
}

impl ParetoReport {
    /// The records whose cumulative share stays within the threshold
    pub fn top_set(&self) -> &[ParetoRow] {
        &self.rows[..self.top_count]
    }
}

/// Ranks records by cost contribution
pub struct ParetoRanker {
    config: ParetoConfig,
}

impl ParetoRanker {
    pub fn new(config: ParetoConfig) -> Self {
        Self { config }
    }
}

impl Analysis for ParetoRanker {
    type Output = ParetoReport;
    const NAME: &'static str = "pareto";

    fn run(&self, table: &DerivedTable) -> AnalyticsResult<ParetoReport> {
        let total = table.stats.total_cost_usd;
        if total <= 0.0 {
            return Err(AnalyticsError::ZeroTotal { quantity: "cost" });
        }

        let mut order: Vec<usize> = (0..table.len()).collect();
        order.sort_by(|&a, &b| {
            table.rows[b]
                .record
                .cost_usd
                .total_cmp(&table.rows[a].record.cost_usd)
        });

        let mut cumulative = 0.0;
        let mut rows = Vec::with_capacity(order.len());
        for (rank, idx) in order.into_iter().enumerate() {
            let r = &table.rows[idx].record;
            cumulative += r.cost_usd;
            rows.push(ParetoRow {
                rank: rank + 1,
                name: r.name.clone(),
                environment: r.environment,
                cost_usd: r.cost_usd,
                invocations_per_month: r.invocations_per_month,
                avg_duration_ms: r.avg_duration_ms,
                memory_mb: r.memory_mb,
                cumulative_cost_usd: cumulative,
                cumulative_pct: (cumulative / total * 100.0).min(100.0),
            });
        }

        // Summation order differs from the total's, so pin the tail
        if let Some(last) = rows.last_mut() {
            last.cumulative_cost_usd = total;
            last.cumulative_pct = 100.0;
        }

        let top_count = rows
            .iter()
            .take_while(|r| r.cumulative_pct <= self.config.threshold_pct)
            .count();
        let top_cost_usd: f64 = rows[..top_count].iter().map(|r| r.cost_usd).sum();

        Ok(ParetoReport {
            top_count,
            top_cost_usd,
            top_share_pct: top_cost_usd / total * 100.0,
            threshold_pct: self.config.threshold_pct,
            total_cost_usd: total,
            rows,
        })
    }
}
