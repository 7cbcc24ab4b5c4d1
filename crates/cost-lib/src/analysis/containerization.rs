//! Containerization candidate scoring
//!
//! Each function earns points from four independent conditions:
//!
//! | Condition                              | Points |
//! |----------------------------------------|--------|
//! | duration above `long_duration_ms`      | 3      |
//! | memory above `high_memory_mb`          | 2      |
//! | invocations below the table median     | 1      |
//! | GB-seconds above the table median      | 1      |
//!
//! With the default candidate score of 4, the qualifying combinations are
//! long duration with high memory (5 to 7), long duration with either or
//! both minor conditions (4 or 5), and high memory with both minor
//! conditions (4). Every comparison is strict.
//!
//! Alternative hosting is priced at a flat fraction of the current cost.
//! This is a coarse heuristic, not a sizing calculation.

use serde::Serialize;

use crate::analysis::metrics::{DerivedTable, TableStats};
use crate::analysis::Analysis;
use crate::config::ContainerizationConfig;
use crate::error::AnalyticsResult;
use crate::models::{Environment, FunctionRecord};

/// A scored function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerScore {
    pub name: String,
    pub environment: Environment,
    pub avg_duration_ms: f64,
    pub memory_mb: u32,
    pub invocations_per_month: u64,
    pub gb_seconds: f64,
    pub cost_usd: f64,
    pub score: u8,
}

/// Current cost against the estimated cost of container hosting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostingComparison {
    pub name: String,
    pub function_cost_usd: f64,
    pub container_cost_usd: f64,
    pub savings_usd: f64,
}

/// Result of the containerization analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerizationReport {
    /// Scores for every function, in table order
    pub scores: Vec<ContainerScore>,
    /// Functions at or above the candidate score, score descending
    pub candidates: Vec<ContainerScore>,
    pub candidates_cost_usd: f64,
    /// Flat-rate estimate over all candidate cost
    pub aggregate_savings_usd: f64,
    /// Per-function pricing of the top candidates
    pub comparison: Vec<HostingComparison>,
    pub comparison_savings_usd: f64,
}

/// Scores functions for migration to long-running containers
pub struct ContainerizationScorer {
    config: ContainerizationConfig,
}

impl ContainerizationScorer {
    pub fn new(config: ContainerizationConfig) -> Self {
        Self { config }
    }

    /// Score a record against the table medians
    pub fn score(&self, r: &FunctionRecord, stats: &TableStats) -> u8 {
        let mut score = 0;
        if r.avg_duration_ms > self.config.long_duration_ms {
            score += 3;
        }
        if r.memory_mb > self.config.high_memory_mb {
            score += 2;
        }
        if (r.invocations_per_month as f64) < stats.median_invocations {
            score += 1;
        }
        if r.gb_seconds > stats.median_gb_seconds {
            score += 1;
        }
        score
    }

    pub fn is_candidate(&self, score: u8) -> bool {
        score >= self.config.candidate_score
    }
}

impl Analysis for ContainerizationScorer {
    type Output = ContainerizationReport;
    const NAME: &'static str = "containerization";

    fn run(&self, table: &DerivedTable) -> AnalyticsResult<ContainerizationReport> {
        let scores: Vec<ContainerScore> = table
            .rows
            .iter()
            .map(|d| {
                let r = &d.record;
                ContainerScore {
                    name: r.name.clone(),
                    environment: r.environment,
                    avg_duration_ms: r.avg_duration_ms,
                    memory_mb: r.memory_mb,
                    invocations_per_month: r.invocations_per_month,
                    gb_seconds: r.gb_seconds,
                    cost_usd: r.cost_usd,
                    score: self.score(r, &table.stats),
                }
            })
            .collect();

        let mut candidates: Vec<ContainerScore> = scores
            .iter()
            .filter(|s| self.is_candidate(s.score))
            .cloned()
            .collect();
        candidates.sort_by(|a, b| b.score.cmp(&a.score));

        let candidates_cost_usd: f64 = candidates.iter().map(|c| c.cost_usd).sum();

        let comparison: Vec<HostingComparison> = candidates
            .iter()
            .take(self.config.comparison_limit)
            .map(|c| {
                let container_cost = c.cost_usd * self.config.alternative_cost_factor;
                HostingComparison {
                    name: c.name.clone(),
                    function_cost_usd: c.cost_usd,
                    container_cost_usd: container_cost,
                    savings_usd: c.cost_usd - container_cost,
                }
            })
            .collect();

        Ok(ContainerizationReport {
            aggregate_savings_usd: candidates_cost_usd * self.config.aggregate_savings_rate,
            candidates_cost_usd,
            comparison_savings_usd: comparison.iter().map(|c| c.savings_usd).sum(),
            comparison,
            candidates,
            scores,
        })
    }
}
