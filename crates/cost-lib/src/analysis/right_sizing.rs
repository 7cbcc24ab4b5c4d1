//! Memory right-sizing
//!
//! Flags functions whose memory allocation is high relative to how long
//! they run, then projects the cost of a reduced allocation.
//!
//! The projection assumes cost scales linearly with memory. Real billing
//! is not linear near allocation tiers; the figure is an approximation that
//! does not use the forecast model's formula.

use serde::Serialize;

use crate::analysis::metrics::DerivedTable;
use crate::analysis::Analysis;
use crate::config::RightSizingConfig;
use crate::error::AnalyticsResult;
use crate::models::Environment;

/// An over-provisioned function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverProvisioned {
    pub name: String,
    pub environment: Environment,
    pub memory_mb: u32,
    pub avg_duration_ms: f64,
    pub memory_score: f64,
    pub cost_usd: f64,
}

/// Projected effect of shrinking one function's memory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryRecommendation {
    pub name: String,
    pub environment: Environment,
    pub current_memory_mb: u32,
    pub recommended_memory_mb: u32,
    pub current_cost_usd: f64,
    pub estimated_new_cost_usd: f64,
    pub savings_usd: f64,
}

/// Result of the right-sizing analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RightSizingReport {
    /// Every over-provisioned function, cost descending
    pub over_provisioned: Vec<OverProvisioned>,
    pub over_provisioned_cost_usd: f64,
    /// Flat-rate estimate over all over-provisioned cost
    pub rough_potential_savings_usd: f64,
    /// Per-function projections for the most expensive flagged functions
    pub recommendations: Vec<MemoryRecommendation>,
    /// Sum of the per-function projected savings
    pub projected_savings_usd: f64,
}

/// Scores functions for memory over-provisioning
pub struct RightSizingScorer {
    config: RightSizingConfig,
}

impl RightSizingScorer {
    pub fn new(config: RightSizingConfig) -> Self {
        Self { config }
    }

    fn recommend(&self, f: &OverProvisioned) -> MemoryRecommendation {
        let new_memory = f.memory_mb as f64 * self.config.memory_reduction_factor;
        let memory_ratio = new_memory / f.memory_mb as f64;
        let estimated_new_cost = f.cost_usd * memory_ratio;

        MemoryRecommendation {
            name: f.name.clone(),
            environment: f.environment,
            current_memory_mb: f.memory_mb,
            recommended_memory_mb: new_memory as u32,
            current_cost_usd: f.cost_usd,
            estimated_new_cost_usd: estimated_new_cost,
            savings_usd: f.cost_usd - estimated_new_cost,
        }
    }
}

impl Analysis for RightSizingScorer {
    type Output = RightSizingReport;
    const NAME: &'static str = "right_sizing";

    fn run(&self, table: &DerivedTable) -> AnalyticsResult<RightSizingReport> {
        let mut over_provisioned: Vec<OverProvisioned> = table
            .rows
            .iter()
            .filter(|d| d.memory_score > self.config.memory_score_threshold)
            .map(|d| OverProvisioned {
                name: d.record.name.clone(),
                environment: d.record.environment,
                memory_mb: d.record.memory_mb,
                avg_duration_ms: d.record.avg_duration_ms,
                memory_score: d.memory_score,
                cost_usd: d.record.cost_usd,
            })
            .collect();
        over_provisioned.sort_by(|a, b| b.cost_usd.total_cmp(&a.cost_usd));

        let over_provisioned_cost_usd: f64 = over_provisioned.iter().map(|f| f.cost_usd).sum();

        let recommendations: Vec<MemoryRecommendation> = over_provisioned
            .iter()
            .take(self.config.max_recommendations)
            .map(|f| self.recommend(f))
            .collect();
        let projected_savings_usd = recommendations.iter().map(|r| r.savings_usd).sum();

        Ok(RightSizingReport {
            over_provisioned,
            over_provisioned_cost_usd,
            rough_potential_savings_usd: over_provisioned_cost_usd
                * self.config.rough_savings_rate,
            recommendations,
            projected_savings_usd,
        })
    }
}
