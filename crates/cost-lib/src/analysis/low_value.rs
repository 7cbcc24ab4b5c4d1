//! Unused and low-value workload detection

use serde::Serialize;

use crate::analysis::metrics::{DerivedRecord, DerivedTable};
use crate::analysis::Analysis;
use crate::config::LowValueConfig;
use crate::error::AnalyticsResult;
use crate::models::Environment;

/// A function with its share of total invocations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRow {
    pub name: String,
    pub environment: Environment,
    pub invocations_per_month: u64,
    pub invocation_pct: f64,
    pub cost_usd: f64,
    pub avg_duration_ms: f64,
}

impl From<&DerivedRecord> for UsageRow {
    fn from(d: &DerivedRecord) -> Self {
        Self {
            name: d.record.name.clone(),
            environment: d.record.environment,
            invocations_per_month: d.record.invocations_per_month,
            invocation_pct: d.invocation_pct,
            cost_usd: d.record.cost_usd,
            avg_duration_ms: d.record.avg_duration_ms,
        }
    }
}

/// Result of the low-value workload analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowValueReport {
    pub median_cost_usd: f64,
    /// Rarely invoked but costlier than the median, cost descending
    pub low_value: Vec<UsageRow>,
    pub low_value_cost_usd: f64,
    /// Barely invoked regardless of cost, in table order
    pub very_low_usage: Vec<UsageRow>,
    /// Non-production very-low-usage functions proposed for deletion
    pub cleanup_candidates: Vec<UsageRow>,
    pub cleanup_savings_usd: f64,
}

/// Flags functions whose usage does not justify their cost
pub struct LowValueDetector {
    config: LowValueConfig,
}

impl LowValueDetector {
    pub fn new(config: LowValueConfig) -> Self {
        Self { config }
    }
}

impl Analysis for LowValueDetector {
    type Output = LowValueReport;
    const NAME: &'static str = "low_value";

    fn run(&self, table: &DerivedTable) -> AnalyticsResult<LowValueReport> {
        let median_cost = table.stats.median_cost_usd;

        let mut low_value: Vec<UsageRow> = table
            .rows
            .iter()
            .filter(|d| {
                d.invocation_pct < self.config.invocation_pct_threshold
                    && d.record.cost_usd > median_cost
            })
            .map(UsageRow::from)
            .collect();
        low_value.sort_by(|a, b| b.cost_usd.total_cmp(&a.cost_usd));

        let very_low_usage: Vec<UsageRow> = table
            .rows
            .iter()
            .filter(|d| d.invocation_pct < self.config.very_low_invocation_pct)
            .map(UsageRow::from)
            .collect();

        let mut cleanup_candidates: Vec<UsageRow> = very_low_usage
            .iter()
            .filter(|u| u.environment.is_non_production())
            .cloned()
            .collect();
        cleanup_candidates.sort_by(|a, b| b.cost_usd.total_cmp(&a.cost_usd));
        cleanup_candidates.truncate(self.config.cleanup_limit);

        Ok(LowValueReport {
            median_cost_usd: median_cost,
            low_value_cost_usd: low_value.iter().map(|u| u.cost_usd).sum(),
            low_value,
            very_low_usage,
            cleanup_savings_usd: cleanup_candidates.iter().map(|u| u.cost_usd).sum(),
            cleanup_candidates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::metrics::fixtures::record;
    use crate::analysis::metrics::MetricDeriver;
    use crate::config::COST_EPSILON;
    use crate::models::FunctionRecord;

    fn usage(name: &str, env: Environment, invocations: u64, cost_usd: f64) -> FunctionRecord {
        FunctionRecord {
            invocations_per_month: invocations,
            cost_usd,
            ..record(name, env)
        }
    }

    fn detect(records: &[FunctionRecord], config: LowValueConfig) -> LowValueReport {
        let table = MetricDeriver::new(COST_EPSILON).derive(records).unwrap();
        LowValueDetector::new(config).run(&table).unwrap()
    }

    /// Total invocations are 1,000,000 so each unit of 10,000 is 1%
    fn sample() -> Vec<FunctionRecord> {
        vec![
            usage("hot-prod", Environment::Production, 960_000, 10.0),
            usage("rare-costly-prod", Environment::Production, 500, 90.0),
            usage("rare-costly-dev", Environment::Development, 900, 40.0),
            usage("rare-cheap-staging", Environment::Staging, 600, 1.0),
            usage("warm-staging", Environment::Staging, 38_000, 30.0),
        ]
    }

    #[test]
    fn test_low_value_needs_low_share_and_above_median_cost() {
        let report = detect(&sample(), LowValueConfig::default());
        assert_eq!(report.median_cost_usd, 30.0);

        let names: Vec<_> = report.low_value.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["rare-costly-prod", "rare-costly-dev"]);
        assert_eq!(report.low_value_cost_usd, 130.0);
    }

    #[test]
    fn test_very_low_usage_ignores_cost() {
        let report = detect(&sample(), LowValueConfig::default());
        let names: Vec<_> = report.very_low_usage.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["rare-costly-prod", "rare-costly-dev", "rare-cheap-staging"]
        );
    }

    #[test]
    fn test_production_never_proposed_for_cleanup() {
        let report = detect(&sample(), LowValueConfig::default());
        let names: Vec<_> = report
            .cleanup_candidates
            .iter()
            .map(|u| u.name.as_str())
            .collect();
        assert_eq!(names, vec!["rare-costly-dev", "rare-cheap-staging"]);
        assert_eq!(report.cleanup_savings_usd, 41.0);
    }

    #[test]
    fn test_cleanup_limited_to_top_n() {
        let config = LowValueConfig {
            cleanup_limit: 1,
            ..LowValueConfig::default()
        };
        let report = detect(&sample(), config);
        assert_eq!(report.cleanup_candidates.len(), 1);
        assert_eq!(report.cleanup_savings_usd, 40.0);
    }
}
