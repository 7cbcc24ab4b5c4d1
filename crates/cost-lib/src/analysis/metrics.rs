//! Per-record metric derivation
//!
//! Every analysis starts from a [`DerivedTable`]: the base records paired
//! with ratios and scores computed against table-wide statistics. Nothing
//! here is cached; derivation runs again for each analysis call.

use serde::Serialize;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::FunctionRecord;
use crate::stats::{self, normalize};

/// Table-wide statistics shared by the analyses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStats {
    pub record_count: usize,
    pub max_memory_mb: f64,
    pub max_duration_ms: f64,
    pub total_invocations: u64,
    pub total_cost_usd: f64,
    pub median_cost_usd: f64,
    pub median_invocations: f64,
    pub median_gb_seconds: f64,
    pub total_provisioned_concurrency: u64,
}

/// A base record with its derived metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRecord {
    #[serde(flatten)]
    pub record: FunctionRecord,
    /// Recorded cost per billed GB-second, epsilon-guarded
    pub cost_per_gb_second: f64,
    /// Milliseconds of execution per MB of memory
    pub memory_efficiency: f64,
    /// Normalized memory minus normalized duration, roughly in [-1, 1]
    pub memory_score: f64,
    /// Share of all invocations in the table, in percent
    pub invocation_pct: f64,
}

/// Records in input order plus the statistics they were derived against
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedTable {
    pub rows: Vec<DerivedRecord>,
    pub stats: TableStats,
}

impl DerivedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Derives per-record metrics from a record table
pub struct MetricDeriver {
    cost_epsilon: f64,
}

impl MetricDeriver {
    pub fn new(cost_epsilon: f64) -> Self {
        Self { cost_epsilon }
    }

    /// Derive metrics for every record
    ///
    /// Fails on an empty table and on a table whose invocations sum to zero,
    /// since invocation shares would be undefined.
    pub fn derive(&self, records: &[FunctionRecord]) -> AnalyticsResult<DerivedTable> {
        let stats = self.table_stats(records)?;
        if stats.total_invocations == 0 {
            return Err(AnalyticsError::ZeroTotal {
                quantity: "invocations",
            });
        }

        let rows = records
            .iter()
            .map(|r| DerivedRecord {
                record: r.clone(),
                cost_per_gb_second: r.cost_usd / (r.gb_seconds + self.cost_epsilon),
                memory_efficiency: r.avg_duration_ms / r.memory_mb as f64,
                memory_score: normalize(r.memory_mb as f64, stats.max_memory_mb)
                    - normalize(r.avg_duration_ms, stats.max_duration_ms),
                invocation_pct: r.invocations_per_month as f64 / stats.total_invocations as f64
                    * 100.0,
            })
            .collect();

        Ok(DerivedTable { rows, stats })
    }

    fn table_stats(&self, records: &[FunctionRecord]) -> AnalyticsResult<TableStats> {
        if records.is_empty() {
            return Err(AnalyticsError::EmptyInput {
                operation: "metric derivation",
            });
        }

        let memory: Vec<f64> = records.iter().map(|r| r.memory_mb as f64).collect();
        let duration: Vec<f64> = records.iter().map(|r| r.avg_duration_ms).collect();
        let cost: Vec<f64> = records.iter().map(|r| r.cost_usd).collect();
        let invocations: Vec<f64> = records
            .iter()
            .map(|r| r.invocations_per_month as f64)
            .collect();
        let gb_seconds: Vec<f64> = records.iter().map(|r| r.gb_seconds).collect();

        Ok(TableStats {
            record_count: records.len(),
            max_memory_mb: stats::max(&memory, "max memory")?,
            max_duration_ms: stats::max(&duration, "max duration")?,
            total_invocations: records.iter().map(|r| r.invocations_per_month).sum(),
            total_cost_usd: cost.iter().sum(),
            median_cost_usd: stats::median(&cost, "median cost")?,
            median_invocations: stats::median(&invocations, "median invocations")?,
            median_gb_seconds: stats::median(&gb_seconds, "median GB-seconds")?,
            total_provisioned_concurrency: records
                .iter()
                .map(|r| r.provisioned_concurrency as u64)
                .sum(),
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{Environment, FunctionRecord};

    /// Build a record with neutral defaults for the fields a test does not care about
    pub fn record(name: &str, environment: Environment) -> FunctionRecord {
        FunctionRecord {
            name: name.to_string(),
            environment,
            invocations_per_month: 1000,
            avg_duration_ms: 100.0,
            memory_mb: 128,
            cold_start_rate: 0.0,
            provisioned_concurrency: 0,
            gb_seconds: 1.0,
            data_transfer_gb: 0.0,
            cost_usd: 1.0,
        }
    }

    pub fn with_cost(name: &str, cost_usd: f64) -> FunctionRecord {
        FunctionRecord {
            cost_usd,
            ..record(name, Environment::Production)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;
    use crate::config::COST_EPSILON;
    use crate::models::Environment;

    #[test]
    fn test_empty_table_fails() {
        let deriver = MetricDeriver::new(COST_EPSILON);
        assert!(matches!(
            deriver.derive(&[]),
            Err(AnalyticsError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_zero_invocations_fail() {
        let mut r = record("idle", Environment::Development);
        r.invocations_per_month = 0;
        let deriver = MetricDeriver::new(COST_EPSILON);
        assert!(matches!(
            deriver.derive(&[r]),
            Err(AnalyticsError::ZeroTotal { quantity: "invocations" })
        ));
    }

    #[test]
    fn test_cost_per_gb_second_guarded_at_zero() {
        let mut r = record("no-compute", Environment::Production);
        r.gb_seconds = 0.0;
        r.cost_usd = 2.0;

        let table = MetricDeriver::new(COST_EPSILON).derive(&[r]).unwrap();
        let value = table.rows[0].cost_per_gb_second;
        assert!(value.is_finite());
        assert!((value - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_memory_score_normalizes_against_table_max() {
        let mut big = record("big-short", Environment::Production);
        big.memory_mb = 4096;
        big.avg_duration_ms = 60.0;
        let mut small = record("small-long", Environment::Production);
        small.memory_mb = 1024;
        small.avg_duration_ms = 600.0;

        let table = MetricDeriver::new(COST_EPSILON).derive(&[big, small]).unwrap();
        assert!((table.rows[0].memory_score - (1.0 - 0.1)).abs() < 1e-12);
        assert!((table.rows[1].memory_score - (0.25 - 1.0)).abs() < 1e-12);
        assert_eq!(table.stats.max_memory_mb, 4096.0);
        assert_eq!(table.stats.max_duration_ms, 600.0);
    }

    #[test]
    fn test_invocation_pct_sums_to_hundred() {
        let records: Vec<_> = [1u64, 3, 6]
            .iter()
            .enumerate()
            .map(|(i, inv)| {
                let mut r = record(&format!("f{}", i), Environment::Staging);
                r.invocations_per_month = *inv;
                r
            })
            .collect();

        let table = MetricDeriver::new(COST_EPSILON).derive(&records).unwrap();
        let pcts: Vec<f64> = table.rows.iter().map(|r| r.invocation_pct).collect();
        assert_eq!(pcts, vec![10.0, 30.0, 60.0]);
    }

    #[test]
    fn test_memory_efficiency() {
        let mut r = record("f", Environment::Production);
        r.avg_duration_ms = 512.0;
        r.memory_mb = 256;
        let table = MetricDeriver::new(COST_EPSILON).derive(&[r]).unwrap();
        assert_eq!(table.rows[0].memory_efficiency, 2.0);
    }

    #[test]
    fn test_stats_cover_whole_table() {
        let mut a = record("a", Environment::Production);
        a.cost_usd = 10.0;
        a.provisioned_concurrency = 3;
        let mut b = record("b", Environment::Production);
        b.cost_usd = 30.0;
        b.provisioned_concurrency = 2;

        let table = MetricDeriver::new(COST_EPSILON).derive(&[a, b]).unwrap();
        assert_eq!(table.stats.record_count, 2);
        assert_eq!(table.stats.total_cost_usd, 40.0);
        assert_eq!(table.stats.median_cost_usd, 20.0);
        assert_eq!(table.stats.total_provisioned_concurrency, 5);
        assert_eq!(table.stats.total_invocations, 2000);
    }
}
