//! Closed-form cost forecasting
//!
//! ```text
//! compute_cost  = (memory_mb / 1024) * (duration_ms / 1000) * invocations * compute_price
//! transfer_cost = transfer_gb * transfer_price
//! total_cost    = compute_cost + transfer_cost
//! ```
//!
//! There is no fitting: both prices come from [`PricingConfig`]. The same
//! formula is back-tested against recorded cost and used to project cost
//! under a [`Scenario`]. Scenarios scale invocations, memory and duration;
//! data transfer volume is held constant, which understates transfer cost
//! when invocation volume grows.

use serde::Serialize;

use crate::analysis::metrics::DerivedTable;
use crate::analysis::Analysis;
use crate::config::PricingConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{scale_by_pct, Environment, FunctionRecord, Scenario};
use crate::stats::{self, percent_of};

/// Modeled cost components for one set of inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostEstimate {
    pub gb_seconds: f64,
    pub compute_cost_usd: f64,
    pub transfer_cost_usd: f64,
    pub total_cost_usd: f64,
}

/// The analytic cost formula
#[derive(Debug, Clone)]
pub struct CostModel {
    pricing: PricingConfig,
}

impl CostModel {
    pub fn new(pricing: PricingConfig) -> Self {
        Self { pricing }
    }

    pub fn estimate(
        &self,
        memory_mb: f64,
        duration_ms: f64,
        invocations: f64,
        transfer_gb: f64,
    ) -> CostEstimate {
        let gb_seconds = (memory_mb / 1024.0) * (duration_ms / 1000.0) * invocations;
        let compute_cost_usd = gb_seconds * self.pricing.compute_price_per_gb_second;
        let transfer_cost_usd = transfer_gb * self.pricing.transfer_price_per_gb;
        CostEstimate {
            gb_seconds,
            compute_cost_usd,
            transfer_cost_usd,
            total_cost_usd: compute_cost_usd + transfer_cost_usd,
        }
    }

    /// Estimate a record's cost with a scenario applied
    pub fn estimate_record(&self, record: &FunctionRecord, scenario: &Scenario) -> CostEstimate {
        self.estimate(
            scale_by_pct(record.memory_mb as f64, scenario.memory_change_pct),
            scale_by_pct(record.avg_duration_ms, scenario.duration_change_pct),
            scale_by_pct(record.invocations_per_month as f64, scenario.invocation_growth_pct),
            record.data_transfer_gb,
        )
    }
}

/// Modeled vs recorded cost for one function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestRow {
    pub name: String,
    pub environment: Environment,
    pub recorded_cost_usd: f64,
    #[serde(flatten)]
    pub estimate: CostEstimate,
    pub cost_error_usd: f64,
    /// Absolute error relative to recorded cost; `None` when nothing was recorded
    pub error_pct: Option<f64>,
}

/// Result of comparing the model against recorded cost
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub rows: Vec<BacktestRow>,
    /// Mean absolute percentage error over rows with recorded cost
    pub mean_error_pct: f64,
    /// `100 - MAPE`; a MAPE-derived score, not a share of correct predictions
    pub accuracy_pct: f64,
    pub predicted_compute_cost_usd: f64,
    pub predicted_transfer_cost_usd: f64,
    pub predicted_total_cost_usd: f64,
}

/// Projected cost for one function under a scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub name: String,
    pub environment: Environment,
    pub current_cost_usd: f64,
    pub forecast_invocations: f64,
    pub forecast_memory_mb: f64,
    pub forecast_duration_ms: f64,
    pub forecast_cost_usd: f64,
}

/// Current vs projected cost for one environment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentForecast {
    pub environment: Environment,
    pub current_cost_usd: f64,
    pub forecast_cost_usd: f64,
    pub change_usd: f64,
}

/// Result of projecting a scenario over the table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub scenario: Scenario,
    pub rows: Vec<ForecastRow>,
    /// Sum of recorded cost
    pub current_total_usd: f64,
    pub forecast_total_usd: f64,
    pub change_usd: f64,
    /// `None` when the current total is zero
    pub change_pct: Option<f64>,
    pub by_environment: Vec<EnvironmentForecast>,
}

/// Back-tests the cost model against recorded cost
pub struct Backtester {
    model: CostModel,
}

impl Backtester {
    pub fn new(pricing: PricingConfig) -> Self {
        Self {
            model: CostModel::new(pricing),
        }
    }

    /// Compare one function's recorded cost with the baseline estimate
    pub fn row(&self, record: &FunctionRecord) -> BacktestRow {
        let estimate = self.model.estimate_record(record, &Scenario::default());
        let cost_error = (record.cost_usd - estimate.total_cost_usd).abs();
        BacktestRow {
            name: record.name.clone(),
            environment: record.environment,
            recorded_cost_usd: record.cost_usd,
            estimate,
            cost_error_usd: cost_error,
            error_pct: (record.cost_usd > 0.0).then(|| cost_error / record.cost_usd * 100.0),
        }
    }
}

impl Analysis for Backtester {
    type Output = BacktestReport;
    const NAME: &'static str = "backtest";

    fn run(&self, table: &DerivedTable) -> AnalyticsResult<BacktestReport> {
        let rows: Vec<BacktestRow> = table.rows.iter().map(|d| self.row(&d.record)).collect();

        let errors: Vec<f64> = rows.iter().filter_map(|r| r.error_pct).collect();
        if errors.is_empty() {
            return Err(AnalyticsError::ZeroTotal {
                quantity: "recorded cost",
            });
        }
        let mean_error_pct = stats::mean(&errors, "back-test error")?;

        let predicted_compute_cost_usd = rows.iter().map(|r| r.estimate.compute_cost_usd).sum();
        let predicted_transfer_cost_usd = rows.iter().map(|r| r.estimate.transfer_cost_usd).sum();
        let predicted_total_cost_usd = rows.iter().map(|r| r.estimate.total_cost_usd).sum();

        Ok(BacktestReport {
            rows,
            mean_error_pct,
            accuracy_pct: 100.0 - mean_error_pct,
            predicted_compute_cost_usd,
            predicted_transfer_cost_usd,
            predicted_total_cost_usd,
        })
    }
}

/// Projects table cost under a scenario
pub struct Forecaster {
    model: CostModel,
    scenario: Scenario,
}

impl Forecaster {
    pub fn new(pricing: PricingConfig, scenario: Scenario) -> Self {
        Self {
            model: CostModel::new(pricing),
            scenario,
        }
    }
}

impl Analysis for Forecaster {
    type Output = ForecastReport;
    const NAME: &'static str = "forecast";

    fn run(&self, table: &DerivedTable) -> AnalyticsResult<ForecastReport> {
        let s = &self.scenario;
        let rows: Vec<ForecastRow> = table
            .rows
            .iter()
            .map(|d| {
                let r = &d.record;
                ForecastRow {
                    name: r.name.clone(),
                    environment: r.environment,
                    current_cost_usd: r.cost_usd,
                    forecast_invocations: scale_by_pct(
                        r.invocations_per_month as f64,
                        s.invocation_growth_pct,
                    ),
                    forecast_memory_mb: scale_by_pct(r.memory_mb as f64, s.memory_change_pct),
                    forecast_duration_ms: scale_by_pct(r.avg_duration_ms, s.duration_change_pct),
                    forecast_cost_usd: self.model.estimate_record(r, s).total_cost_usd,
                }
            })
            .collect();

        let mut by_environment: Vec<EnvironmentForecast> = Vec::new();
        for row in &rows {
            match by_environment
                .iter_mut()
                .find(|e| e.environment == row.environment)
            {
                Some(env) => {
                    env.current_cost_usd += row.current_cost_usd;
                    env.forecast_cost_usd += row.forecast_cost_usd;
                }
                None => by_environment.push(EnvironmentForecast {
                    environment: row.environment,
                    current_cost_usd: row.current_cost_usd,
                    forecast_cost_usd: row.forecast_cost_usd,
                    change_usd: 0.0,
                }),
            }
        }
        for env in &mut by_environment {
            env.change_usd = env.forecast_cost_usd - env.current_cost_usd;
        }

        let current_total_usd: f64 = rows.iter().map(|r| r.current_cost_usd).sum();
        let forecast_total_usd: f64 = rows.iter().map(|r| r.forecast_cost_usd).sum();
        let change_usd = forecast_total_usd - current_total_usd;

        Ok(ForecastReport {
            scenario: *s,
            rows,
            current_total_usd,
            forecast_total_usd,
            change_usd,
            change_pct: percent_of(change_usd, current_total_usd),
            by_environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::metrics::fixtures::record;
    use crate::analysis::metrics::MetricDeriver;
    use crate::config::COST_EPSILON;

    fn collector() -> FunctionRecord {
        FunctionRecord {
            memory_mb: 256,
            avg_duration_ms: 65.0,
            invocations_per_month: 1_800_000,
            data_transfer_gb: 90.0,
            cost_usd: 47.80,
            ..record("user-activity-collector-prod", Environment::Production)
        }
    }

    fn table(records: &[FunctionRecord]) -> DerivedTable {
        MetricDeriver::new(COST_EPSILON).derive(records).unwrap()
    }

    #[test]
    fn test_worked_example() {
        let model = CostModel::new(PricingConfig::default());
        let estimate = model.estimate_record(&collector(), &Scenario::default());

        assert!((estimate.gb_seconds - 29_250.0).abs() < 1e-6);
        assert!((estimate.compute_cost_usd - 0.4875).abs() < 1e-4);
        assert!((estimate.transfer_cost_usd - 8.1).abs() < 1e-12);
        assert!((estimate.total_cost_usd - 8.5875).abs() < 1e-4);
    }

    #[test]
    fn test_prices_are_configurable() {
        let model = CostModel::new(PricingConfig {
            compute_price_per_gb_second: 0.0,
            transfer_price_per_gb: 1.0,
        });
        let estimate = model.estimate_record(&collector(), &Scenario::default());
        assert_eq!(estimate.total_cost_usd, 90.0);
    }

    #[test]
    fn test_backtest_error_metrics() {
        let report = Backtester::new(PricingConfig::default())
            .run(&table(&[collector()]))
            .unwrap();
        let row = &report.rows[0];

        let expected_error = 47.80 - row.estimate.total_cost_usd;
        assert!((row.cost_error_usd - expected_error).abs() < 1e-12);
        let expected_pct = expected_error / 47.80 * 100.0;
        assert!((row.error_pct.unwrap() - expected_pct).abs() < 1e-9);
        assert!((report.mean_error_pct - expected_pct).abs() < 1e-9);
        assert!((report.accuracy_pct - (100.0 - expected_pct)).abs() < 1e-9);
        assert!((report.predicted_transfer_cost_usd - 8.1).abs() < 1e-12);
    }

    #[test]
    fn test_row_matches_report_row() {
        let backtester = Backtester::new(PricingConfig::default());
        let report = backtester.run(&table(&[collector()])).unwrap();
        assert_eq!(backtester.row(&collector()), report.rows[0]);
    }

    #[test]
    fn test_backtest_skips_zero_recorded_cost() {
        let free = FunctionRecord {
            cost_usd: 0.0,
            ..record("free", Environment::Development)
        };
        let report = Backtester::new(PricingConfig::default())
            .run(&table(&[collector(), free]))
            .unwrap();
        assert!(report.rows[1].error_pct.is_none());
        assert_eq!(Some(report.mean_error_pct), report.rows[0].error_pct);
    }

    #[test]
    fn test_backtest_without_recorded_cost_fails() {
        let free = FunctionRecord {
            cost_usd: 0.0,
            ..record("free", Environment::Development)
        };
        let result = Backtester::new(PricingConfig::default()).run(&table(&[free]));
        assert!(matches!(result, Err(AnalyticsError::ZeroTotal { .. })));
    }

    #[test]
    fn test_baseline_scenario_matches_backtest() {
        let t = table(&[collector()]);
        let forecast = Forecaster::new(PricingConfig::default(), Scenario::default())
            .run(&t)
            .unwrap();
        let backtest = Backtester::new(PricingConfig::default()).run(&t).unwrap();
        assert_eq!(
            forecast.forecast_total_usd,
            backtest.predicted_total_cost_usd
        );
        assert_eq!(forecast.current_total_usd, 47.80);
    }

    #[test]
    fn test_scenario_scales_compute_but_not_transfer() {
        let t = table(&[collector()]);
        let base = Forecaster::new(PricingConfig::default(), Scenario::default())
            .run(&t)
            .unwrap();
        let doubled = Forecaster::new(PricingConfig::default(), Scenario::new(100.0, 0.0, 0.0))
            .run(&t)
            .unwrap();

        let base_compute = base.forecast_total_usd - 8.1;
        let doubled_compute = doubled.forecast_total_usd - 8.1;
        assert!((doubled_compute - 2.0 * base_compute).abs() < 1e-9);
        assert_eq!(doubled.rows[0].forecast_invocations, 3_600_000.0);
    }

    #[test]
    fn test_scenario_accepts_out_of_range_values() {
        let t = table(&[collector()]);
        let report = Forecaster::new(PricingConfig::default(), Scenario::new(-100.0, 250.0, 0.0))
            .run(&t)
            .unwrap();
        // no invocations left, only transfer cost remains
        assert!((report.forecast_total_usd - 8.1).abs() < 1e-12);
        assert_eq!(report.rows[0].forecast_memory_mb, 896.0);
    }

    #[test]
    fn test_forecast_groups_by_environment() {
        let dev = FunctionRecord {
            data_transfer_gb: 10.0,
            cost_usd: 2.0,
            ..record("dev-fn", Environment::Development)
        };
        let report = Forecaster::new(PricingConfig::default(), Scenario::default())
            .run(&table(&[collector(), dev]))
            .unwrap();

        assert_eq!(report.by_environment.len(), 2);
        let dev_env = &report.by_environment[1];
        assert_eq!(dev_env.environment, Environment::Development);
        assert_eq!(dev_env.current_cost_usd, 2.0);
        assert!((dev_env.change_usd - (dev_env.forecast_cost_usd - 2.0)).abs() < 1e-12);
        assert!(report.change_pct.unwrap() < 0.0);
    }
}
