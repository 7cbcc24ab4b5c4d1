//! Engine facade over the analysis stages
//!
//! [`CostAnalyzer`] derives a fresh table from the supplied records on every
//! call, runs the requested stage, and records its timing and findings.

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::analysis::{
    Analysis, BacktestReport, Backtester, ConcurrencyAdvisor, ConcurrencyReport,
    ContainerizationReport, ContainerizationScorer, DerivedTable, ForecastReport,
    Forecaster, LowValueDetector, LowValueReport, MetricDeriver, ParetoRanker, ParetoReport,
    RightSizingReport, RightSizingScorer,
};
use crate::config::EngineConfig;
use crate::dataset::{self, ExportRow};
use crate::error::AnalyticsResult;
use crate::models::{FunctionRecord, Scenario};
use crate::observability::{AnalysisLogger, AnalyticsMetrics};
use crate::report::{ExecutiveSummary, Overview, SummaryInputs};

/// Source name used for the embedded reference table
pub const EMBEDDED_SOURCE: &str = "embedded";

/// Runs cost analyses over function records
#[derive(Clone)]
pub struct CostAnalyzer {
    config: EngineConfig,
    metrics: AnalyticsMetrics,
    logger: AnalysisLogger,
}

impl Default for CostAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl CostAnalyzer {
    /// Create an analyzer with the default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default(), EMBEDDED_SOURCE)
    }

    /// Create an analyzer; `source` names the record table in log events
    pub fn with_config(config: EngineConfig, source: impl Into<String>) -> Self {
        Self {
            config,
            metrics: AnalyticsMetrics::new(),
            logger: AnalysisLogger::new(source),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load records from a CSV file, or the embedded table when no path is given
    pub fn load(&self, input: Option<&Path>) -> AnalyticsResult<Vec<FunctionRecord>> {
        let records = match input {
            Some(path) => dataset::load_path(path)?,
            None => dataset::reference_table()?.to_vec(),
        };
        let total: f64 = records.iter().map(|r| r.cost_usd).sum();
        self.logger.log_loaded(records.len(), total);
        Ok(records)
    }

    /// Derive per-record metrics
    pub fn derive(&self, records: &[FunctionRecord]) -> AnalyticsResult<DerivedTable> {
        let start = Instant::now();
        let result = MetricDeriver::new(self.config.cost_epsilon).derive(records);
        self.finish("derive", records.len(), start, &result);
        if result.is_ok() {
            self.metrics.set_records_analyzed(records.len());
        }
        result
    }

    pub fn pareto(&self, records: &[FunctionRecord]) -> AnalyticsResult<ParetoReport> {
        let table = self.derive(records)?;
        self.pareto_on(&table)
    }

    pub fn right_sizing(&self, records: &[FunctionRecord]) -> AnalyticsResult<RightSizingReport> {
        let table = self.derive(records)?;
        self.right_sizing_on(&table)
    }

    pub fn concurrency(&self, records: &[FunctionRecord]) -> AnalyticsResult<ConcurrencyReport> {
        let table = self.derive(records)?;
        self.concurrency_on(&table)
    }

    pub fn low_value(&self, records: &[FunctionRecord]) -> AnalyticsResult<LowValueReport> {
        let table = self.derive(records)?;
        self.low_value_on(&table)
    }

    pub fn backtest(&self, records: &[FunctionRecord]) -> AnalyticsResult<BacktestReport> {
        let table = self.derive(records)?;
        self.backtest_on(&table)
    }

    /// Project cost under a scenario. Scenario bounds are not checked here.
    pub fn forecast(
        &self,
        records: &[FunctionRecord],
        scenario: Scenario,
    ) -> AnalyticsResult<ForecastReport> {
        let table = self.derive(records)?;
        let forecaster = Forecaster::new(self.config.pricing.clone(), scenario);
        let report = self.run_stage(&forecaster, &table)?;
        self.logger.log_forecast(
            scenario.invocation_growth_pct,
            scenario.memory_change_pct,
            scenario.duration_change_pct,
            report.forecast_total_usd,
        );
        Ok(report)
    }

    pub fn containerization(
        &self,
        records: &[FunctionRecord],
    ) -> AnalyticsResult<ContainerizationReport> {
        let table = self.derive(records)?;
        self.containerization_on(&table)
    }

    pub fn overview(&self, records: &[FunctionRecord]) -> AnalyticsResult<Overview> {
        let table = self.derive(records)?;
        Ok(Overview::from_table(&table))
    }

    /// Run every stage over one derived table and condense the findings
    pub fn executive_summary(
        &self,
        records: &[FunctionRecord],
        generated_at: DateTime<Utc>,
    ) -> AnalyticsResult<ExecutiveSummary> {
        let table = self.derive(records)?;
        let overview = Overview::from_table(&table);
        let pareto = self.pareto_on(&table)?;
        let right_sizing = self.right_sizing_on(&table)?;
        let concurrency = self.concurrency_on(&table)?;
        let low_value = self.low_value_on(&table)?;
        let containerization = self.containerization_on(&table)?;
        let backtest = self.backtest_on(&table)?;

        Ok(ExecutiveSummary::build(
            SummaryInputs {
                overview: &overview,
                pareto: &pareto,
                right_sizing: &right_sizing,
                concurrency: &concurrency,
                low_value: &low_value,
                containerization: &containerization,
                backtest: &backtest,
            },
            generated_at,
        ))
    }

    /// Base records joined with their derived metrics, model estimate and score
    pub fn export_rows(&self, records: &[FunctionRecord]) -> AnalyticsResult<Vec<ExportRow>> {
        let table = self.derive(records)?;
        let backtester = Backtester::new(self.config.pricing.clone());
        let scorer = ContainerizationScorer::new(self.config.containerization.clone());

        Ok(table
            .rows
            .iter()
            .map(|d| {
                let r = &d.record;
                let backtest = backtester.row(r);
                ExportRow {
                    name: r.name.clone(),
                    environment: r.environment,
                    invocations_per_month: r.invocations_per_month,
                    avg_duration_ms: r.avg_duration_ms,
                    memory_mb: r.memory_mb,
                    cold_start_rate: r.cold_start_rate,
                    provisioned_concurrency: r.provisioned_concurrency,
                    gb_seconds: r.gb_seconds,
                    data_transfer_gb: r.data_transfer_gb,
                    cost_usd: r.cost_usd,
                    cost_per_gb_second: d.cost_per_gb_second,
                    memory_efficiency: d.memory_efficiency,
                    memory_score: d.memory_score,
                    invocation_pct: d.invocation_pct,
                    calculated_total_cost: backtest.estimate.total_cost_usd,
                    error_pct: backtest.error_pct,
                    containerization_score: scorer.score(r, &table.stats),
                }
            })
            .collect())
    }

    fn pareto_on(&self, table: &DerivedTable) -> AnalyticsResult<ParetoReport> {
        self.run_stage(&ParetoRanker::new(self.config.pareto.clone()), table)
    }

    fn right_sizing_on(&self, table: &DerivedTable) -> AnalyticsResult<RightSizingReport> {
        let report = self.run_stage(
            &RightSizingScorer::new(self.config.right_sizing.clone()),
            table,
        )?;
        self.record_savings(
            "right_sizing",
            report.recommendations.len(),
            report.projected_savings_usd,
        );
        Ok(report)
    }

    fn concurrency_on(&self, table: &DerivedTable) -> AnalyticsResult<ConcurrencyReport> {
        let report = self.run_stage(
            &ConcurrencyAdvisor::new(self.config.concurrency.clone()),
            table,
        )?;
        self.record_savings(
            "concurrency",
            report.recommendations.len(),
            report.total_savings_usd,
        );
        Ok(report)
    }

    fn low_value_on(&self, table: &DerivedTable) -> AnalyticsResult<LowValueReport> {
        let report = self.run_stage(&LowValueDetector::new(self.config.low_value.clone()), table)?;
        self.record_savings(
            "cleanup",
            report.cleanup_candidates.len(),
            report.cleanup_savings_usd,
        );
        Ok(report)
    }

    fn containerization_on(&self, table: &DerivedTable) -> AnalyticsResult<ContainerizationReport> {
        let report = self.run_stage(
            &ContainerizationScorer::new(self.config.containerization.clone()),
            table,
        )?;
        self.record_savings(
            "containerization",
            report.candidates.len(),
            report.aggregate_savings_usd,
        );
        Ok(report)
    }

    fn backtest_on(&self, table: &DerivedTable) -> AnalyticsResult<BacktestReport> {
        let report = self.run_stage(&Backtester::new(self.config.pricing.clone()), table)?;
        self.logger
            .log_backtest(report.mean_error_pct, report.accuracy_pct);
        Ok(report)
    }

    fn run_stage<A: Analysis>(&self, stage: &A, table: &DerivedTable) -> AnalyticsResult<A::Output> {
        let start = Instant::now();
        let result = stage.run(table);
        self.finish(A::NAME, table.len(), start, &result);
        result
    }

    fn finish<T>(&self, stage: &str, record_count: usize, start: Instant, result: &AnalyticsResult<T>) {
        let elapsed = start.elapsed();
        self.metrics
            .observe_stage(stage, elapsed.as_secs_f64(), result.is_ok());
        match result {
            Ok(_) => self
                .logger
                .log_stage(stage, record_count, elapsed.as_secs_f64() * 1000.0),
            Err(e) => self.logger.log_stage_failed(stage, &e.to_string()),
        }
    }

    fn record_savings(&self, source: &str, candidates: usize, savings_usd: f64) {
        self.metrics.set_potential_savings(source, savings_usd);
        self.logger.log_savings(source, candidates, savings_usd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::models::Environment;

    fn record(name: &str, cost_usd: f64, invocations: u64) -> FunctionRecord {
        FunctionRecord {
            name: name.to_string(),
            environment: Environment::Production,
            invocations_per_month: invocations,
            avg_duration_ms: 200.0,
            memory_mb: 512,
            cold_start_rate: 0.02,
            provisioned_concurrency: 0,
            gb_seconds: 10.0,
            data_transfer_gb: 1.0,
            cost_usd,
        }
    }

    #[test]
    fn test_empty_input_fails_every_stage() {
        let analyzer = CostAnalyzer::new();
        assert!(matches!(
            analyzer.pareto(&[]),
            Err(AnalyticsError::EmptyInput { .. })
        ));
        assert!(analyzer.overview(&[]).is_err());
        assert!(analyzer.executive_summary(&[], Utc::now()).is_err());
    }

    #[test]
    fn test_stage_runs_are_counted() {
        let analyzer = CostAnalyzer::new();
        let before = AnalyticsMetrics::new().stage_runs("pareto", true);
        analyzer
            .pareto(&[record("a", 3.0, 10), record("b", 1.0, 10)])
            .unwrap();
        assert!(AnalyticsMetrics::new().stage_runs("pareto", true) > before);
    }

    #[test]
    fn test_export_rows_follow_input_order() {
        let analyzer = CostAnalyzer::new();
        let rows = analyzer
            .export_rows(&[record("a", 3.0, 10), record("b", 0.0, 30)])
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "a");
        assert!(rows[0].error_pct.is_some());
        assert!(rows[1].error_pct.is_none());
        assert_eq!(rows[1].invocation_pct, 75.0);
    }

    #[test]
    fn test_export_rows_agree_with_backtest() {
        let analyzer = CostAnalyzer::new();
        let records = [record("a", 3.0, 10), record("b", 5.0, 30)];
        let rows = analyzer.export_rows(&records).unwrap();
        let backtest = analyzer.backtest(&records).unwrap();
        for (row, tested) in rows.iter().zip(&backtest.rows) {
            assert_eq!(row.calculated_total_cost, tested.estimate.total_cost_usd);
            assert_eq!(row.error_pct, tested.error_pct);
        }
    }

    #[test]
    fn test_summary_combines_stage_savings() {
        let analyzer = CostAnalyzer::new();
        let records = [record("a", 30.0, 100), record("b", 10.0, 200)];
        let summary = analyzer.executive_summary(&records, Utc::now()).unwrap();

        let conservative = summary.right_sizing_savings_usd
            + summary.cleanup_savings_usd
            + summary.concurrency_savings_usd;
        assert!((summary.conservative.monthly_usd - conservative).abs() < 1e-9);
        assert!(
            (summary.aggressive.monthly_usd
                - (conservative + summary.containerization_savings_usd))
                .abs()
                < 1e-9
        );
        assert_eq!(summary.baseline_cost_usd, 40.0);
    }

    #[test]
    fn test_load_defaults_to_embedded_table() {
        let records = CostAnalyzer::new().load(None).unwrap();
        assert_eq!(records.len(), 95);
    }
}
