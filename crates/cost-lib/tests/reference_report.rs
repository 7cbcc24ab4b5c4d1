//! Integration tests against the embedded reference table

use chrono::Utc;
use cost_lib::analysis::PcAction;
use cost_lib::dataset::{self, reference_table};
use cost_lib::{CostAnalyzer, Environment, FunctionRecord, Scenario};

fn approx(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} +/- {tolerance}, got {actual}"
    );
}

fn records() -> Vec<FunctionRecord> {
    reference_table().unwrap().to_vec()
}

#[test]
fn test_overview() {
    let overview = CostAnalyzer::new().overview(&records()).unwrap();

    assert_eq!(overview.function_count, 95);
    approx(overview.total_cost_usd, 3088.60, 1e-6);
    approx(overview.mean_cost_usd, 32.5116, 1e-4);
    approx(overview.production_cost_usd, 2723.30, 1e-6);
    assert_eq!(overview.total_invocations, 55_298_510);

    let envs: Vec<_> = overview.by_environment.iter().map(|e| e.environment).collect();
    assert_eq!(
        envs,
        vec![Environment::Production, Environment::Development, Environment::Staging]
    );
    assert_eq!(overview.by_environment[0].function_count, 52);
    approx(overview.by_environment[2].cost_usd, 111.90, 1e-6);
}

#[test]
fn test_pareto_top_set() {
    let report = CostAnalyzer::new().pareto(&records()).unwrap();

    assert_eq!(report.rows.len(), 95);
    assert_eq!(report.top_count, 35);
    approx(report.top_cost_usd, 2459.40, 1e-6);
    approx(report.top_share_pct, 79.628, 1e-3);

    let leaders: Vec<_> = report.rows[..5].iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        leaders,
        vec![
            "recommendation-preloader-prod",
            "cart-recommender-prod",
            "session-enrichment-prod",
            "content-moderation-prod",
            "alerts-engine-prod",
        ]
    );
    assert_eq!(report.rows[94].cumulative_pct, 100.0);
}

#[test]
fn test_right_sizing() {
    let report = CostAnalyzer::new().right_sizing(&records()).unwrap();

    let names: Vec<_> = report
        .over_provisioned
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "recommendation-preloader-prod",
            "cart-recommender-prod",
            "document-tagging-ml-prod",
            "fraud-detection-ml",
            "cart-recommender-staging",
            "recommendation-preloader-dev",
            "document-tagging-ml-dev",
        ]
    );
    approx(report.rough_potential_savings_usd, 94.68, 1e-6);
    approx(report.projected_savings_usd, 126.24, 1e-6);
}

#[test]
fn test_provisioned_concurrency() {
    let report = CostAnalyzer::new().concurrency(&records()).unwrap();

    assert_eq!(report.functions_with_pc, 29);
    assert_eq!(report.total_pc_units, 68);
    approx(report.pc_functions_cost_usd, 2070.10, 1e-6);
    approx(report.avg_cold_start_rate_with_pc.unwrap(), 0.0106897, 1e-6);

    assert_eq!(report.recommendations.len(), 15);
    assert!(report
        .recommendations
        .iter()
        .all(|r| matches!(r.action, PcAction::ReducePc { .. })));
    approx(report.total_savings_usd, 95.21, 1e-6);
}

#[test]
fn test_low_value_and_cleanup() {
    let report = CostAnalyzer::new().low_value(&records()).unwrap();

    assert_eq!(report.median_cost_usd, 16.5);
    assert_eq!(report.low_value.len(), 27);
    approx(report.low_value_cost_usd, 1198.10, 1e-6);
    assert_eq!(report.very_low_usage.len(), 35);

    assert_eq!(report.cleanup_candidates.len(), 10);
    assert_eq!(report.cleanup_candidates[0].name, "document-tagging-ml-dev");
    assert_eq!(report.cleanup_candidates[1].name, "forecasting-engine-staging");
    assert!(report
        .cleanup_candidates
        .iter()
        .all(|c| c.environment != Environment::Production));
    approx(report.cleanup_savings_usd, 96.60, 1e-6);
}

#[test]
fn test_backtest_and_forecast() {
    let analyzer = CostAnalyzer::new();
    let records = records();

    let backtest = analyzer.backtest(&records).unwrap();
    approx(backtest.mean_error_pct, 75.061, 1e-3);
    approx(backtest.accuracy_pct, 24.939, 1e-3);
    approx(backtest.predicted_total_cost_usd, 652.526, 1e-3);
    approx(backtest.predicted_transfer_cost_usd, 316.62, 1e-6);
    approx(backtest.rows[0].estimate.total_cost_usd, 8.5875, 1e-4);

    let baseline = analyzer.forecast(&records, Scenario::default()).unwrap();
    approx(
        baseline.forecast_total_usd,
        backtest.predicted_total_cost_usd,
        1e-9,
    );

    let growth = analyzer
        .forecast(&records, Scenario::new(20.0, 0.0, 0.0))
        .unwrap();
    approx(growth.forecast_total_usd, 719.708, 1e-3);
    approx(growth.current_total_usd, 3088.60, 1e-6);
}

#[test]
fn test_containerization() {
    let report = CostAnalyzer::new().containerization(&records()).unwrap();

    assert_eq!(report.candidates.len(), 25);
    let leaders: Vec<_> = report.candidates[..3]
        .iter()
        .map(|c| (c.name.as_str(), c.score))
        .collect();
    assert_eq!(
        leaders,
        vec![
            ("policy-document-parser-prod", 7),
            ("policy-document-parser-dev", 6),
            ("etl-transform-daily", 6),
        ]
    );
    approx(report.candidates_cost_usd, 471.70, 1e-6);
    approx(report.aggregate_savings_usd, 117.925, 1e-6);
    approx(report.comparison_savings_usd, 36.24, 1e-6);
    assert_eq!(report.scores.iter().filter(|s| s.score == 1).count(), 50);
}

#[test]
fn test_executive_summary() {
    let summary = CostAnalyzer::new()
        .executive_summary(&records(), Utc::now())
        .unwrap();

    assert_eq!(summary.function_count, 95);
    assert_eq!(summary.top_cost_count, 35);
    approx(summary.conservative.monthly_usd, 318.05, 1e-6);
    approx(summary.conservative.annual_usd, 3816.60, 1e-6);
    approx(summary.aggressive.monthly_usd, 435.975, 1e-6);
    approx(summary.conservative.pct_of_baseline.unwrap(), 10.2975, 1e-4);
}

#[test]
fn test_export_writes_every_row() {
    let rows = CostAnalyzer::new().export_rows(&records()).unwrap();
    let mut out = Vec::new();
    dataset::write_csv(&mut out, &rows).unwrap();

    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("FunctionName,Environment,"));
    assert!(header.ends_with("CalculatedTotalCost,ErrorPct,ContainerizationScore"));
    assert_eq!(lines.count(), 95);
}
