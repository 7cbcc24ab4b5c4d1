//! Cost analyses over a derived record table
//!
//! This module provides:
//! - Metric derivation shared by every analysis
//! - Pareto ranking of cost contributors
//! - Memory right-sizing
//! - Provisioned concurrency advice
//! - Low-value workload detection
//! - Cost back-testing and scenario forecasting
//! - Containerization candidate scoring

mod concurrency;
mod containerization;
mod forecast;
mod low_value;
mod metrics;
mod pareto;
mod right_sizing;


pub use concurrency::{
    ConcurrencyAdvisor, ConcurrencyReport, PcAction, PcComparison, PcRecommendation,
};
pub use containerization::{
    ContainerScore, ContainerizationReport, ContainerizationScorer, HostingComparison,
};
pub use forecast::{
    BacktestReport, BacktestRow, Backtester, CostEstimate, CostModel, EnvironmentForecast,
    ForecastReport, ForecastRow, Forecaster,
};
pub use low_value::{LowValueDetector, LowValueReport, UsageRow};
pub use metrics::{DerivedRecord, DerivedTable, MetricDeriver, TableStats};
pub use pareto::{ParetoRanker, ParetoReport, ParetoRow};
pub use right_sizing::{
    MemoryRecommendation, OverProvisioned, RightSizingReport, RightSizingScorer,
};

use crate::error::AnalyticsResult;

/// A single analysis stage over a derived table
pub trait Analysis {
    /// Result produced by the stage
    type Output;

    /// Stage name used in logs and metric labels
    const NAME: &'static str;

    /// Run the stage against a freshly derived table
    fn run(&self, table: &DerivedTable) -> AnalyticsResult<Self::Output>;
}
