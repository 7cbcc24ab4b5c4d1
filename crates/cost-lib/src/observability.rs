//! Observability for the analytics engine
//!
//! Provides:
//! - Prometheus metrics (stage latency, stage runs, records analyzed, potential savings)
//! - Structured logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter_vec, register_int_gauge,
    Encoder, GaugeVec, HistogramVec, IntCounterVec, IntGauge, TextEncoder,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::error::AnalyticsResult;

/// Histogram buckets for stage latency (in seconds)
const STAGE_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
];

/// Global metrics instance, `None` if registration failed
static GLOBAL_METRICS: OnceLock<Option<AnalyticsMetricsInner>> = OnceLock::new();

struct AnalyticsMetricsInner {
    stage_duration_seconds: HistogramVec,
    stage_runs: IntCounterVec,
    records_analyzed: IntGauge,
    potential_savings_usd: GaugeVec,
}

impl AnalyticsMetricsInner {
    fn register() -> prometheus::Result<Self> {
        Ok(Self {
            stage_duration_seconds: register_histogram_vec!(
                "cost_analytics_stage_duration_seconds",
                "Time spent running one analysis stage",
                &["stage"],
                STAGE_BUCKETS.to_vec()
            )?,
            stage_runs: register_int_counter_vec!(
                "cost_analytics_stage_runs_total",
                "Number of analysis stage runs by outcome",
                &["stage", "outcome"]
            )?,
            records_analyzed: register_int_gauge!(
                "cost_analytics_records_analyzed",
                "Number of function records in the last analyzed table"
            )?,
            potential_savings_usd: register_gauge_vec!(
                "cost_analytics_potential_savings_usd",
                "Most recent monthly savings estimate per source",
                &["source"]
            )?,
        })
    }
}

/// Engine metrics for Prometheus exposition
///
/// A lightweight handle to the global metrics instance. Clones share the
/// same underlying metrics. If registration fails the handle records nothing.
#[derive(Clone)]
pub struct AnalyticsMetrics {
    _private: (),
}

impl Default for AnalyticsMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(|| match AnalyticsMetricsInner::register() {
            Ok(inner) => Some(inner),
            Err(e) => {
                warn!(event = "metrics_unavailable", error = %e, "Failed to register metrics");
                None
            }
        });
        Self { _private: () }
    }

    fn inner(&self) -> Option<&AnalyticsMetricsInner> {
        GLOBAL_METRICS.get().and_then(Option::as_ref)
    }

    /// Record one stage run and its duration
    pub fn observe_stage(&self, stage: &str, duration_secs: f64, success: bool) {
        if let Some(inner) = self.inner() {
            inner
                .stage_duration_seconds
                .with_label_values(&[stage])
                .observe(duration_secs);
            let outcome = if success { "ok" } else { "error" };
            inner.stage_runs.with_label_values(&[stage, outcome]).inc();
        }
    }

    pub fn set_records_analyzed(&self, count: usize) {
        if let Some(inner) = self.inner() {
            inner.records_analyzed.set(count as i64);
        }
    }

    /// Update the savings estimate for one source
    pub fn set_potential_savings(&self, source: &str, usd: f64) {
        if let Some(inner) = self.inner() {
            inner
                .potential_savings_usd
                .with_label_values(&[source])
                .set(usd);
        }
    }

    /// Number of runs recorded for a stage and outcome
    pub fn stage_runs(&self, stage: &str, success: bool) -> u64 {
        let outcome = if success { "ok" } else { "error" };
        self.inner()
            .map(|inner| inner.stage_runs.with_label_values(&[stage, outcome]).get())
            .unwrap_or(0)
    }
}

/// Render every registered metric in the Prometheus text format
pub fn gather_text() -> AnalyticsResult<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Structured logger for analysis events
#[derive(Clone)]
pub struct AnalysisLogger {
    source: String,
}

impl AnalysisLogger {
    /// `source` names the record table, such as a file path or `embedded`
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Log a table load
    pub fn log_loaded(&self, record_count: usize, total_cost_usd: f64) {
        info!(
            event = "records_loaded",
            source = %self.source,
            record_count = record_count,
            total_cost_usd = total_cost_usd,
            "Loaded function records"
        );
    }

    /// Log a completed stage
    pub fn log_stage(&self, stage: &str, record_count: usize, elapsed_ms: f64) {
        debug!(
            event = "stage_completed",
            source = %self.source,
            stage = %stage,
            record_count = record_count,
            elapsed_ms = elapsed_ms,
            "Analysis stage completed"
        );
    }

    /// Log a failed stage
    pub fn log_stage_failed(&self, stage: &str, error: &str) {
        warn!(
            event = "stage_failed",
            source = %self.source,
            stage = %stage,
            error = %error,
            "Analysis stage failed"
        );
    }

    /// Log a savings finding
    pub fn log_savings(&self, savings_source: &str, candidates: usize, savings_usd: f64) {
        info!(
            event = "savings_identified",
            source = %self.source,
            savings_source = %savings_source,
            candidates = candidates,
            savings_usd = savings_usd,
            "Potential savings identified"
        );
    }

    /// Log a forecast run
    pub fn log_forecast(
        &self,
        invocation_growth_pct: f64,
        memory_change_pct: f64,
        duration_change_pct: f64,
        forecast_total_usd: f64,
    ) {
        info!(
            event = "forecast_generated",
            source = %self.source,
            invocation_growth_pct = invocation_growth_pct,
            memory_change_pct = memory_change_pct,
            duration_change_pct = duration_change_pct,
            forecast_total_usd = forecast_total_usd,
            "Generated cost forecast"
        );
    }

    /// Log a back-test whose error is high enough to distrust forecasts
    pub fn log_backtest(&self, mean_error_pct: f64, accuracy_pct: f64) {
        if mean_error_pct > 50.0 {
            warn!(
                event = "backtest_completed",
                source = %self.source,
                mean_error_pct = mean_error_pct,
                accuracy_pct = accuracy_pct,
                "Cost model back-test shows high error"
            );
        } else {
            info!(
                event = "backtest_completed",
                source = %self.source,
                mean_error_pct = mean_error_pct,
                accuracy_pct = accuracy_pct,
                "Cost model back-test completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_handles_share_state() {
        let a = AnalyticsMetrics::new();
        let b = a.clone();
        let before = b.stage_runs("test_stage", true);
        a.observe_stage("test_stage", 0.001, true);
        assert_eq!(b.stage_runs("test_stage", true), before + 1);
    }

    #[test]
    fn test_gather_text_contains_registered_metrics() {
        let metrics = AnalyticsMetrics::new();
        metrics.observe_stage("gather_stage", 0.002, true);
        metrics.set_potential_savings("gather_source", 12.5);
        let text = gather_text().unwrap();
        assert!(text.contains("cost_analytics_stage_duration_seconds"));
        assert!(text.contains("source=\"gather_source\""));
    }

    #[test]
    fn test_logger_keeps_source() {
        let logger = AnalysisLogger::new("embedded");
        assert_eq!(logger.source(), "embedded");
        logger.log_loaded(3, 10.0);
    }
}
