//! Engine configuration
//!
//! Every coefficient and threshold used by the analyses lives here so the
//! model can be recalibrated without touching the analysis code. All
//! sections deserialize with defaults, so a partial config file only needs
//! to name the values it overrides.

use serde::{Deserialize, Serialize};

/// Compute price per GB-second of billed execution
pub const COMPUTE_PRICE_PER_GB_SECOND: f64 = 0.0000166667;

/// Data transfer price per GB
pub const TRANSFER_PRICE_PER_GB: f64 = 0.09;

/// Additive guard on the GB-seconds denominator of `cost_per_gb_second`
pub const COST_EPSILON: f64 = 0.01;

/// Cumulative cost share bounding the Pareto top set
pub const PARETO_THRESHOLD_PCT: f64 = 80.0;

/// Memory score above which a function counts as over-provisioned
pub const MEMORY_SCORE_THRESHOLD: f64 = 0.5;

/// Fraction of current memory kept by a right-sizing recommendation
pub const MEMORY_REDUCTION_FACTOR: f64 = 0.8;

/// Cold start rate below which provisioned concurrency is considered excessive
pub const COLD_START_LOW: f64 = 0.01;

/// Cold start rate above which provisioned concurrency is considered insufficient
pub const COLD_START_HIGH: f64 = 0.05;

/// Candidate score at or above which a function is a containerization candidate
pub const CONTAINER_CANDIDATE_SCORE: u8 = 4;

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Epsilon added to GB-seconds before dividing cost by it
    pub cost_epsilon: f64,
    pub pricing: PricingConfig,
    pub pareto: ParetoConfig,
    pub right_sizing: RightSizingConfig,
    pub concurrency: ConcurrencyConfig,
    pub low_value: LowValueConfig,
    pub containerization: ContainerizationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cost_epsilon: COST_EPSILON,
            pricing: PricingConfig::default(),
            pareto: ParetoConfig::default(),
            right_sizing: RightSizingConfig::default(),
            concurrency: ConcurrencyConfig::default(),
            low_value: LowValueConfig::default(),
            containerization: ContainerizationConfig::default(),
        }
    }
}

/// Unit prices used by the forecast model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub compute_price_per_gb_second: f64,
    pub transfer_price_per_gb: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            compute_price_per_gb_second: COMPUTE_PRICE_PER_GB_SECOND,
            transfer_price_per_gb: TRANSFER_PRICE_PER_GB,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParetoConfig {
    /// Inclusive upper bound on the cumulative share of the top set
    pub threshold_pct: f64,
}

impl Default for ParetoConfig {
    fn default() -> Self {
        Self {
            threshold_pct: PARETO_THRESHOLD_PCT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RightSizingConfig {
    pub memory_score_threshold: f64,
    /// New memory as a fraction of the current allocation
    pub memory_reduction_factor: f64,
    /// Flat rate applied to the total over-provisioned cost for the rough estimate
    pub rough_savings_rate: f64,
    /// Number of recommendation rows to project
    pub max_recommendations: usize,
}

impl Default for RightSizingConfig {
    fn default() -> Self {
        Self {
            memory_score_threshold: MEMORY_SCORE_THRESHOLD,
            memory_reduction_factor: MEMORY_REDUCTION_FACTOR,
            rough_savings_rate: 0.15,
            max_recommendations: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Strictly below this rate the advice is to reduce
    pub low_cold_start_rate: f64,
    /// Strictly above this rate the advice is to increase
    pub high_cold_start_rate: f64,
    /// Share of cost saved by reducing provisioned concurrency
    pub reduce_savings_rate: f64,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            low_cold_start_rate: COLD_START_LOW,
            high_cold_start_rate: COLD_START_HIGH,
            reduce_savings_rate: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowValueConfig {
    /// Invocation share (percent) below which a costly function is low-value
    pub invocation_pct_threshold: f64,
    /// Invocation share (percent) below which a function is very-low-usage
    pub very_low_invocation_pct: f64,
    /// Number of cleanup candidates summed for the savings estimate
    pub cleanup_limit: usize,
}

impl Default for LowValueConfig {
    fn default() -> Self {
        Self {
            invocation_pct_threshold: 1.0,
            very_low_invocation_pct: 0.1,
            cleanup_limit: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerizationConfig {
    pub long_duration_ms: f64,
    pub high_memory_mb: u32,
    pub candidate_score: u8,
    /// Alternative hosting cost as a fraction of the current function cost
    pub alternative_cost_factor: f64,
    /// Flat rate applied to total candidate cost for the aggregate estimate
    pub aggregate_savings_rate: f64,
    /// Number of top candidates priced individually
    pub comparison_limit: usize,
}

impl Default for ContainerizationConfig {
    fn default() -> Self {
        Self {
            long_duration_ms: 3000.0,
            high_memory_mb: 2048,
            candidate_score: CONTAINER_CANDIDATE_SCORE,
            alternative_cost_factor: 0.7,
            aggregate_savings_rate: 0.25,
            comparison_limit: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r#"{ "pricing": { "transfer_price_per_gb": 0.08 }, "cost_epsilon": 0.5 }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.pricing.transfer_price_per_gb, 0.08);
        assert_eq!(
            config.pricing.compute_price_per_gb_second,
            COMPUTE_PRICE_PER_GB_SECOND
        );
        assert_eq!(config.cost_epsilon, 0.5);
        assert_eq!(config.pareto, ParetoConfig::default());
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
