//! Core data models for the cost analytics engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deployment environment of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Staging,
    Development,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Development => "development",
        }
    }

    /// Whether functions in this environment may be proposed for deletion
    pub fn is_non_production(&self) -> bool {
        !matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "development" | "dev" => Ok(Environment::Development),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// One billing row per deployed function/environment pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    #[serde(rename = "FunctionName")]
    pub name: String,
    #[serde(rename = "Environment")]
    pub environment: Environment,
    #[serde(rename = "InvocationsPerMonth")]
    pub invocations_per_month: u64,
    #[serde(rename = "AvgDurationMs")]
    pub avg_duration_ms: f64,
    #[serde(rename = "MemoryMB")]
    pub memory_mb: u32,
    #[serde(rename = "ColdStartRate")]
    pub cold_start_rate: f64,
    #[serde(rename = "ProvisionedConcurrency")]
    pub provisioned_concurrency: u32,
    #[serde(rename = "GBSeconds")]
    pub gb_seconds: f64,
    #[serde(rename = "DataTransferGB")]
    pub data_transfer_gb: f64,
    /// Recorded monthly cost, the ground truth every model is compared against
    #[serde(rename = "CostUSD")]
    pub cost_usd: f64,
}

/// What-if parameters for the forecast model.
///
/// Each field is a signed percentage applied multiplicatively
/// (`field * (1 + pct / 100)`). The engine accepts any value; slider
/// bounds belong to whoever collects the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub invocation_growth_pct: f64,
    pub memory_change_pct: f64,
    pub duration_change_pct: f64,
}

impl Scenario {
    pub fn new(invocation_growth_pct: f64, memory_change_pct: f64, duration_change_pct: f64) -> Self {
        Self {
            invocation_growth_pct,
            memory_change_pct,
            duration_change_pct,
        }
    }

    pub fn is_baseline(&self) -> bool {
        self.invocation_growth_pct == 0.0
            && self.memory_change_pct == 0.0
            && self.duration_change_pct == 0.0
    }
}

/// Scale a base value by a signed percentage delta
pub(crate) fn scale_by_pct(value: f64, pct: f64) -> f64 {
    value * (1.0 + pct / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_round_trip_through_str() {
        for env in [
            Environment::Production,
            Environment::Staging,
            Environment::Development,
        ] {
            assert_eq!(env.to_string().parse::<Environment>().unwrap(), env);
        }
        assert_eq!("DEV".parse::<Environment>().unwrap(), Environment::Development);
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_only_production_is_protected() {
        assert!(!Environment::Production.is_non_production());
        assert!(Environment::Staging.is_non_production());
        assert!(Environment::Development.is_non_production());
    }

    #[test]
    fn test_scale_by_pct() {
        assert_eq!(scale_by_pct(200.0, 50.0), 300.0);
        assert_eq!(scale_by_pct(200.0, -50.0), 100.0);
        assert_eq!(scale_by_pct(200.0, 0.0), 200.0);
    }

    #[test]
    fn test_default_scenario_is_baseline() {
        assert!(Scenario::default().is_baseline());
        assert!(!Scenario::new(5.0, 0.0, 0.0).is_baseline());
    }
}
