//! Cost analytics for serverless function billing records
//!
//! This crate provides the core functionality for:
//! - Loading and validating monthly per-function billing records
//! - Pareto ranking of cost contributors
//! - Memory right-sizing and provisioned concurrency advice
//! - Low-value workload detection
//! - Cost model back-testing and scenario forecasting
//! - Containerization candidate scoring
//! - Metrics and structured logging for every analysis stage

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod models;
pub mod observability;
pub mod report;
pub mod stats;

pub use config::EngineConfig;
pub use engine::CostAnalyzer;
pub use error::{AnalyticsError, AnalyticsResult};
pub use models::*;
pub use observability::{gather_text, AnalysisLogger, AnalyticsMetrics};
pub use report::{ExecutiveSummary, Overview};
