//! Error types for the cost analytics engine.

use thiserror::Error;

/// Result type alias for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Errors that can occur while loading records or running analyses.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{operation} requires at least one record")]
    EmptyInput { operation: &'static str },

    #[error("total {quantity} is zero, shares are undefined")]
    ZeroTotal { quantity: &'static str },

    #[error("invalid record at row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}
