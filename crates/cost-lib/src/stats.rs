//! Column statistics over record tables
//!
//! All helpers fail on empty input instead of returning a silent
//! zero or NaN.

use crate::error::{AnalyticsError, AnalyticsResult};
use std::cmp::Ordering;

/// Largest value of a column
pub fn max(values: &[f64], operation: &'static str) -> AnalyticsResult<f64> {
    values
        .iter()
        .copied()
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .ok_or(AnalyticsError::EmptyInput { operation })
}

/// Arithmetic mean of a column
pub fn mean(values: &[f64], operation: &'static str) -> AnalyticsResult<f64> {
    if values.is_empty() {
        return Err(AnalyticsError::EmptyInput { operation });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of a column, averaging the two middle values for even lengths
pub fn median(values: &[f64], operation: &'static str) -> AnalyticsResult<f64> {
    if values.is_empty() {
        return Err(AnalyticsError::EmptyInput { operation });
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// `part / whole * 100`, or `None` when the whole is zero
pub fn percent_of(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 {
        None
    } else {
        Some(part / whole * 100.0)
    }
}

/// Normalize against a column maximum; a non-positive maximum maps to zero
pub fn normalize(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}
