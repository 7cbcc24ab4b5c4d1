//! Record table loading and export
//!
//! The reference table is compiled into the library and parsed once per
//! process. Alternative tables can be loaded from any CSV source with the
//! same header row.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::debug;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{Environment, FunctionRecord};

/// Reference billing table shipped with the library
pub const REFERENCE_CSV: &str = include_str!("../data/functions.csv");

/// Parsed reference table, cached for the process lifetime
static REFERENCE_TABLE: OnceLock<Vec<FunctionRecord>> = OnceLock::new();

/// Get the embedded reference table, parsing it on first use
pub fn reference_table() -> AnalyticsResult<&'static [FunctionRecord]> {
    if let Some(table) = REFERENCE_TABLE.get() {
        return Ok(table);
    }
    let parsed = load_csv(REFERENCE_CSV.as_bytes())?;
    Ok(REFERENCE_TABLE.get_or_init(|| parsed))
}

/// Load and validate records from a CSV reader
pub fn load_csv<R: Read>(reader: R) -> AnalyticsResult<Vec<FunctionRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for (idx, result) in rdr.deserialize::<FunctionRecord>().enumerate() {
        let row = idx + 1;
        let record = result?;
        validate(&record, row)?;

        if !seen.insert((record.name.clone(), record.environment)) {
            return Err(AnalyticsError::InvalidRecord {
                row,
                reason: format!(
                    "duplicate function {} in {}",
                    record.name, record.environment
                ),
            });
        }
        records.push(record);
    }

    debug!(records = records.len(), "Loaded function records");
    Ok(records)
}

/// Load and validate records from a CSV file
pub fn load_path(path: impl AsRef<Path>) -> AnalyticsResult<Vec<FunctionRecord>> {
    let file = std::fs::File::open(path)?;
    load_csv(file)
}

fn validate(record: &FunctionRecord, row: usize) -> AnalyticsResult<()> {
    let invalid = |reason: String| AnalyticsError::InvalidRecord { row, reason };

    if record.name.is_empty() {
        return Err(invalid("function name is empty".to_string()));
    }
    if !(record.avg_duration_ms.is_finite() && record.avg_duration_ms > 0.0) {
        return Err(invalid(format!(
            "average duration must be positive, got {}",
            record.avg_duration_ms
        )));
    }
    if record.memory_mb == 0 {
        return Err(invalid("memory allocation must be positive".to_string()));
    }
    if !(0.0..=1.0).contains(&record.cold_start_rate) {
        return Err(invalid(format!(
            "cold start rate must be within [0, 1], got {}",
            record.cold_start_rate
        )));
    }
    for (field, value) in [
        ("GB-seconds", record.gb_seconds),
        ("data transfer", record.data_transfer_gb),
        ("cost", record.cost_usd),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(invalid(format!("{} must be non-negative, got {}", field, value)));
        }
    }
    Ok(())
}

/// One exported row: base fields followed by derived metrics
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
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
    #[serde(rename = "CostUSD")]
    pub cost_usd: f64,
    #[serde(rename = "CostPerGBSecond")]
    pub cost_per_gb_second: f64,
    #[serde(rename = "MemoryEfficiency")]
    pub memory_efficiency: f64,
    #[serde(rename = "MemoryScore")]
    pub memory_score: f64,
    #[serde(rename = "InvocationPct")]
    pub invocation_pct: f64,
    #[serde(rename = "CalculatedTotalCost")]
    pub calculated_total_cost: f64,
    #[serde(rename = "ErrorPct")]
    pub error_pct: Option<f64>,
    #[serde(rename = "ContainerizationScore")]
    pub containerization_score: u8,
}

/// Write exported rows as CSV with a header row
pub fn write_csv<W: Write>(writer: W, rows: &[ExportRow]) -> AnalyticsResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
