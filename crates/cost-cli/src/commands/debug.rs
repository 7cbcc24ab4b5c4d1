//! Debug and troubleshooting CLI commands

use anyhow::{Context as _, Result};
use chrono::Utc;
use cost_lib::dataset;
use cost_lib::{gather_text, Environment, Scenario};
use std::fs::File;
use std::io;
use std::path::PathBuf;

use super::Context;
use crate::output::{print_json, print_success, print_warning, OutputFormat};

/// Export the table with derived metrics
pub fn export(
    ctx: &Context,
    output: Option<PathBuf>,
    environment: Option<Environment>,
) -> Result<()> {
    let rows: Vec<_> = ctx
        .analyzer
        .export_rows(&ctx.records)?
        .into_iter()
        .filter(|r| environment.map(|env| r.environment == env).unwrap_or(true))
        .collect();

    if rows.is_empty() {
        print_warning("No functions match the filter");
        return Ok(());
    }

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            dataset::write_csv(file, &rows)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_success(&format!(
                "Exported {} functions to {}",
                rows.len(),
                path.display()
            ));
        }
        None => match ctx.format {
            OutputFormat::Json => print_json(&rows)?,
            OutputFormat::Table => {
                dataset::write_csv(io::stdout().lock(), &rows).context("Failed to write CSV")?
            }
        },
    }

    Ok(())
}

/// Run every analysis, then print the metrics they recorded
pub fn metrics(ctx: &Context) -> Result<()> {
    ctx.analyzer
        .executive_summary(&ctx.records, Utc::now())
        .context("Failed to run analyses")?;
    ctx.analyzer
        .forecast(&ctx.records, Scenario::default())
        .context("Failed to run forecast")?;

    print!("{}", gather_text()?);
    Ok(())
}
