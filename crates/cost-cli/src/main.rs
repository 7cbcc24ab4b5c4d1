//! Serverless cost analytics CLI
//!
//! A command-line tool for exploring a monthly billing table of serverless
//! functions: where the money goes, what can be trimmed, and what a change
//! in traffic or sizing would cost.

mod commands;
mod config;
mod output;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use commands::{costs, debug, recommendations, Context};
use cost_lib::engine::EMBEDDED_SOURCE;
use cost_lib::{CostAnalyzer, EngineConfig};
use output::{LogFormat, OutputFormat};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Serverless cost analytics CLI
#[derive(Parser)]
#[command(name = "costctl")]
#[command(author, version, about = "Cost analytics for serverless functions", long_about = None)]
pub struct Cli {
    /// Billing table CSV (uses the embedded reference table if not specified)
    #[arg(long, env = "COSTCTL_INPUT", global = true)]
    pub input: Option<PathBuf>,

    /// Engine configuration file (TOML, YAML or JSON)
    #[arg(long, env = "COSTCTL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get optimization recommendations
    #[command(subcommand)]
    Get(GetCommands),

    /// View cost analysis and forecasts
    #[command(subcommand)]
    Costs(CostsCommands),

    /// Debug and troubleshooting commands
    #[command(subcommand)]
    Debug(DebugCommands),
}

#[derive(Subcommand)]
pub enum GetCommands {
    /// Memory right-sizing recommendations
    RightSizing {
        /// Maximum number of per-function recommendations [default: 15]
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Provisioned concurrency recommendations
    Concurrency,

    /// Low-value functions and cleanup candidates
    LowValue {
        /// Maximum number of cleanup candidates [default: 10]
        #[arg(long)]
        cleanup_limit: Option<usize>,
    },

    /// Containerization candidates
    Containers {
        /// Number of candidates priced against container hosting [default: 5]
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum CostsCommands {
    /// Show cost overview by environment
    Show,

    /// Show the functions driving most of the spend
    Pareto {
        /// Number of ranked functions to list
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Back-test the cost model and forecast a scenario
    Forecast {
        /// Invocation growth in percent (-50 to 100, steps of 5)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true, value_parser = parse_growth)]
        invocation_growth: i32,

        /// Memory change in percent (-50 to 50, steps of 5)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true, value_parser = parse_change)]
        memory_change: i32,

        /// Duration change in percent (-50 to 50, steps of 5)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true, value_parser = parse_change)]
        duration_change: i32,
    },

    /// Executive summary of every analysis
    Summary,
}

#[derive(Subcommand)]
pub enum DebugCommands {
    /// Export the table with derived metrics as CSV
    Export {
        /// Output file path (prints to stdout if not specified)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Environment filter
        #[arg(long, short)]
        environment: Option<cost_lib::Environment>,
    },

    /// Run every analysis and print the Prometheus metrics
    Metrics,
}

fn parse_growth(s: &str) -> Result<i32, String> {
    parse_stepped_pct(s, -50, 100)
}

fn parse_change(s: &str) -> Result<i32, String> {
    parse_stepped_pct(s, -50, 50)
}

/// Parse a whole percentage within bounds, in steps of 5
fn parse_stepped_pct(s: &str, min: i32, max: i32) -> Result<i32, String> {
    let value: i32 = s
        .parse()
        .map_err(|_| format!("`{}` is not a whole percentage", s))?;
    if !(min..=max).contains(&value) {
        return Err(format!("must be between {} and {}", min, max));
    }
    if value % 5 != 0 {
        return Err("must be a multiple of 5".to_string());
    }
    Ok(value)
}

/// Apply per-command list limits on top of the loaded configuration
fn apply_limits(engine_config: &mut EngineConfig, command: &Commands) {
    match command {
        Commands::Get(GetCommands::RightSizing { limit: Some(limit) }) => {
            engine_config.right_sizing.max_recommendations = *limit;
        }
        Commands::Get(GetCommands::LowValue {
            cleanup_limit: Some(limit),
        }) => {
            engine_config.low_value.cleanup_limit = *limit;
        }
        Commands::Get(GetCommands::Containers { limit: Some(limit) }) => {
            engine_config.containerization.comparison_limit = *limit;
        }
        _ => {}
    }
}

fn init_tracing(verbose: bool, log_format: LogFormat) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let registry = tracing_subscriber::registry().with(filter);
    match log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    let mut engine_config = config::load(cli.config.as_deref())?;
    apply_limits(&mut engine_config, &cli.command);
    let source = cli
        .input
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| EMBEDDED_SOURCE.to_string());
    let analyzer = CostAnalyzer::with_config(engine_config, source.clone());
    let records = analyzer
        .load(cli.input.as_deref())
        .with_context(|| format!("Failed to load records from {}", source))?;
    info!(records = records.len(), source = %source, "costctl started");

    let ctx = Context {
        analyzer,
        records,
        format: cli.format,
    };

    match cli.command {
        Commands::Get(get_cmd) => match get_cmd {
            GetCommands::RightSizing { .. } => recommendations::right_sizing(&ctx)?,
            GetCommands::Concurrency => recommendations::concurrency(&ctx)?,
            GetCommands::LowValue { .. } => recommendations::low_value(&ctx)?,
            GetCommands::Containers { .. } => recommendations::containers(&ctx)?,
        },
        Commands::Costs(costs_cmd) => match costs_cmd {
            CostsCommands::Show => costs::show(&ctx)?,
            CostsCommands::Pareto { limit } => costs::pareto(&ctx, limit)?,
            CostsCommands::Forecast {
                invocation_growth,
                memory_change,
                duration_change,
            } => costs::forecast(
                &ctx,
                cost_lib::Scenario::new(
                    invocation_growth as f64,
                    memory_change as f64,
                    duration_change as f64,
                ),
            )?,
            CostsCommands::Summary => costs::summary(&ctx)?,
        },
        Commands::Debug(debug_cmd) => match debug_cmd {
            DebugCommands::Export {
                output,
                environment,
            } => debug::export(&ctx, output, environment)?,
            DebugCommands::Metrics => debug::metrics(&ctx)?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_limits_override_config() {
        let cli = Cli::parse_from(["costctl", "get", "low-value", "--cleanup-limit", "3"]);
        let mut engine_config = EngineConfig::default();
        apply_limits(&mut engine_config, &cli.command);
        assert_eq!(engine_config.low_value.cleanup_limit, 3);
        assert_eq!(engine_config.right_sizing.max_recommendations, 15);
    }

    #[test]
    fn test_stepped_pct_bounds() {
        assert_eq!(parse_growth("100"), Ok(100));
        assert_eq!(parse_growth("-50"), Ok(-50));
        assert!(parse_growth("105").is_err());
        assert!(parse_change("55").is_err());
        assert!(parse_change("12").is_err());
        assert!(parse_change("ten").is_err());
    }
}
