//! CLI command implementations

pub mod costs;
pub mod debug;
pub mod recommendations;

use cost_lib::{CostAnalyzer, FunctionRecord};

use crate::output::OutputFormat;

/// Everything a command needs: the configured engine and the loaded table
pub struct Context {
    pub analyzer: CostAnalyzer,
    pub records: Vec<FunctionRecord>,
    pub format: OutputFormat,
}
