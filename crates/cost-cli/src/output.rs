//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Log line format on stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as a rounded table, or a notice if there are none
pub fn print_table<T: Tabled>(rows: Vec<T>, empty_message: &str) {
    if rows.is_empty() {
        print_warning(empty_message);
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a section heading with an underline
pub fn print_heading(title: &str, width: usize) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(width));
}

/// Print a subsection heading
pub fn print_subheading(title: &str, width: usize) {
    println!("{}", title.bold());
    println!("{}", "-".repeat(width));
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a USD amount
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${:.2}", amount)
    }
}

pub fn format_pct(pct: f64) -> String {
    format!("{:.1}%", pct)
}

/// Format a signed change, green for decreases and red for increases
pub fn color_change(amount: f64) -> String {
    let formatted = if amount >= 0.0 {
        format!("+{}", format_currency(amount))
    } else {
        format_currency(amount)
    };
    if amount > 0.0 {
        formatted.red().to_string()
    } else if amount < 0.0 {
        formatted.green().to_string()
    } else {
        formatted
    }
}

/// Format a cold start rate as a percentage, colored by severity
pub fn color_cold_start(rate: f64, low: f64, high: f64) -> String {
    let formatted = format!("{:.2}%", rate * 100.0);
    if rate < low {
        formatted.green().to_string()
    } else if rate > high {
        formatted.red().to_string()
    } else {
        formatted.yellow().to_string()
    }
}

/// Color a containerization score against the candidate threshold
pub fn color_score(score: u8, candidate_score: u8) -> String {
    let formatted = format!("{}/7", score);
    if score >= candidate_score + 2 {
        formatted.green().bold().to_string()
    } else if score >= candidate_score {
        formatted.green().to_string()
    } else {
        formatted.dimmed().to_string()
    }
}

/// Format a large count with thousands separators
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(3088.6), "$3088.60");
        assert_eq!(format_currency(-1.5), "-$1.50");
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(55_298_510), "55,298,510");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(79.628), "79.6%");
    }
}
