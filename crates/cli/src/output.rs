//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use evaluator_lib::quantity::round_cpu;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a rounded table
pub fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    println!("{}", Table::new(rows).with(Style::rounded()));
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format megabytes, switching to GB from 1000 MB up
pub fn format_megabytes(megabytes: u64) -> String {
    if megabytes >= 1_000 {
        format!("{:.2} GB", megabytes as f64 / 1_000.0)
    } else {
        format!("{} MB", megabytes)
    }
}

/// Format cores with two decimals, or millicores below one core
pub fn format_cpu(cores: f64) -> String {
    if cores >= 1.0 || cores == 0.0 {
        format!("{:.2}", round_cpu(cores))
    } else {
        format!("{}m", (cores * 1_000.0).round())
    }
}

/// Format a percentage with one decimal
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Yes/no marker; `good` says which answer is the healthy one
pub fn color_flag(value: bool, good: bool) -> String {
    let text = if value { "yes" } else { "no" };
    if value == good {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

/// Color usage based on how full the resource is
pub fn color_usage(percent: f64) -> String {
    let formatted = format_percent(percent);
    if percent >= 90.0 {
        formatted.red().to_string()
    } else if percent >= 70.0 {
        formatted.yellow().to_string()
    } else {
        formatted.green().to_string()
    }
}
