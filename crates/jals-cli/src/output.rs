//! Output formatting utilities

use crate::error::CliResult;
use colored::*;
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Print rows as a table, or the serializable `data` as JSON/YAML.
pub fn print_rows<T: Serialize, R: Tabled>(
    data: &T,
    rows: Vec<R>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No results".dimmed());
            } else {
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json | OutputFormat::Yaml => print_single(data, format)?,
    }
    Ok(())
}

/// Print a single item in the specified format
pub fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(data)?);
        }
    }
    Ok(())
}

/// Print a section heading in table mode
pub fn print_heading(title: &str, format: OutputFormat) {
    if format == OutputFormat::Table {
        println!("{}", title.bold().cyan());
        println!("{}", "=".repeat(title.chars().count().max(40)));
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Two-column row for key/value listings
#[derive(Tabled)]
pub struct KeyValueRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl KeyValueRow {
    pub fn new(key: impl Into<String>, value: impl std::fmt::Display) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }
}
