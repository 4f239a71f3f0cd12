//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::client::Listing;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Prints a report listing as a table of `row`s or as the raw JSON answer
pub fn print_listing<T, R, F>(listing: &Listing<T>, format: OutputFormat, row: F) -> anyhow::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(listing)?);
        }
        OutputFormat::Table => {
            let items = listing.items();
            if items.is_empty() {
                print_warning("No items found");
                return Ok(());
            }
            let rows: Vec<R> = items.iter().map(row).collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            match listing.metadata() {
                Some(meta) => println!(
                    "\nPage {} of {} ({} total)",
                    meta.number, meta.total_pages, meta.total_elements
                ),
                None => println!("\nTotal: {}", items.len()),
            }
        }
    }
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Color an alert severity
pub fn color_severity(severity: &str) -> String {
    match severity {
        "CRITICAL" => severity.red().bold().to_string(),
        "WARNING" => severity.yellow().to_string(),
        "INFO" => severity.blue().to_string(),
        _ => severity.to_string(),
    }
}

/// Color a patch or alert status
pub fn color_status(status: &str) -> String {
    match status {
        "OK" | "ACK" => status.green().to_string(),
        "KO" => status.red().to_string(),
        "NEW" => status.yellow().to_string(),
        "DISMISSED" => status.dimmed().to_string(),
        _ => status.to_string(),
    }
}

/// Shortens an RFC 3339 timestamp to date and time
pub fn format_timestamp(ts: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => ts.to_string(),
    }
}

pub fn format_list(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}
