//! Inventory CLI
//!
//! A command-line client for listing inventory reports, downloading
//! spreadsheet exports and managing hosts and alerts.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{alerts, export, hosts, push, reports, FilterArgs};
use std::path::PathBuf;

/// Inventory reporting CLI
#[derive(Parser)]
#[command(name = "inventory")]
#[command(author, version, about = "CLI for the inventory reporting API", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via INVENTORY_API_URL env var)
    #[arg(long, env = "INVENTORY_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List a report
    #[command(subcommand)]
    Get(GetCommands),

    /// Download a report as a spreadsheet
    Export {
        report: export::Report,

        /// Output file path
        #[arg(long, short)]
        output: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Archive a host
    Archive {
        hostname: String,
    },

    /// Acknowledge or dismiss alerts
    Alerts {
        action: alerts::AlertAction,

        #[command(flatten)]
        selection: alerts::SelectionArgs,
    },
}

#[derive(Subcommand)]
pub enum GetCommands {
    /// List hosts
    Hosts {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List ADDM findings
    Addms {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List segment advisor recommendations
    SegmentAdvisors {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List the latest PSU of every database
    PatchAdvisors {
        #[command(flatten)]
        filter: FilterArgs,

        /// Months a PSU may age before being reported as KO
        #[arg(long)]
        window_time: Option<u32>,

        /// OK or KO
        #[arg(long)]
        status: Option<String>,
    },

    /// List clusters
    Clusters {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List alerts
    Alerts {
        #[command(flatten)]
        filter: FilterArgs,

        /// INFO, WARNING or CRITICAL
        #[arg(long)]
        severity: Option<String>,

        /// NEW, ACK or DISMISSED
        #[arg(long)]
        status: Option<String>,

        /// RFC 3339 lower bound
        #[arg(long)]
        from: Option<String>,

        /// RFC 3339 upper bound
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load()?;
    let client = client::ApiClient::new(&config.api_url(cli.api_url))?;
    let format = cli.format;

    let result = match cli.command {
        Commands::Get(get_cmd) => match get_cmd {
            GetCommands::Hosts { filter } => {
                reports::get_hosts(&client, filter.to_query(&config), format).await
            }
            GetCommands::Addms { filter } => {
                reports::get_addms(&client, filter.to_query(&config), format).await
            }
            GetCommands::SegmentAdvisors { filter } => {
                reports::get_segment_advisors(&client, filter.to_query(&config), format).await
            }
            GetCommands::PatchAdvisors {
                filter,
                window_time,
                status,
            } => {
                let mut query = filter.to_query(&config);
                push(&mut query, "window-time", window_time.map(|m| m.to_string()));
                push(&mut query, "status", status);
                reports::get_patch_advisors(&client, query, format).await
            }
            GetCommands::Clusters { filter } => {
                reports::get_clusters(&client, filter.to_query(&config), format).await
            }
            GetCommands::Alerts {
                filter,
                severity,
                status,
                from,
                to,
            } => {
                let mut query = filter.to_query(&config);
                push(&mut query, "severity", severity);
                push(&mut query, "status", status);
                push(&mut query, "from", from);
                push(&mut query, "to", to);
                reports::get_alerts(&client, query, format).await
            }
        },
        Commands::Export {
            report,
            output,
            filter,
        } => export::export_report(&client, report, filter.to_query(&config), &output).await,
        Commands::Archive { hostname } => hosts::archive_host(&client, &hostname).await,
        Commands::Alerts { action, selection } => {
            alerts::update_alerts(&client, action, selection).await.map(|_| ())
        }
    };

    if let Err(e) = result {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}
