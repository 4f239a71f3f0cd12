//! Subcommand implementations

pub mod alerts;
pub mod export;
pub mod hosts;
pub mod reports;

use clap::Args;

use crate::config::Config;

/// Filters shared by every report
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Comma separated locations
    #[arg(long, short)]
    pub location: Option<String>,

    #[arg(long, short)]
    pub environment: Option<String>,

    /// Report the inventory as it was at this RFC 3339 time
    #[arg(long)]
    pub older_than: Option<String>,

    /// Whitespace separated keywords
    #[arg(long, short)]
    pub search: Option<String>,

    #[arg(long)]
    pub sort_by: Option<String>,

    #[arg(long)]
    pub sort_desc: bool,

    /// Page number, starting at 1
    #[arg(long, requires = "size")]
    pub page: Option<u32>,

    /// Page size
    #[arg(long, requires = "page")]
    pub size: Option<u32>,
}

impl FilterArgs {
    /// Query parameters, completed with the configured defaults
    pub fn to_query(&self, config: &Config) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        let location = self.location.clone().or_else(|| config.default_location.clone());
        let environment = self
            .environment
            .clone()
            .or_else(|| config.default_environment.clone());

        push(&mut query, "location", location);
        push(&mut query, "environment", environment);
        push(&mut query, "older-than", self.older_than.clone());
        push(&mut query, "search", self.search.clone());
        push(&mut query, "sort-by", self.sort_by.clone());
        if self.sort_desc {
            query.push(("sort-desc", "true".to_string()));
        }
        push(&mut query, "page", self.page.map(|p| p.to_string()));
        push(&mut query, "size", self.size.map(|s| s.to_string()));
        query
    }
}

pub(crate) fn push(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(value) = value {
        query.push((key, value));
    }
}
