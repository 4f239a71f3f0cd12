//! Alert status commands

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};

use crate::client::{AlertsSelection, ApiClient, UpdatedAlerts};
use crate::output::{print_success, print_warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlertAction {
    Ack,
    Dismiss,
}

impl AlertAction {
    fn path(&self) -> &'static str {
        match self {
            Self::Ack => "alerts/ack",
            Self::Dismiss => "alerts/dismiss",
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            Self::Ack => "acknowledged",
            Self::Dismiss => "dismissed",
        }
    }
}

/// Which alerts to update; at least one criterion is required
#[derive(Debug, Clone, Default, Args)]
pub struct SelectionArgs {
    /// Comma separated alert ids
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,

    #[arg(long)]
    pub code: Option<String>,

    /// INFO, WARNING or CRITICAL
    #[arg(long)]
    pub severity: Option<String>,

    /// Comma separated hostnames
    #[arg(long, value_delimiter = ',')]
    pub hostnames: Vec<String>,
}

impl SelectionArgs {
    pub fn into_selection(self) -> Result<AlertsSelection> {
        let selection = AlertsSelection {
            ids: self.ids,
            alert_code: self.code,
            alert_severity: self.severity,
            hostnames: self.hostnames,
        };
        if selection.ids.is_empty()
            && selection.alert_code.is_none()
            && selection.alert_severity.is_none()
            && selection.hostnames.is_empty()
        {
            bail!("Select alerts with --ids, --code, --severity or --hostnames");
        }
        Ok(selection)
    }
}

pub async fn update_alerts(
    client: &ApiClient,
    action: AlertAction,
    selection: SelectionArgs,
) -> Result<u64> {
    let selection = selection.into_selection()?;
    let result: UpdatedAlerts = client.post(action.path(), &selection).await?;

    if result.updated == 0 {
        print_warning("No alert matched the selection");
    } else {
        print_success(&format!("{} alerts {}", result.updated, action.past_tense()));
    }
    Ok(result.updated)
}
