use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Alert code raised when an agent stopped sending data; never acknowledgeable
pub const NO_DATA_ALERT_CODE: &str = "NO_DATA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl FromStr for AlertSeverity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(Self::Info),
            "WARNING" => Ok(Self::Warning),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    New,
    Ack,
    Dismissed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Ack => "ACK",
            Self::Dismissed => "DISMISSED",
        }
    }
}

impl FromStr for AlertStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "ACK" => Ok(Self::Ack),
            "DISMISSED" => Ok(Self::Dismissed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(default)]
    pub alert_affected_technology: Option<String>,
    pub alert_category: String,
    pub alert_code: String,
    pub alert_severity: AlertSeverity,
    pub alert_status: AlertStatus,
    pub date: DateTime<Utc>,
    pub description: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub other_info: serde_json::Value,
}

/// Alerts grouped by code and severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlertAggregate {
    pub code: String,
    pub severity: AlertSeverity,
    pub count: i64,
    pub affected_hosts: i64,
    pub oldest_alert: DateTime<Utc>,
}

/// Result of `GET /alerts`, shaped by the requested mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AlertsPage {
    All(crate::pagination::SearchResult<Alert>),
    Aggregated(crate::pagination::SearchResult<AlertAggregate>),
}

impl Default for AlertsPage {
    fn default() -> Self {
        Self::All(Default::default())
    }
}
