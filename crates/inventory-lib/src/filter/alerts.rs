use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{FilterError, FilterResult, GlobalFilter, QueryParams, SearchFilter};
use crate::models::{AlertSeverity, AlertStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertsMode {
    #[default]
    All,
    AggregatedCodeSeverity,
}

impl FromStr for AlertsMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "aggregated-code-severity" => Ok(Self::AggregatedCodeSeverity),
            _ => Err(()),
        }
    }
}

/// Parameters of `GET /alerts`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertsSearchFilter {
    pub mode: AlertsMode,
    pub global: GlobalFilter,
    pub search: SearchFilter,
    pub severity: Option<AlertSeverity>,
    pub status: Option<AlertStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl AlertsSearchFilter {
    pub fn parse(params: &QueryParams) -> FilterResult<Self> {
        Ok(Self {
            mode: params
                .choice("mode", "'all' or 'aggregated-code-severity'")?
                .unwrap_or_default(),
            global: GlobalFilter::parse(params)?,
            search: SearchFilter::parse(params)?,
            severity: params.choice("severity", "'INFO', 'WARNING' or 'CRITICAL'")?,
            status: params.choice("status", "'NEW', 'ACK' or 'DISMISSED'")?,
            from: params.time("from")?,
            to: params.time("to")?,
        })
    }
}

/// JSON body of `POST /alerts/ack` and `POST /alerts/dismiss`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertsSelection {
    pub ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_severity: Option<AlertSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_status: Option<AlertStatus>,
    pub hostnames: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<DateTime<Utc>>,
}

impl AlertsSelection {
    pub fn by_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// True when no predicate is set, which would select every alert
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
            && self.alert_category.is_none()
            && self.alert_code.is_none()
            && self.alert_severity.is_none()
            && self.alert_status.is_none()
            && self.hostnames.is_empty()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }

    pub fn object_ids(&self) -> FilterResult<Vec<ObjectId>> {
        self.ids
            .iter()
            .map(|id| {
                ObjectId::parse_str(id).map_err(|_| FilterError::new("ids", id, "an alert id"))
            })
            .collect()
    }
}
