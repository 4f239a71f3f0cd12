use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One ADDM finding of an Oracle database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Addm {
    pub hostname: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub environment: String,
    pub dbname: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    pub action: String,
    pub benefit: f64,
    pub finding: String,
    pub recommendation: String,
}

/// One segment advisor recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SegmentAdvisor {
    pub hostname: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub environment: String,
    pub dbname: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    pub partition_name: String,
    /// Free text, the agent reports values such as `"<1"`
    pub reclaimable: String,
    pub recommendation: String,
    pub segment_name: String,
    pub segment_owner: String,
    pub segment_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "KO")]
    Ko,
}

impl PatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Ko => "KO",
        }
    }
}

impl FromStr for PatchStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OK" => Ok(Self::Ok),
            "KO" => Ok(Self::Ko),
            _ => Err(()),
        }
    }
}

/// Latest PSU applied to a database and whether it is recent enough
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PatchAdvisor {
    pub hostname: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    pub dbname: String,
    pub dbver: String,
    #[serde(default)]
    pub description: String,
    /// Release date of the latest PSU, absent when none was ever applied
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    pub status: PatchStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdbTablespace {
    pub name: String,
    pub max_size: f64,
    pub total: f64,
    pub used: f64,
    pub used_perc: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdbSchema {
    pub user: String,
    pub total: f64,
    pub tables: f64,
    pub indexes: f64,
    pub lob: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdbService {
    pub name: String,
}

/// A pluggable database together with the host it runs on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluggableDatabase {
    pub hostname: String,
    pub database: String,
    pub name: String,
    pub status: String,
    pub charset: String,
    pub segments_size: f64,
    pub datafile_size: f64,
    pub allocable: f64,
    #[serde(default)]
    pub tablespaces: Vec<PdbTablespace>,
    #[serde(default)]
    pub schemas: Vec<PdbSchema>,
    #[serde(default)]
    pub services: Vec<PdbService>,
}

/// Size snapshot of one pluggable database at a host upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdbChange {
    pub pdb_name: String,
    pub updated: DateTime<Utc>,
    pub segments_size: f64,
    pub datafile_size: f64,
    pub allocable: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_addm_field_names() {
        let addm: Addm = serde_json::from_value(json!({
            "Hostname": "test-db",
            "Location": "Italy",
            "Environment": "TST",
            "Dbname": "ERCOLE",
            "CreatedAt": "2020-04-15T08:46:58.471Z",
            "Action": "Look at the \"Top SQL Statements\" finding",
            "Benefit": 83.34,
            "Finding": "SQL statements consuming significant database time",
            "Recommendation": "SQL Tuning"
        }))
        .unwrap();

        assert_eq!(addm.benefit, 83.34);
        let back = serde_json::to_value(&addm).unwrap();
        assert_eq!(back["Dbname"], "ERCOLE");
    }

    #[test]
    fn test_segment_advisor_tolerates_missing_host_fields() {
        let advisor: SegmentAdvisor = serde_json::from_value(json!({
            "Hostname": "sparse-db",
            "Dbname": "ERCOLE",
            "PartitionName": "",
            "Reclaimable": "<1",
            "Recommendation": "Perform shrink",
            "SegmentName": "AUD$",
            "SegmentOwner": "SYS",
            "SegmentType": "TABLE"
        }))
        .unwrap();

        assert_eq!(advisor.location, "");
        assert_eq!(advisor.environment, "");
        assert_eq!(advisor.created_at, DateTime::<Utc>::default());
    }

    #[test]
    fn test_patch_advisor_without_psu() {
        let advisor: PatchAdvisor = serde_json::from_value(json!({
            "Hostname": "srv",
            "Location": "Italy",
            "Environment": "PRD",
            "CreatedAt": "2020-04-15T08:46:58Z",
            "Dbname": "DB1",
            "Dbver": "19.0.0.0",
            "Date": null,
            "Status": "KO"
        }))
        .unwrap();

        assert_eq!(advisor.date, None);
        assert_eq!(advisor.description, "");
        assert_eq!(advisor.status, PatchStatus::Ko);
    }
}
