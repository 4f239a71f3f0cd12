use bson::{Bson, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Database running on a host, only projected in full mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostDatabase {
    pub name: String,
    pub version: String,
    pub status: String,
    #[serde(default)]
    pub work: Option<f64>,
}

/// One row of the hosts report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostSummary {
    pub hostname: String,
    pub location: String,
    pub environment: String,
    #[serde(default)]
    pub host_type: String,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub physical_host: Option<String>,
    pub version: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub databases: Vec<String>,
    #[serde(rename = "OS")]
    pub os: String,
    pub kernel: String,
    pub oracle_cluster: bool,
    pub sun_cluster: bool,
    pub veritas_cluster: bool,
    #[serde(rename = "Virtual")]
    pub is_virtual: bool,
    #[serde(rename = "Type")]
    pub hardware_abstraction_technology: String,
    #[serde(rename = "CPUThreads")]
    pub cpu_threads: i64,
    #[serde(rename = "CPUCores")]
    pub cpu_cores: i64,
    pub socket: i64,
    pub mem_total: f64,
    pub swap_total: f64,
    #[serde(rename = "CPUModel")]
    pub cpu_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_details: Option<Vec<HostDatabase>>,
}

/// One row of the Oracle LMS "Database & EBS" sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LmsRow {
    pub physical_server_name: String,
    pub virtual_server_name: String,
    pub virtualization_technology: String,
    #[serde(rename = "DBInstanceName")]
    pub db_instance_name: String,
    pub pluggable_database_name: String,
    pub connect_string: String,
    pub product_version: String,
    pub product_edition: String,
    pub environment: String,
    pub features: String,
    pub rac_node_names: String,
    pub processor_model: String,
    pub processors: i64,
    pub cores_per_processor: i64,
    pub physical_cores: i64,
    pub threads_per_core: i64,
    pub processor_speed: String,
    pub server_purchase_date: String,
    pub operating_system: String,
    pub notes: String,
}

/// A host document exactly as stored
#[derive(Debug, Clone, PartialEq)]
pub struct HostDocument(pub Document);

impl HostDocument {
    pub fn hostname(&self) -> Option<&str> {
        self.0.get_str("hostname").ok()
    }

    /// Plain JSON: dates as RFC3339 strings and object ids as hex strings
    pub fn to_json(&self) -> Value {
        plain_json(&Bson::Document(self.0.clone()))
    }

    /// MongoDB relaxed extended JSON, preserving BSON types
    pub fn to_extended_json(&self) -> Value {
        Bson::Document(self.0.clone()).into_relaxed_extjson()
    }
}

impl Serialize for HostDocument {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn plain_json(value: &Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Int32(n) => Value::from(*n),
        Bson::Int64(n) => Value::from(*n),
        Bson::Double(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::from(dt.timestamp_millis()),
        },
        Bson::Array(items) => Value::Array(items.iter().map(plain_json).collect()),
        Bson::Document(doc) => Value::Object(
            doc.iter()
                .map(|(k, v)| (k.clone(), plain_json(v)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone().into_relaxed_extjson(),
    }
}
