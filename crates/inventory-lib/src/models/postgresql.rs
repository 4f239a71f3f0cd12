use serde::{Deserialize, Serialize};

/// A PostgreSQL instance discovered on a host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostgreSqlInstance {
    pub hostname: String,
    pub environment: String,
    pub location: String,
    pub name: String,
    pub version: String,
    pub charset: String,
    pub port: i64,
    /// Number of databases served by the instance
    pub databases: i64,
    pub users: i64,
}
