//! Server configuration

use anyhow::Result;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;

/// Names an optional configuration file read before the environment
pub const CONFIG_FILE_VAR: &str = "INVENTORY_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,

    #[serde(default = "default_database_name")]
    pub database_name: String,

    /// Rejects every write with 403 when set
    #[serde(default)]
    pub read_only: bool,

    /// Reported in structured log events
    #[serde(default = "default_node_name")]
    pub node_name: String,
}

fn default_port() -> u16 {
    11113
}

fn default_mongodb_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database_name() -> String {
    "ercole".to_string()
}

fn default_node_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            mongodb_uri: default_mongodb_uri(),
            database_name: default_database_name(),
            read_only: false,
            node_name: default_node_name(),
        }
    }
}

impl ServerConfig {
    /// Loads `$INVENTORY_CONFIG` when set, then `INVENTORY_*` variables
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Ok(path) = std::env::var(CONFIG_FILE_VAR) {
            builder = builder.add_source(config::File::with_name(&path));
        }
        Self::from_builder(
            builder.add_source(config::Environment::with_prefix("INVENTORY").try_parsing(true)),
        )
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        Ok(builder.build()?.try_deserialize()?)
    }
}
