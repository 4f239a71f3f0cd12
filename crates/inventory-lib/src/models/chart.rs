use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Total host cores on a given day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCores {
    pub date: DateTime<Utc>,
    pub cores: i64,
}
