//! Report rows and domain records
//!
//! Rows are flat records whose serialized field names are the report column
//! names. Numbers are already coerced by the query projection, so every
//! field has a fixed type.

mod alert;
mod chart;
mod cloud;
mod cluster;
mod host;
mod oracle;
mod postgresql;

pub use alert::{
    Alert, AlertAggregate, AlertSeverity, AlertStatus, AlertsPage, NO_DATA_ALERT_CODE,
};
pub use chart::HostCores;
pub use cloud::{
    AwsRecommendation, OciProfile, OciProfileRequest, OciRecommendation, ProfileId,
    RecommendationDetail, RecommendationError, UNUSED_LOAD_BALANCER,
};
pub use cluster::{Cluster, VirtualizationNodeStats, Vm};
pub use host::{HostDatabase, HostDocument, HostSummary, LmsRow};
pub use oracle::{
    Addm, PatchAdvisor, PatchStatus, PdbChange, PdbSchema, PdbService, PdbTablespace,
    PluggableDatabase, SegmentAdvisor,
};
pub use postgresql::PostgreSqlInstance;

/// Identity of the authenticated user, set by the authentication layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub username: String,
}

impl Caller {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}
