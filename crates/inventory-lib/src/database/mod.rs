//! Data access layer
//!
//! [`Database`] is the seam between the services and the document store.
//! [`MongoDatabase`] implements it with aggregation pipelines; tests use the
//! recording stub from [`crate::testing`].

mod mongo;
mod pipeline;

pub use mongo::MongoDatabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DatabaseError;
use crate::filter::{
    AlertsSearchFilter, AlertsSelection, ClustersFilter, GlobalFilter, HostsFilter,
    PatchAdvisorsQuery, ReportFilter, TimeRange,
};
use crate::models::{
    Addm, AlertStatus, AlertsPage, AwsRecommendation, Caller, Cluster, HostCores, HostDocument,
    HostSummary, LmsRow, OciProfile, OciRecommendation, PatchAdvisor, PdbChange,
    PluggableDatabase, PostgreSqlInstance, ProfileId, SegmentAdvisor,
};
use crate::pagination::SearchResult;

pub type DbResult<T> = Result<T, DatabaseError>;

#[async_trait]
pub trait Database: Send + Sync {
    async fn ping(&self) -> DbResult<()>;

    /// Locations the caller is allowed to see
    async fn allowed_locations(&self, caller: &Caller) -> DbResult<Vec<String>>;

    // Hosts

    async fn search_hosts(&self, filter: &HostsFilter) -> DbResult<SearchResult<HostSummary>>;

    async fn search_hosts_lms(&self, filter: &HostsFilter) -> DbResult<Vec<LmsRow>>;

    async fn search_host_documents(
        &self,
        filter: &HostsFilter,
    ) -> DbResult<SearchResult<HostDocument>>;

    async fn get_host(
        &self,
        hostname: &str,
        older_than: Option<DateTime<Utc>>,
    ) -> DbResult<Option<HostDocument>>;

    /// Returns `false` when no current host has that name
    async fn archive_host(&self, hostname: &str) -> DbResult<bool>;

    async fn list_locations(&self, filter: &GlobalFilter) -> DbResult<Vec<String>>;

    async fn list_environments(&self, filter: &GlobalFilter) -> DbResult<Vec<String>>;

    // Oracle

    async fn search_addms(&self, filter: &ReportFilter) -> DbResult<SearchResult<Addm>>;

    async fn search_segment_advisors(
        &self,
        filter: &ReportFilter,
    ) -> DbResult<SearchResult<SegmentAdvisor>>;

    async fn search_patch_advisors(
        &self,
        query: &PatchAdvisorsQuery,
    ) -> DbResult<SearchResult<PatchAdvisor>>;

    async fn list_pluggable_databases(
        &self,
        filter: &GlobalFilter,
    ) -> DbResult<Vec<PluggableDatabase>>;

    async fn pluggable_database_changes(
        &self,
        hostname: &str,
        pdb: &str,
        range: &TimeRange,
    ) -> DbResult<Vec<PdbChange>>;

    // Clusters

    async fn search_clusters(&self, filter: &ClustersFilter) -> DbResult<SearchResult<Cluster>>;

    async fn get_cluster(
        &self,
        name: &str,
        older_than: Option<DateTime<Utc>>,
    ) -> DbResult<Option<Cluster>>;

    // Alerts

    async fn search_alerts(&self, filter: &AlertsSearchFilter) -> DbResult<AlertsPage>;

    /// Number of `NO_DATA` alerts matched by the selection
    async fn count_no_data_alerts(&self, selection: &AlertsSelection) -> DbResult<u64>;

    /// Returns the number of alerts matched
    async fn update_alerts_status(
        &self,
        selection: &AlertsSelection,
        status: AlertStatus,
    ) -> DbResult<u64>;

    // PostgreSQL

    async fn search_postgresql_instances(
        &self,
        filter: &ReportFilter,
    ) -> DbResult<SearchResult<PostgreSqlInstance>>;

    // Charts

    async fn host_cores(&self, filter: &GlobalFilter, range: &TimeRange)
        -> DbResult<Vec<HostCores>>;

    // Cloud

    async fn list_oci_profiles(&self) -> DbResult<Vec<OciProfile>>;

    async fn get_oci_profile(&self, id: &ProfileId) -> DbResult<Option<OciProfile>>;

    async fn insert_oci_profile(&self, profile: &OciProfile, private_key: &str) -> DbResult<()>;

    /// Keeps the stored private key when `private_key` is `None`.
    /// Returns `false` when the profile does not exist.
    async fn update_oci_profile(
        &self,
        profile: &OciProfile,
        private_key: Option<&str>,
    ) -> DbResult<bool>;

    async fn delete_oci_profile(&self, id: &ProfileId) -> DbResult<bool>;

    async fn oci_recommendations(
        &self,
        profile: &ProfileId,
        kind: Option<&str>,
    ) -> DbResult<Vec<OciRecommendation>>;

    async fn selected_aws_profiles(&self) -> DbResult<Vec<ProfileId>>;

    async fn aws_recommendations_by_profiles(
        &self,
        profiles: &[ProfileId],
    ) -> DbResult<Vec<AwsRecommendation>>;

    /// Highest collection sequence number, `None` before the first run
    async fn last_aws_seq_value(&self) -> DbResult<Option<u64>>;

    async fn aws_recommendations_by_seq_value(
        &self,
        seq_value: u64,
    ) -> DbResult<Vec<AwsRecommendation>>;
}
