//! In-memory [`Database`] that records every call and returns canned data

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::database::{Database, DbResult};
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

/// A recorded database call with its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Ping,
    AllowedLocations(String),
    SearchHosts(HostsFilter),
    SearchHostsLms(HostsFilter),
    SearchHostDocuments(HostsFilter),
    GetHost(String, Option<DateTime<Utc>>),
    ArchiveHost(String),
    ListLocations(GlobalFilter),
    ListEnvironments(GlobalFilter),
    SearchAddms(ReportFilter),
    SearchSegmentAdvisors(ReportFilter),
    SearchPatchAdvisors(PatchAdvisorsQuery),
    ListPluggableDatabases(GlobalFilter),
    PluggableDatabaseChanges(String, String, TimeRange),
    SearchClusters(ClustersFilter),
    GetCluster(String, Option<DateTime<Utc>>),
    SearchAlerts(AlertsSearchFilter),
    CountNoDataAlerts(AlertsSelection),
    UpdateAlertsStatus(AlertsSelection, AlertStatus),
    SearchPostgreSqlInstances(ReportFilter),
    HostCores(GlobalFilter, TimeRange),
    ListOciProfiles,
    GetOciProfile(ProfileId),
    InsertOciProfile(OciProfile),
    UpdateOciProfile(OciProfile, Option<String>),
    DeleteOciProfile(ProfileId),
    OciRecommendations(ProfileId, Option<String>),
    SelectedAwsProfiles,
    AwsRecommendationsByProfiles(Vec<ProfileId>),
    LastAwsSeqValue,
    AwsRecommendationsBySeqValue(u64),
}

/// Canned responses; anything left unset returns an empty result
#[derive(Debug, Default)]
pub struct StubData {
    pub failure: Option<String>,
    pub allowed_locations: Vec<String>,
    pub hosts: SearchResult<HostSummary>,
    pub lms_rows: Vec<LmsRow>,
    pub host_documents: SearchResult<HostDocument>,
    pub host: Option<HostDocument>,
    pub archivable: bool,
    pub locations: Vec<String>,
    pub environments: Vec<String>,
    pub addms: SearchResult<Addm>,
    pub segment_advisors: SearchResult<SegmentAdvisor>,
    pub patch_advisors: SearchResult<PatchAdvisor>,
    pub pluggable_databases: Vec<PluggableDatabase>,
    pub pdb_changes: Vec<PdbChange>,
    pub clusters: SearchResult<Cluster>,
    pub cluster: Option<Cluster>,
    pub alerts: AlertsPage,
    pub no_data_alerts: u64,
    pub updated_alerts: u64,
    pub postgresql_instances: SearchResult<PostgreSqlInstance>,
    pub host_cores: Vec<HostCores>,
    pub oci_profiles: Vec<OciProfile>,
    pub oci_recommendations: HashMap<ProfileId, Vec<OciRecommendation>>,
    pub aws_selected_profiles: Vec<ProfileId>,
    pub aws_recommendations: Vec<AwsRecommendation>,
    pub aws_last_seq_value: Option<u64>,
}

#[derive(Debug, Default)]
pub struct StubDatabase {
    data: Mutex<StubData>,
    calls: Mutex<Vec<Call>>,
}

impl StubDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a stub from a closure filling in the canned data
    pub fn with(configure: impl FnOnce(&mut StubData)) -> Self {
        let mut data = StubData::default();
        configure(&mut data);
        Self {
            data: Mutex::new(data),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A stub whose every call fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::with(|data| data.failure = Some(message))
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    fn respond<T>(&self, call: Call, answer: impl FnOnce(&mut StubData) -> T) -> DbResult<T> {
        lock(&self.calls).push(call);
        let mut data = lock(&self.data);
        if let Some(message) = &data.failure {
            return Err(DatabaseError::Backend(message.clone()));
        }
        Ok(answer(&mut *data))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Database for StubDatabase {
    async fn ping(&self) -> DbResult<()> {
        self.respond(Call::Ping, |_| ())
    }

    async fn allowed_locations(&self, caller: &Caller) -> DbResult<Vec<String>> {
        self.respond(Call::AllowedLocations(caller.username.clone()), |d| {
            d.allowed_locations.clone()
        })
    }

    async fn search_hosts(&self, filter: &HostsFilter) -> DbResult<SearchResult<HostSummary>> {
        self.respond(Call::SearchHosts(filter.clone()), |d| d.hosts.clone())
    }

    async fn search_hosts_lms(&self, filter: &HostsFilter) -> DbResult<Vec<LmsRow>> {
        self.respond(Call::SearchHostsLms(filter.clone()), |d| d.lms_rows.clone())
    }

    async fn search_host_documents(
        &self,
        filter: &HostsFilter,
    ) -> DbResult<SearchResult<HostDocument>> {
        self.respond(Call::SearchHostDocuments(filter.clone()), |d| {
            d.host_documents.clone()
        })
    }

    async fn get_host(
        &self,
        hostname: &str,
        older_than: Option<DateTime<Utc>>,
    ) -> DbResult<Option<HostDocument>> {
        self.respond(Call::GetHost(hostname.to_string(), older_than), |d| {
            d.host.clone()
        })
    }

    async fn archive_host(&self, hostname: &str) -> DbResult<bool> {
        self.respond(Call::ArchiveHost(hostname.to_string()), |d| d.archivable)
    }

    async fn list_locations(&self, filter: &GlobalFilter) -> DbResult<Vec<String>> {
        self.respond(Call::ListLocations(filter.clone()), |d| d.locations.clone())
    }

    async fn list_environments(&self, filter: &GlobalFilter) -> DbResult<Vec<String>> {
        self.respond(Call::ListEnvironments(filter.clone()), |d| {
            d.environments.clone()
        })
    }

    async fn search_addms(&self, filter: &ReportFilter) -> DbResult<SearchResult<Addm>> {
        self.respond(Call::SearchAddms(filter.clone()), |d| d.addms.clone())
    }

    async fn search_segment_advisors(
        &self,
        filter: &ReportFilter,
    ) -> DbResult<SearchResult<SegmentAdvisor>> {
        self.respond(Call::SearchSegmentAdvisors(filter.clone()), |d| {
            d.segment_advisors.clone()
        })
    }

    async fn search_patch_advisors(
        &self,
        query: &PatchAdvisorsQuery,
    ) -> DbResult<SearchResult<PatchAdvisor>> {
        self.respond(Call::SearchPatchAdvisors(query.clone()), |d| {
            d.patch_advisors.clone()
        })
    }

    async fn list_pluggable_databases(
        &self,
        filter: &GlobalFilter,
    ) -> DbResult<Vec<PluggableDatabase>> {
        self.respond(Call::ListPluggableDatabases(filter.clone()), |d| {
            d.pluggable_databases.clone()
        })
    }

    async fn pluggable_database_changes(
        &self,
        hostname: &str,
        pdb: &str,
        range: &TimeRange,
    ) -> DbResult<Vec<PdbChange>> {
        let call = Call::PluggableDatabaseChanges(hostname.to_string(), pdb.to_string(), *range);
        self.respond(call, |d| d.pdb_changes.clone())
    }

    async fn search_clusters(&self, filter: &ClustersFilter) -> DbResult<SearchResult<Cluster>> {
        self.respond(Call::SearchClusters(filter.clone()), |d| d.clusters.clone())
    }

    async fn get_cluster(
        &self,
        name: &str,
        older_than: Option<DateTime<Utc>>,
    ) -> DbResult<Option<Cluster>> {
        self.respond(Call::GetCluster(name.to_string(), older_than), |d| {
            d.cluster.clone()
        })
    }

    async fn search_alerts(&self, filter: &AlertsSearchFilter) -> DbResult<AlertsPage> {
        self.respond(Call::SearchAlerts(filter.clone()), |d| d.alerts.clone())
    }

    async fn count_no_data_alerts(&self, selection: &AlertsSelection) -> DbResult<u64> {
        self.respond(Call::CountNoDataAlerts(selection.clone()), |d| {
            d.no_data_alerts
        })
    }

    async fn update_alerts_status(
        &self,
        selection: &AlertsSelection,
        status: AlertStatus,
    ) -> DbResult<u64> {
        self.respond(Call::UpdateAlertsStatus(selection.clone(), status), |d| {
            d.updated_alerts
        })
    }

    async fn search_postgresql_instances(
        &self,
        filter: &ReportFilter,
    ) -> DbResult<SearchResult<PostgreSqlInstance>> {
        self.respond(Call::SearchPostgreSqlInstances(filter.clone()), |d| {
            d.postgresql_instances.clone()
        })
    }

    async fn host_cores(
        &self,
        filter: &GlobalFilter,
        range: &TimeRange,
    ) -> DbResult<Vec<HostCores>> {
        self.respond(Call::HostCores(filter.clone(), *range), |d| {
            d.host_cores.clone()
        })
    }

    async fn list_oci_profiles(&self) -> DbResult<Vec<OciProfile>> {
        self.respond(Call::ListOciProfiles, |d| d.oci_profiles.clone())
    }

    async fn get_oci_profile(&self, id: &ProfileId) -> DbResult<Option<OciProfile>> {
        self.respond(Call::GetOciProfile(*id), |d| {
            d.oci_profiles.iter().find(|p| p.id == *id).cloned()
        })
    }

    async fn insert_oci_profile(&self, profile: &OciProfile, _private_key: &str) -> DbResult<()> {
        self.respond(Call::InsertOciProfile(profile.clone()), |d| {
            d.oci_profiles.push(profile.clone())
        })
    }

    async fn update_oci_profile(
        &self,
        profile: &OciProfile,
        private_key: Option<&str>,
    ) -> DbResult<bool> {
        let call = Call::UpdateOciProfile(profile.clone(), private_key.map(str::to_string));
        self.respond(call, |d| {
            match d.oci_profiles.iter_mut().find(|p| p.id == profile.id) {
                Some(stored) => {
                    *stored = profile.clone();
                    true
                }
                None => false,
            }
        })
    }

    async fn delete_oci_profile(&self, id: &ProfileId) -> DbResult<bool> {
        self.respond(Call::DeleteOciProfile(*id), |d| {
            let before = d.oci_profiles.len();
            d.oci_profiles.retain(|p| p.id != *id);
            d.oci_profiles.len() != before
        })
    }

    async fn oci_recommendations(
        &self,
        profile: &ProfileId,
        kind: Option<&str>,
    ) -> DbResult<Vec<OciRecommendation>> {
        let call = Call::OciRecommendations(*profile, kind.map(str::to_string));
        self.respond(call, |d| {
            d.oci_recommendations
                .get(profile)
                .map(|recs| {
                    recs.iter()
                        .filter(|r| kind.map_or(true, |k| r.kind == k))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    async fn selected_aws_profiles(&self) -> DbResult<Vec<ProfileId>> {
        self.respond(Call::SelectedAwsProfiles, |d| {
            d.aws_selected_profiles.clone()
        })
    }

    async fn aws_recommendations_by_profiles(
        &self,
        profiles: &[ProfileId],
    ) -> DbResult<Vec<AwsRecommendation>> {
        self.respond(Call::AwsRecommendationsByProfiles(profiles.to_vec()), |d| {
            let wanted: Vec<String> = profiles.iter().map(ToString::to_string).collect();
            d.aws_recommendations
                .iter()
                .filter(|r| wanted.contains(&r.profile_id))
                .cloned()
                .collect()
        })
    }

    async fn last_aws_seq_value(&self) -> DbResult<Option<u64>> {
        self.respond(Call::LastAwsSeqValue, |d| d.aws_last_seq_value)
    }

    async fn aws_recommendations_by_seq_value(
        &self,
        seq_value: u64,
    ) -> DbResult<Vec<AwsRecommendation>> {
        self.respond(Call::AwsRecommendationsBySeqValue(seq_value), |d| {
            d.aws_recommendations
                .iter()
                .filter(|r| r.seq_value == seq_value)
                .cloned()
                .collect()
        })
    }
}
