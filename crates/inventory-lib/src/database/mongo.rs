use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use chrono::{DateTime, Utc};
use mongodb::{Client, Collection};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::pipeline::{
    self, bson_time, concat_trimmed, date_string, join_strings, literal, or_empty,
    or_empty_array, to_double, to_long, to_string, Pipeline,
};
use super::{Database, DbResult};
use crate::error::DatabaseError;
use crate::filter::{
    AlertsMode, AlertsSearchFilter, AlertsSelection, ClusterCriterion, ClustersFilter,
    ClustersMode, GlobalFilter, HostCriteria, HostsFilter, PatchAdvisorsQuery, Range,
    ReportFilter, TimeRange,
};
use crate::models::{
    Addm, AlertAggregate, AlertStatus, AlertsPage, AwsRecommendation, Caller, Cluster,
    HostCores, HostDocument, HostSummary, LmsRow, OciProfile, OciRecommendation, PatchAdvisor,
    PdbChange, PluggableDatabase, PostgreSqlInstance, ProfileId, SegmentAdvisor,
    NO_DATA_ALERT_CODE,
};
use crate::pagination::{PageRequest, SearchResult};

const HOSTS: &str = "hosts";
const ALERTS: &str = "alerts";
const USERS: &str = "users";
const GROUPS: &str = "groups";
const OCI_PROFILES: &str = "oci_profiles";
const OCI_RECOMMENDATIONS: &str = "oci_recommendations";
const AWS_PROFILES: &str = "aws_profiles";
const AWS_RECOMMENDATIONS: &str = "aws_recommendations";

const ADDM_SEARCH_FIELDS: &[&str] = &["Hostname", "Dbname", "Action", "Finding", "Recommendation"];
const SEGMENT_ADVISOR_SEARCH_FIELDS: &[&str] = &[
    "Hostname",
    "Dbname",
    "SegmentOwner",
    "SegmentName",
    "SegmentType",
    "PartitionName",
    "Recommendation",
];
const PATCH_ADVISOR_SEARCH_FIELDS: &[&str] = &["Hostname", "Dbname", "Dbver", "Description"];
const HOST_SEARCH_FIELDS: &[&str] = &[
    "hostname",
    "features.oracle.database.databases.name",
    "info.os",
    "info.kernel",
    "info.cpuModel",
    "info.hardwareAbstractionTechnology",
    "vm.cluster",
    "vm.virtualizationNode",
];
const CLUSTER_SEARCH_FIELDS: &[&str] = &["Name", "Hostname", "Type"];
const ALERT_SEARCH_FIELDS: &[&str] = &[
    "description",
    "alertCode",
    "alertSeverity",
    "alertCategory",
    "hostname",
];
const POSTGRESQL_SEARCH_FIELDS: &[&str] = &["hostname", "name", "version", "charset"];

/// [`Database`] backed by MongoDB aggregation pipelines
#[derive(Clone)]
pub struct MongoDatabase {
    db: mongodb::Database,
}

#[derive(Debug, Default, Deserialize)]
struct Facet {
    #[serde(default)]
    content: Vec<Document>,
    #[serde(default)]
    metadata: Vec<FacetCount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacetCount {
    total_elements: u64,
}

#[derive(Debug, Deserialize)]
struct Distinct {
    #[serde(rename = "_id")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: ProfileId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeqRow {
    seq_value: u64,
}

impl MongoDatabase {
    pub async fn connect(uri: &str, database: &str) -> DbResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        debug!(database = %database, "Connected to MongoDB");
        Ok(Self::from_database(client.database(database)))
    }

    pub fn from_database(db: mongodb::Database) -> Self {
        Self { db }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }

    async fn aggregate_documents(
        &self,
        collection: &str,
        stages: Vec<Document>,
    ) -> DbResult<Vec<Document>> {
        let mut cursor = self.collection(collection).aggregate(stages, None).await?;
        let mut documents = Vec::new();
        while cursor.advance().await? {
            documents.push(cursor.deserialize_current()?);
        }
        Ok(documents)
    }

    async fn aggregate<T: DeserializeOwned>(
        &self,
        collection: &str,
        stages: Vec<Document>,
    ) -> DbResult<Vec<T>> {
        self.aggregate_documents(collection, stages)
            .await?
            .into_iter()
            .map(|doc| bson::from_document(doc).map_err(DatabaseError::from))
            .collect()
    }

    /// Runs `pipeline`, paging it with a `$facet` stage when `page` is set
    async fn search<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: Pipeline,
        page: Option<PageRequest>,
    ) -> DbResult<SearchResult<T>> {
        let Some(page) = page else {
            let items = self.aggregate(collection, query.into_stages()).await?;
            return Ok(SearchResult::Unpaged(items));
        };

        let stages = query.stage(pipeline::facet(page)).into_stages();
        let facet = self
            .aggregate::<Facet>(collection, stages)
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();
        let total = facet.metadata.first().map_or(0, |m| m.total_elements);
        let content = facet
            .content
            .into_iter()
            .map(bson::from_document)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(SearchResult::paged(content, page, total))
    }

    async fn distinct_host_field(&self, field: &str, filter: &GlobalFilter) -> DbResult<Vec<String>> {
        let stages = Pipeline::new()
            .stages(pipeline::oldness(filter.older_than))
            .maybe(pipeline::location_environment(filter))
            .stage(doc! { "$group": { "_id": format!("${field}") } })
            .stage(doc! { "$match": { "_id": { "$type": "string" } } })
            .stage(doc! { "$sort": { "_id": 1 } })
            .into_stages();
        let rows: Vec<Distinct> = self.aggregate(HOSTS, stages).await?;
        Ok(rows.into_iter().map(|row| row.value).collect())
    }

    /// Current or point-in-time hosts with the cluster they are a VM of, as `vm`
    fn hosts_base(filter: &HostsFilter) -> Pipeline {
        let global = &filter.report.global;
        let asset = filter.criteria.asset.as_ref().map(|asset| {
            let mut exists = Document::new();
            exists.insert(format!("features.{asset}"), doc! { "$exists": true });
            doc! { "$match": exists }
        });
        Pipeline::new()
            .stages(pipeline::oldness(global.older_than))
            .maybe(asset)
            .maybe(pipeline::location_environment(global))
            .stage(vm_lookup())
            .stage(doc! { "$set": { "vm": { "$arrayElemAt": ["$vm", 0] } } })
            .maybe(host_criteria(&filter.criteria))
    }

    fn cluster_projection() -> Vec<Document> {
        vec![
            doc! {
                "$lookup": {
                    "from": HOSTS,
                    "let": { "names": or_empty_array("$clusters.vms.hostname") },
                    "pipeline": [
                        { "$match": { "$expr": { "$and": [
                            { "$eq": ["$archived", false] },
                            { "$in": ["$hostname", "$$names"] },
                        ] } } },
                        { "$project": { "_id": 0, "hostname": 1 } },
                    ],
                    "as": "agents",
                }
            },
            doc! {
                "$project": {
                    "_id": 0,
                    "ID": to_string("$_id"),
                    "CreatedAt": date_string("$createdAt"),
                    "Environment": "$environment",
                    "Location": "$location",
                    "FetchEndpoint": or_empty("$clusters.fetchEndpoint"),
                    "Hostname": "$hostname",
                    "HostnameAgentVirtualization": "$hostname",
                    "Name": "$clusters.name",
                    "Type": or_empty("$clusters.type"),
                    "CPU": to_long("$clusters.cpu"),
                    "Sockets": to_long("$clusters.sockets"),
                    "VMs": {
                        "$map": {
                            "input": or_empty_array("$clusters.vms"),
                            "as": "vm",
                            "in": {
                                "Name": or_empty("$$vm.name"),
                                "Hostname": or_empty("$$vm.hostname"),
                                "VirtualizationNode": or_empty("$$vm.virtualizationNode"),
                                "PhysicalServerModelName": or_empty("$$vm.physicalServerModelName"),
                                "CappedCPU": { "$eq": ["$$vm.cappedCPU", true] },
                                "IsErcoleInstalled": { "$in": ["$$vm.hostname", "$agents.hostname"] },
                            }
                        }
                    },
                }
            },
            doc! {
                "$set": {
                    "VirtualizationNodes": { "$setUnion": ["$VMs.VirtualizationNode", []] },
                    "PhysicalServerModelNames": { "$setUnion": ["$VMs.PhysicalServerModelName", []] },
                    "VMsCount": { "$size": "$VMs" },
                    "VMsErcoleAgentCount": { "$size": {
                        "$filter": { "input": "$VMs", "as": "vm", "cond": "$$vm.IsErcoleInstalled" }
                    } },
                }
            },
            doc! { "$set": { "VirtualizationNodesCount": { "$size": "$VirtualizationNodes" } } },
        ]
    }

    fn alerts_base(filter: &AlertsSearchFilter) -> Pipeline {
        let mut criteria = Document::new();
        if let Some(severity) = filter.severity {
            criteria.insert("alertSeverity", severity.as_str());
        }
        if let Some(status) = filter.status {
            criteria.insert("alertStatus", status.as_str());
        }
        // `to` already carries the `older-than` cap
        if let Some(range) = pipeline::time_range(&TimeRange {
            newer_than: filter.from,
            older_than: filter.to,
        }) {
            criteria.insert("date", range);
        }

        let mut base = Pipeline::new().stage(doc! { "$match": criteria });
        if let Some(host_match) =
            pipeline::location_environment_at(&filter.global, "host.location", "host.environment")
        {
            base = base
                .stage(doc! {
                    "$lookup": {
                        "from": HOSTS,
                        "let": { "hn": "$otherInfo.hostname" },
                        "pipeline": [
                            { "$match": { "$expr": { "$and": [
                                { "$eq": ["$hostname", "$$hn"] },
                                { "$eq": ["$archived", false] },
                            ] } } },
                            { "$project": { "_id": 0, "location": 1, "environment": 1 } },
                        ],
                        "as": "host",
                    }
                })
                .stage(doc! { "$unwind": "$host" })
                .stage(host_match);
        }
        base
    }
}

fn vm_lookup() -> Document {
    doc! {
        "$lookup": {
            "from": HOSTS,
            "let": { "hn": "$hostname" },
            "pipeline": [
                { "$match": { "archived": false } },
                { "$unwind": "$clusters" },
                { "$unwind": "$clusters.vms" },
                { "$match": { "$expr": { "$eq": ["$clusters.vms.hostname", "$$hn"] } } },
                { "$project": {
                    "_id": 0,
                    "cluster": "$clusters.name",
                    "virtualizationNode": "$clusters.vms.virtualizationNode",
                } },
            ],
            "as": "vm",
        }
    }
}

fn insert_range<T: Copy + Into<Bson>>(criteria: &mut Document, field: &str, range: &Range<T>) {
    if range.is_unbounded() {
        return;
    }
    let mut bounds = Document::new();
    if let Some(lte) = range.lte {
        bounds.insert("$lte", lte);
    }
    if let Some(gte) = range.gte {
        bounds.insert("$gte", gte);
    }
    criteria.insert(field, bounds);
}

fn host_criteria(criteria: &HostCriteria) -> Option<Document> {
    let mut clauses: Vec<Document> = [
        ("hostname", &criteria.hostname),
        ("features.oracle.database.databases.name", &criteria.database),
        (
            "info.hardwareAbstractionTechnology",
            &criteria.hardware_abstraction_technology,
        ),
        ("vm.virtualizationNode", &criteria.physical_host),
        ("info.os", &criteria.operating_system),
        ("info.kernel", &criteria.kernel),
        ("info.cpuModel", &criteria.cpu_model),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.as_deref().map(|v| pipeline::contains(field, v)))
    .collect();

    match &criteria.cluster {
        ClusterCriterion::Any => {}
        ClusterCriterion::Unclustered => clauses.push(doc! { "vm.cluster": Bson::Null }),
        ClusterCriterion::Named(name) => clauses.push(pipeline::contains("vm.cluster", name)),
    }

    let mut numeric = Document::new();
    insert_range(&mut numeric, "info.memoryTotal", &criteria.memory_total);
    insert_range(&mut numeric, "info.swapTotal", &criteria.swap_total);
    insert_range(&mut numeric, "info.cpuCores", &criteria.cpu_cores);
    insert_range(&mut numeric, "info.cpuThreads", &criteria.cpu_threads);
    if !numeric.is_empty() {
        clauses.push(numeric);
    }

    if let Some(member) = criteria.is_member_of_cluster {
        clauses.push(doc! {
            "$expr": { "$eq": [
                { "$or": [
                    { "$eq": ["$clusterMembershipStatus.oracleClusterware", true] },
                    { "$eq": ["$clusterMembershipStatus.sunCluster", true] },
                    { "$eq": ["$clusterMembershipStatus.veritasClusterServer", true] },
                ] },
                member,
            ] }
        });
    }

    (!clauses.is_empty()).then(|| doc! { "$match": { "$and": clauses } })
}

fn host_summary_projection(with_details: bool) -> Document {
    let mut projection = doc! {
        "_id": 0,
        "Hostname": "$hostname",
        "Location": "$location",
        "Environment": "$environment",
        "HostType": or_empty("$hostType"),
        "Cluster": "$vm.cluster",
        "PhysicalHost": "$vm.virtualizationNode",
        "Version": or_empty("$agentVersion"),
        "CreatedAt": date_string("$createdAt"),
        "Databases": or_empty_array("$features.oracle.database.databases.name"),
        "OS": concat_trimmed("$info.os", "$info.osVersion"),
        "Kernel": concat_trimmed("$info.kernel", "$info.kernelVersion"),
        "OracleCluster": { "$eq": ["$clusterMembershipStatus.oracleClusterware", true] },
        "SunCluster": { "$eq": ["$clusterMembershipStatus.sunCluster", true] },
        "VeritasCluster": { "$eq": ["$clusterMembershipStatus.veritasClusterServer", true] },
        "Virtual": { "$eq": ["$info.hardwareAbstraction", "VIRT"] },
        "Type": or_empty("$info.hardwareAbstractionTechnology"),
        "CPUThreads": to_long("$info.cpuThreads"),
        "CPUCores": to_long("$info.cpuCores"),
        "Socket": to_long("$info.cpuSockets"),
        "MemTotal": to_double("$info.memoryTotal"),
        "SwapTotal": to_double("$info.swapTotal"),
        "CPUModel": or_empty("$info.cpuModel"),
    };
    if with_details {
        projection.insert(
            "DatabaseDetails",
            doc! {
                "$map": {
                    "input": or_empty_array("$features.oracle.database.databases"),
                    "as": "db",
                    "in": {
                        "Name": or_empty("$$db.name"),
                        "Version": or_empty("$$db.version"),
                        "Status": or_empty("$$db.status"),
                        "Work": pipeline::convert(Bson::String("$$db.work".into()), "double", Bson::Null),
                    }
                }
            },
        );
    }
    doc! { "$project": projection }
}

fn lms_projection() -> Document {
    let is_virtual = doc! { "$eq": ["$info.hardwareAbstraction", "VIRT"] };
    let licensed_features = doc! {
        "$map": {
            "input": {
                "$filter": {
                    "input": or_empty_array("$db.licenses"),
                    "as": "l",
                    "cond": { "$gt": ["$$l.count", 0] },
                }
            },
            "as": "l",
            "in": "$$l.name",
        }
    };
    doc! {
        "$project": {
            "_id": 0,
            "PhysicalServerName": {
                "$cond": [is_virtual.clone(), or_empty("$vm.virtualizationNode"), "$hostname"]
            },
            "VirtualServerName": { "$cond": [is_virtual, "$hostname", ""] },
            "VirtualizationTechnology": or_empty("$info.hardwareAbstractionTechnology"),
            "DBInstanceName": or_empty("$db.name"),
            "PluggableDatabaseName": literal(""),
            "ConnectString": literal(""),
            "ProductVersion": or_empty("$db.version"),
            "ProductEdition": or_empty("$db.edition"),
            "Environment": or_empty("$environment"),
            "Features": join_strings(licensed_features),
            "RacNodeNames": join_strings("$db.racNodeNames"),
            "ProcessorModel": or_empty("$info.cpuModel"),
            "Processors": to_long("$info.cpuSockets"),
            "CoresPerProcessor": to_long("$info.coresPerSocket"),
            "PhysicalCores": to_long("$info.cpuCores"),
            "ThreadsPerCore": to_long("$info.threadsPerCore"),
            "ProcessorSpeed": to_string("$info.cpuFrequency"),
            "ServerPurchaseDate": literal(""),
            "OperatingSystem": concat_trimmed("$info.os", "$info.osVersion"),
            "Notes": literal(""),
        }
    }
}

fn selection_criteria(selection: &AlertsSelection) -> DbResult<Document> {
    let mut criteria = Document::new();
    if !selection.ids.is_empty() {
        let ids: Vec<ObjectId> = selection
            .object_ids()
            .map_err(|e| DatabaseError::Backend(e.to_string()))?;
        criteria.insert("_id", doc! { "$in": ids });
    }
    if let Some(category) = &selection.alert_category {
        criteria.insert("alertCategory", category.clone());
    }
    if let Some(code) = &selection.alert_code {
        criteria.insert("alertCode", code.clone());
    }
    if let Some(severity) = selection.alert_severity {
        criteria.insert("alertSeverity", severity.as_str());
    }
    if let Some(status) = selection.alert_status {
        criteria.insert("alertStatus", status.as_str());
    }
    if !selection.hostnames.is_empty() {
        criteria.insert("otherInfo.hostname", doc! { "$in": selection.hostnames.clone() });
    }
    if let Some(range) = pipeline::time_range(&TimeRange {
        newer_than: selection.date_from,
        older_than: selection.date_to,
    }) {
        criteria.insert("date", range);
    }
    Ok(criteria)
}

fn oci_profile_projection() -> Document {
    doc! {
        "$project": {
            "_id": 0,
            "id": to_string("$_id"),
            "profile": or_empty("$profile"),
            "tenancyOCID": or_empty("$tenancyOCID"),
            "userOCID": or_empty("$userOCID"),
            "keyFingerprint": or_empty("$keyFingerprint"),
            "region": or_empty("$region"),
            "selected": { "$eq": ["$selected", true] },
        }
    }
}

fn recommendation_details() -> Bson {
    Bson::Document(doc! {
        "$map": {
            "input": or_empty_array("$details"),
            "as": "d",
            "in": { "name": or_empty("$$d.name"), "value": to_string("$$d.value") },
        }
    })
}

fn aws_recommendation_projection() -> Document {
    doc! {
        "$project": {
            "_id": 0,
            "seqValue": to_long("$seqValue"),
            "profileID": to_string("$profileID"),
            "category": or_empty("$category"),
            "suggestion": or_empty("$suggestion"),
            "name": or_empty("$name"),
            "resourceID": or_empty("$resourceID"),
            "objectType": or_empty("$objectType"),
            "details": recommendation_details(),
            "errors": {
                "$map": {
                    "input": or_empty_array("$errors"),
                    "as": "e",
                    "in": { "error": to_string("$$e.error") },
                }
            },
            "createdAt": date_string("$createdAt"),
        }
    }
}

fn time_bounded(time_range: &TimeRange, field: &str) -> Option<Document> {
    pipeline::time_range(time_range).map(|bounds| {
        let mut criteria = Document::new();
        criteria.insert(field, bounds);
        doc! { "$match": criteria }
    })
}

#[async_trait]
impl Database for MongoDatabase {
    async fn ping(&self) -> DbResult<()> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn allowed_locations(&self, caller: &Caller) -> DbResult<Vec<String>> {
        let stages = Pipeline::new()
            .stage(doc! { "$match": { "username": caller.username.clone() } })
            .stage(doc! {
                "$lookup": {
                    "from": GROUPS,
                    "localField": "groups",
                    "foreignField": "name",
                    "as": "group",
                }
            })
            .stage(doc! { "$unwind": "$group" })
            .stage(doc! { "$unwind": "$group.locations" })
            .stage(doc! { "$group": { "_id": "$group.locations" } })
            .stage(doc! { "$sort": { "_id": 1 } })
            .into_stages();
        let rows: Vec<Distinct> = self.aggregate(USERS, stages).await?;
        Ok(rows.into_iter().map(|row| row.value).collect())
    }

    async fn search_hosts(&self, filter: &HostsFilter) -> DbResult<SearchResult<HostSummary>> {
        let search = &filter.report.search;
        let pipeline = Self::hosts_base(filter)
            .maybe(pipeline::search(&search.keywords, HOST_SEARCH_FIELDS))
            .stage(host_summary_projection(
                filter.mode == crate::filter::HostsMode::Full,
            ))
            .maybe(pipeline::sort(search.sort.as_ref()));
        self.search(HOSTS, pipeline, search.page).await
    }

    async fn search_hosts_lms(&self, filter: &HostsFilter) -> DbResult<Vec<LmsRow>> {
        let search = &filter.report.search;
        let stages = Self::hosts_base(filter)
            .maybe(pipeline::search(&search.keywords, HOST_SEARCH_FIELDS))
            .stages(pipeline::unwind_oracle_databases())
            .stage(lms_projection())
            .maybe(pipeline::sort(search.sort.as_ref()))
            .into_stages();
        self.aggregate(HOSTS, stages).await
    }

    async fn search_host_documents(
        &self,
        filter: &HostsFilter,
    ) -> DbResult<SearchResult<HostDocument>> {
        let search = &filter.report.search;
        let pipeline = Self::hosts_base(filter)
            .maybe(pipeline::search(&search.keywords, HOST_SEARCH_FIELDS))
            .stage(doc! { "$unset": "vm" })
            .maybe(pipeline::sort(search.sort.as_ref()));
        let documents: SearchResult<Document> = self.search(HOSTS, pipeline, search.page).await?;
        Ok(documents.map(HostDocument))
    }

    async fn get_host(
        &self,
        hostname: &str,
        older_than: Option<DateTime<Utc>>,
    ) -> DbResult<Option<HostDocument>> {
        let stages = Pipeline::new()
            .stage(doc! { "$match": { "hostname": hostname } })
            .stages(pipeline::oldness(older_than))
            .stage(doc! { "$limit": 1 })
            .into_stages();
        let documents = self.aggregate_documents(HOSTS, stages).await?;
        Ok(documents.into_iter().next().map(HostDocument))
    }

    async fn archive_host(&self, hostname: &str) -> DbResult<bool> {
        let result = self
            .collection(HOSTS)
            .update_many(
                doc! { "hostname": hostname, "archived": false },
                doc! { "$set": { "archived": true } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn list_locations(&self, filter: &GlobalFilter) -> DbResult<Vec<String>> {
        self.distinct_host_field("location", filter).await
    }

    async fn list_environments(&self, filter: &GlobalFilter) -> DbResult<Vec<String>> {
        self.distinct_host_field("environment", filter).await
    }

    async fn search_addms(&self, filter: &ReportFilter) -> DbResult<SearchResult<Addm>> {
        let pipeline = Pipeline::new()
            .stages(pipeline::oldness(filter.global.older_than))
            .maybe(pipeline::location_environment(&filter.global))
            .stages(pipeline::unwind_oracle_databases())
            .stage(doc! { "$unwind": "$db.addms" })
            .stage(doc! {
                "$project": {
                    "_id": 0,
                    "Hostname": "$hostname",
                    "Location": "$location",
                    "Environment": "$environment",
                    "Dbname": or_empty("$db.name"),
                    "CreatedAt": date_string("$createdAt"),
                    "Action": or_empty("$db.addms.action"),
                    "Benefit": to_double("$db.addms.benefit"),
                    "Finding": or_empty("$db.addms.finding"),
                    "Recommendation": or_empty("$db.addms.recommendation"),
                }
            })
            .maybe(pipeline::search(&filter.search.keywords, ADDM_SEARCH_FIELDS))
            .maybe(pipeline::sort(filter.search.sort.as_ref()));
        self.search(HOSTS, pipeline, filter.search.page).await
    }

    async fn search_segment_advisors(
        &self,
        filter: &ReportFilter,
    ) -> DbResult<SearchResult<SegmentAdvisor>> {
        let pipeline = Pipeline::new()
            .stages(pipeline::oldness(filter.global.older_than))
            .maybe(pipeline::location_environment(&filter.global))
            .stages(pipeline::unwind_oracle_databases())
            .stage(doc! { "$unwind": "$db.segmentAdvisors" })
            .stage(doc! {
                "$project": {
                    "_id": 0,
                    "Hostname": "$hostname",
                    "Location": "$location",
                    "Environment": "$environment",
                    "Dbname": or_empty("$db.name"),
                    "CreatedAt": date_string("$createdAt"),
                    "PartitionName": or_empty("$db.segmentAdvisors.partitionName"),
                    "Reclaimable": to_string("$db.segmentAdvisors.reclaimable"),
                    "Recommendation": or_empty("$db.segmentAdvisors.recommendation"),
                    "SegmentName": or_empty("$db.segmentAdvisors.segmentName"),
                    "SegmentOwner": or_empty("$db.segmentAdvisors.segmentOwner"),
                    "SegmentType": or_empty("$db.segmentAdvisors.segmentType"),
                }
            })
            .maybe(pipeline::search(
                &filter.search.keywords,
                SEGMENT_ADVISOR_SEARCH_FIELDS,
            ))
            .maybe(pipeline::sort(filter.search.sort.as_ref()));
        self.search(HOSTS, pipeline, filter.search.page).await
    }

    async fn search_patch_advisors(
        &self,
        query: &PatchAdvisorsQuery,
    ) -> DbResult<SearchResult<PatchAdvisor>> {
        let filter = &query.report;
        let has_psu = doc! { "$ne": [{ "$ifNull": ["$LastPsu", Bson::Null] }, Bson::Null] };
        let status = match query.window_start {
            Some(start) => doc! {
                "$cond": [
                    { "$and": [has_psu, { "$gte": ["$LastPsu.date", bson_time(start)] }] },
                    "OK",
                    "KO",
                ]
            },
            None => doc! { "$cond": [has_psu, "OK", "KO"] },
        };
        let status_match = query
            .status
            .map(|status| doc! { "$match": { "Status": status.as_str() } });

        let pipeline = Pipeline::new()
            .stages(pipeline::oldness(filter.global.older_than))
            .maybe(pipeline::location_environment(&filter.global))
            .stages(pipeline::unwind_oracle_databases())
            .stage(doc! {
                "$project": {
                    "_id": 0,
                    "Hostname": "$hostname",
                    "Location": "$location",
                    "Environment": "$environment",
                    "CreatedAt": date_string("$createdAt"),
                    "Dbname": or_empty("$db.name"),
                    "Dbver": or_empty("$db.version"),
                    "LastPsu": {
                        "$reduce": {
                            "input": or_empty_array("$db.psus"),
                            "initialValue": Bson::Null,
                            "in": {
                                "$cond": [
                                    { "$or": [
                                        { "$eq": ["$$value", Bson::Null] },
                                        { "$gt": ["$$this.date", "$$value.date"] },
                                    ] },
                                    "$$this",
                                    "$$value",
                                ]
                            }
                        }
                    },
                }
            })
            .stage(doc! {
                "$set": {
                    "Description": or_empty("$LastPsu.description"),
                    "Date": date_string("$LastPsu.date"),
                    "Status": status,
                }
            })
            .stage(doc! { "$unset": "LastPsu" })
            .maybe(status_match)
            .maybe(pipeline::search(
                &filter.search.keywords,
                PATCH_ADVISOR_SEARCH_FIELDS,
            ))
            .maybe(pipeline::sort(filter.search.sort.as_ref()));
        self.search(HOSTS, pipeline, filter.search.page).await
    }

    async fn list_pluggable_databases(
        &self,
        filter: &GlobalFilter,
    ) -> DbResult<Vec<PluggableDatabase>> {
        let stages = Pipeline::new()
            .stages(pipeline::oldness(filter.older_than))
            .maybe(pipeline::location_environment(filter))
            .stages(pipeline::unwind_oracle_databases())
            .stage(doc! { "$unwind": "$db.pdbs" })
            .stage(doc! {
                "$project": {
                    "_id": 0,
                    "hostname": "$hostname",
                    "database": or_empty("$db.name"),
                    "name": or_empty("$db.pdbs.name"),
                    "status": or_empty("$db.pdbs.status"),
                    "charset": or_empty("$db.pdbs.charset"),
                    "segmentsSize": to_double("$db.pdbs.segmentsSize"),
                    "datafileSize": to_double("$db.pdbs.datafileSize"),
                    "allocable": to_double("$db.pdbs.allocable"),
                    "tablespaces": {
                        "$map": {
                            "input": or_empty_array("$db.pdbs.tablespaces"),
                            "as": "t",
                            "in": {
                                "name": or_empty("$$t.name"),
                                "maxSize": to_double("$$t.maxSize"),
                                "total": to_double("$$t.total"),
                                "used": to_double("$$t.used"),
                                "usedPerc": to_string("$$t.usedPerc"),
                                "status": or_empty("$$t.status"),
                            }
                        }
                    },
                    "schemas": {
                        "$map": {
                            "input": or_empty_array("$db.pdbs.schemas"),
                            "as": "s",
                            "in": {
                                "user": or_empty("$$s.user"),
                                "total": to_double("$$s.total"),
                                "tables": to_double("$$s.tables"),
                                "indexes": to_double("$$s.indexes"),
                                "lob": to_double("$$s.lob"),
                            }
                        }
                    },
                    "services": {
                        "$map": {
                            "input": or_empty_array("$db.pdbs.services"),
                            "as": "svc",
                            "in": { "name": or_empty("$$svc.name") },
                        }
                    },
                }
            })
            .stage(doc! { "$sort": { "hostname": 1, "database": 1, "name": 1 } })
            .into_stages();
        self.aggregate(HOSTS, stages).await
    }

    async fn pluggable_database_changes(
        &self,
        hostname: &str,
        pdb: &str,
        range: &TimeRange,
    ) -> DbResult<Vec<PdbChange>> {
        let stages = Pipeline::new()
            .stage(doc! { "$match": { "hostname": hostname } })
            .maybe(time_bounded(range, "createdAt"))
            .stage(doc! { "$sort": { "createdAt": 1 } })
            .stages(pipeline::unwind_oracle_databases())
            .stage(doc! { "$unwind": "$db.pdbs" })
            .stage(doc! { "$match": { "db.pdbs.name": pdb } })
            .stage(doc! {
                "$project": {
                    "_id": 0,
                    "pdbName": "$db.pdbs.name",
                    "updated": date_string("$createdAt"),
                    "segmentsSize": to_double("$db.pdbs.segmentsSize"),
                    "datafileSize": to_double("$db.pdbs.datafileSize"),
                    "allocable": to_double("$db.pdbs.allocable"),
                }
            })
            .into_stages();
        self.aggregate(HOSTS, stages).await
    }

    async fn search_clusters(&self, filter: &ClustersFilter) -> DbResult<SearchResult<Cluster>> {
        let report = &filter.report;
        let mut pipeline = Pipeline::new()
            .stages(pipeline::oldness(report.global.older_than))
            .maybe(pipeline::location_environment(&report.global))
            .stage(doc! { "$unwind": "$clusters" })
            .stages(Self::cluster_projection())
            .maybe(pipeline::search(&report.search.keywords, CLUSTER_SEARCH_FIELDS))
            .maybe(pipeline::sort(report.search.sort.as_ref()));
        if filter.mode == ClustersMode::ClusterNames {
            pipeline = pipeline.stage(doc! { "$project": { "_id": 0, "Name": 1 } });
        }
        self.search(HOSTS, pipeline, report.search.page).await
    }

    async fn get_cluster(
        &self,
        name: &str,
        older_than: Option<DateTime<Utc>>,
    ) -> DbResult<Option<Cluster>> {
        let stages = Pipeline::new()
            .stages(pipeline::oldness(older_than))
            .stage(doc! { "$unwind": "$clusters" })
            .stage(doc! { "$match": { "clusters.name": name } })
            .stage(doc! { "$limit": 1 })
            .stages(Self::cluster_projection())
            .into_stages();
        let clusters: Vec<Cluster> = self.aggregate(HOSTS, stages).await?;
        Ok(clusters.into_iter().next())
    }

    async fn search_alerts(&self, filter: &AlertsSearchFilter) -> DbResult<AlertsPage> {
        let base = Self::alerts_base(filter);
        let search = &filter.search;
        match filter.mode {
            AlertsMode::All => {
                let pipeline = base
                    .stage(doc! {
                        "$project": {
                            "_id": 0,
                            "id": to_string("$_id"),
                            "alertAffectedTechnology": "$alertAffectedTechnology",
                            "alertCategory": or_empty("$alertCategory"),
                            "alertCode": or_empty("$alertCode"),
                            "alertSeverity": "$alertSeverity",
                            "alertStatus": "$alertStatus",
                            "date": date_string("$date"),
                            "description": or_empty("$description"),
                            "hostname": or_empty("$otherInfo.hostname"),
                            "otherInfo": { "$ifNull": ["$otherInfo", {}] },
                        }
                    })
                    .maybe(pipeline::search(&search.keywords, ALERT_SEARCH_FIELDS))
                    .maybe(pipeline::sort(search.sort.as_ref()));
                Ok(AlertsPage::All(self.search(ALERTS, pipeline, search.page).await?))
            }
            AlertsMode::AggregatedCodeSeverity => {
                let pipeline = base
                    .stage(doc! {
                        "$group": {
                            "_id": { "code": "$alertCode", "severity": "$alertSeverity" },
                            "count": { "$sum": 1 },
                            "hosts": { "$addToSet": "$otherInfo.hostname" },
                            "oldest": { "$min": "$date" },
                        }
                    })
                    .stage(doc! {
                        "$project": {
                            "_id": 0,
                            "Code": "$_id.code",
                            "Severity": "$_id.severity",
                            "Count": to_long("$count"),
                            "AffectedHosts": { "$size": "$hosts" },
                            "OldestAlert": date_string("$oldest"),
                        }
                    })
                    .maybe(pipeline::search(&search.keywords, &["Code", "Severity"]))
                    .stage(
                        pipeline::sort(search.sort.as_ref())
                            .unwrap_or_else(|| doc! { "$sort": { "Code": 1, "Severity": 1 } }),
                    );
                let aggregates: SearchResult<AlertAggregate> =
                    self.search(ALERTS, pipeline, search.page).await?;
                Ok(AlertsPage::Aggregated(aggregates))
            }
        }
    }

    async fn count_no_data_alerts(&self, selection: &AlertsSelection) -> DbResult<u64> {
        let criteria = doc! {
            "$and": [selection_criteria(selection)?, { "alertCode": NO_DATA_ALERT_CODE }]
        };
        Ok(self.collection(ALERTS).count_documents(criteria, None).await?)
    }

    async fn update_alerts_status(
        &self,
        selection: &AlertsSelection,
        status: AlertStatus,
    ) -> DbResult<u64> {
        let result = self
            .collection(ALERTS)
            .update_many(
                selection_criteria(selection)?,
                doc! { "$set": { "alertStatus": status.as_str() } },
                None,
            )
            .await?;
        Ok(result.matched_count)
    }

    async fn search_postgresql_instances(
        &self,
        filter: &ReportFilter,
    ) -> DbResult<SearchResult<PostgreSqlInstance>> {
        let pipeline = Pipeline::new()
            .stages(pipeline::oldness(filter.global.older_than))
            .maybe(pipeline::location_environment(&filter.global))
            .stage(doc! { "$set": { "instance": or_empty_array("$features.postgresql.instances") } })
            .stage(doc! { "$unwind": "$instance" })
            .stage(doc! {
                "$project": {
                    "_id": 0,
                    "hostname": "$hostname",
                    "environment": or_empty("$environment"),
                    "location": or_empty("$location"),
                    "name": or_empty("$instance.name"),
                    "version": or_empty("$instance.version"),
                    "charset": or_empty("$instance.charset"),
                    "port": to_long("$instance.port"),
                    "databases": { "$size": or_empty_array("$instance.databases") },
                    "users": { "$size": or_empty_array("$instance.users") },
                }
            })
            .maybe(pipeline::search(
                &filter.search.keywords,
                POSTGRESQL_SEARCH_FIELDS,
            ))
            .maybe(pipeline::sort(filter.search.sort.as_ref()));
        self.search(HOSTS, pipeline, filter.search.page).await
    }

    async fn host_cores(
        &self,
        filter: &GlobalFilter,
        range: &TimeRange,
    ) -> DbResult<Vec<HostCores>> {
        let stages = Pipeline::new()
            .maybe(time_bounded(range, "createdAt"))
            .maybe(pipeline::location_environment(filter))
            .stage(doc! {
                "$project": {
                    "day": { "$dateToString": { "format": "%Y-%m-%d", "date": "$createdAt" } },
                    "hostname": 1,
                    "cores": to_long("$info.cpuCores"),
                }
            })
            .stage(doc! {
                "$group": {
                    "_id": { "day": "$day", "hostname": "$hostname" },
                    "cores": { "$max": "$cores" },
                }
            })
            .stage(doc! { "$group": { "_id": "$_id.day", "cores": { "$sum": "$cores" } } })
            .stage(doc! { "$sort": { "_id": 1 } })
            .stage(doc! {
                "$project": {
                    "_id": 0,
                    "date": { "$concat": ["$_id", "T00:00:00Z"] },
                    "cores": to_long("$cores"),
                }
            })
            .into_stages();
        self.aggregate(HOSTS, stages).await
    }

    async fn list_oci_profiles(&self) -> DbResult<Vec<OciProfile>> {
        let stages = Pipeline::new()
            .stage(oci_profile_projection())
            .stage(doc! { "$sort": { "profile": 1 } })
            .into_stages();
        self.aggregate(OCI_PROFILES, stages).await
    }

    async fn get_oci_profile(&self, id: &ProfileId) -> DbResult<Option<OciProfile>> {
        let stages = Pipeline::new()
            .stage(doc! { "$match": { "_id": id.object_id() } })
            .stage(oci_profile_projection())
            .into_stages();
        let profiles: Vec<OciProfile> = self.aggregate(OCI_PROFILES, stages).await?;
        Ok(profiles.into_iter().next())
    }

    async fn insert_oci_profile(&self, profile: &OciProfile, private_key: &str) -> DbResult<()> {
        self.collection(OCI_PROFILES)
            .insert_one(
                doc! {
                    "_id": profile.id.object_id(),
                    "profile": profile.profile.clone(),
                    "tenancyOCID": profile.tenancy_ocid.clone(),
                    "userOCID": profile.user_ocid.clone(),
                    "keyFingerprint": profile.key_fingerprint.clone(),
                    "region": profile.region.clone(),
                    "privateKey": private_key,
                    "selected": profile.selected,
                },
                None,
            )
            .await?;
        Ok(())
    }

    async fn update_oci_profile(
        &self,
        profile: &OciProfile,
        private_key: Option<&str>,
    ) -> DbResult<bool> {
        let mut fields = doc! {
            "profile": profile.profile.clone(),
            "tenancyOCID": profile.tenancy_ocid.clone(),
            "userOCID": profile.user_ocid.clone(),
            "keyFingerprint": profile.key_fingerprint.clone(),
            "region": profile.region.clone(),
            "selected": profile.selected,
        };
        if let Some(key) = private_key {
            fields.insert("privateKey", key);
        }
        let result = self
            .collection(OCI_PROFILES)
            .update_one(
                doc! { "_id": profile.id.object_id() },
                doc! { "$set": fields },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_oci_profile(&self, id: &ProfileId) -> DbResult<bool> {
        let result = self
            .collection(OCI_PROFILES)
            .delete_one(doc! { "_id": id.object_id() }, None)
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn oci_recommendations(
        &self,
        profile: &ProfileId,
        kind: Option<&str>,
    ) -> DbResult<Vec<OciRecommendation>> {
        let mut criteria = doc! { "profileID": profile.object_id() };
        if let Some(kind) = kind {
            criteria.insert("type", kind);
        }
        let stages = Pipeline::new()
            .stage(doc! { "$match": criteria })
            .stage(doc! { "$sort": { "createdAt": -1, "name": 1 } })
            .stage(doc! {
                "$project": {
                    "_id": 0,
                    "profileID": to_string("$profileID"),
                    "type": or_empty("$type"),
                    "compartmentID": or_empty("$compartmentID"),
                    "compartmentName": or_empty("$compartmentName"),
                    "name": or_empty("$name"),
                    "resourceID": or_empty("$resourceID"),
                    "objectType": or_empty("$objectType"),
                    "details": recommendation_details(),
                    "createdAt": date_string("$createdAt"),
                }
            })
            .into_stages();
        self.aggregate(OCI_RECOMMENDATIONS, stages).await
    }

    async fn selected_aws_profiles(&self) -> DbResult<Vec<ProfileId>> {
        let stages = Pipeline::new()
            .stage(doc! { "$match": { "selected": true } })
            .stage(doc! { "$project": { "_id": 0, "id": to_string("$_id") } })
            .into_stages();
        let rows: Vec<IdRow> = self.aggregate(AWS_PROFILES, stages).await?;
        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    async fn aws_recommendations_by_profiles(
        &self,
        profiles: &[ProfileId],
    ) -> DbResult<Vec<AwsRecommendation>> {
        let ids: Vec<ObjectId> = profiles.iter().map(ProfileId::object_id).collect();
        let stages = Pipeline::new()
            .stage(doc! { "$match": { "profileID": { "$in": ids } } })
            .stage(doc! { "$sort": { "createdAt": -1, "name": 1 } })
            .stage(aws_recommendation_projection())
            .into_stages();
        self.aggregate(AWS_RECOMMENDATIONS, stages).await
    }

    async fn last_aws_seq_value(&self) -> DbResult<Option<u64>> {
        let stages = Pipeline::new()
            .stage(doc! { "$sort": { "seqValue": -1 } })
            .stage(doc! { "$limit": 1 })
            .stage(doc! { "$project": { "_id": 0, "seqValue": to_long("$seqValue") } })
            .into_stages();
        let rows: Vec<SeqRow> = self.aggregate(AWS_RECOMMENDATIONS, stages).await?;
        Ok(rows.into_iter().next().map(|row| row.seq_value))
    }

    async fn aws_recommendations_by_seq_value(
        &self,
        seq_value: u64,
    ) -> DbResult<Vec<AwsRecommendation>> {
        let seq = i64::try_from(seq_value)
            .map_err(|_| DatabaseError::Backend(format!("sequence value {seq_value} out of range")))?;
        let stages = Pipeline::new()
            .stage(doc! { "$match": { "seqValue": seq } })
            .stage(doc! { "$sort": { "name": 1 } })
            .stage(aws_recommendation_projection())
            .into_stages();
        self.aggregate(AWS_RECOMMENDATIONS, stages).await
    }
}
