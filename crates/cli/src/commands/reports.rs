//! Report listing commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::{
    Addm, Alert, ApiClient, Cluster, Host, Listing, PatchAdvisor, SegmentAdvisor,
};
use crate::output::{
    color_severity, color_status, format_list, format_timestamp, print_listing, OutputFormat,
};

type Query = Vec<(&'static str, String)>;

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Env")]
    environment: String,
    #[tabled(rename = "OS")]
    os: String,
    #[tabled(rename = "Cores")]
    cores: i64,
    #[tabled(rename = "Cluster")]
    cluster: String,
    #[tabled(rename = "Databases")]
    databases: String,
}

#[derive(Tabled)]
struct AddmRow {
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Database")]
    dbname: String,
    #[tabled(rename = "Env")]
    environment: String,
    #[tabled(rename = "Benefit")]
    benefit: String,
    #[tabled(rename = "Finding")]
    finding: String,
}

#[derive(Tabled)]
struct SegmentAdvisorRow {
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Database")]
    dbname: String,
    #[tabled(rename = "Segment")]
    segment: String,
    #[tabled(rename = "Type")]
    segment_type: String,
    #[tabled(rename = "Reclaimable (GB)")]
    reclaimable: String,
}

#[derive(Tabled)]
struct PatchAdvisorRow {
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Database")]
    dbname: String,
    #[tabled(rename = "Version")]
    dbver: String,
    #[tabled(rename = "PSU Date")]
    date: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct ClusterRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "CPU")]
    cpu: i64,
    #[tabled(rename = "Sockets")]
    sockets: i64,
    #[tabled(rename = "VMs")]
    vms: i64,
}

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub async fn get_hosts(client: &ApiClient, query: Query, format: OutputFormat) -> Result<()> {
    let hosts: Listing<Host> = client.get("hosts", &query).await?;
    print_listing(&hosts, format, |h| HostRow {
        hostname: h.hostname.clone(),
        location: h.location.clone(),
        environment: h.environment.clone(),
        os: h.os.clone(),
        cores: h.cpu_cores,
        cluster: h.cluster.clone().unwrap_or_else(|| "-".to_string()),
        databases: format_list(&h.databases),
    })
}

pub async fn get_addms(client: &ApiClient, query: Query, format: OutputFormat) -> Result<()> {
    let addms: Listing<Addm> = client.get("addms", &query).await?;
    print_listing(&addms, format, |a| AddmRow {
        hostname: a.hostname.clone(),
        dbname: a.dbname.clone(),
        environment: a.environment.clone(),
        benefit: format!("{:.2}%", a.benefit),
        finding: a.finding.clone(),
    })
}

pub async fn get_segment_advisors(
    client: &ApiClient,
    query: Query,
    format: OutputFormat,
) -> Result<()> {
    let advisors: Listing<SegmentAdvisor> = client.get("segment-advisors", &query).await?;
    print_listing(&advisors, format, |s| SegmentAdvisorRow {
        hostname: s.hostname.clone(),
        dbname: s.dbname.clone(),
        segment: format!("{}.{}", s.segment_owner, s.segment_name),
        segment_type: s.segment_type.clone(),
        reclaimable: s.reclaimable.clone(),
    })
}

pub async fn get_patch_advisors(
    client: &ApiClient,
    query: Query,
    format: OutputFormat,
) -> Result<()> {
    let advisors: Listing<PatchAdvisor> = client.get("patch-advisors", &query).await?;
    print_listing(&advisors, format, |p| PatchAdvisorRow {
        hostname: p.hostname.clone(),
        dbname: p.dbname.clone(),
        dbver: p.dbver.clone(),
        date: p
            .date
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string()),
        status: color_status(&p.status),
    })
}

pub async fn get_clusters(client: &ApiClient, query: Query, format: OutputFormat) -> Result<()> {
    let clusters: Listing<Cluster> = client.get("clusters", &query).await?;
    print_listing(&clusters, format, |c| ClusterRow {
        name: c.name.clone(),
        kind: c.kind.clone(),
        cpu: c.cpu,
        sockets: c.sockets,
        vms: c.vms_count,
    })
}

pub async fn get_alerts(client: &ApiClient, query: Query, format: OutputFormat) -> Result<()> {
    let alerts: Listing<Alert> = client.get("alerts", &query).await?;
    print_listing(&alerts, format, |a| AlertRow {
        id: a.id.clone(),
        date: format_timestamp(&a.date),
        severity: color_severity(&a.alert_severity),
        status: color_status(&a.alert_status),
        code: a.alert_code.clone(),
        hostname: a.hostname.clone(),
        description: a.description.clone(),
    })
}
