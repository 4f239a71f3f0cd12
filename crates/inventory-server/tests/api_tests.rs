//! Integration tests for the inventory API endpoints

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use chrono::{DateTime, Months, TimeZone, Utc};
use inventory_lib::{
    filter::{AlertsMode, HostsMode},
    health::{components, HealthRegistry},
    models::{
        Addm, Alert, AlertAggregate, AlertSeverity, AlertStatus, AlertsPage, Caller, Cluster,
        HostDocument, HostSummary, LmsRow, OciRecommendation, PatchAdvisor, PatchStatus,
        ProfileId, SegmentAdvisor, Vm, UNUSED_LOAD_BALANCER,
    },
    observability::{ApiMetrics, StructuredLogger},
    testing::{Call, StubData, StubDatabase},
    InventoryService, PageRequest, SearchResult,
};
use inventory_server::api::{create_router, AppState, ErrorResponse};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;

const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const LMS_XLSX: &str =
    "application/vnd.oracle.lms+vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const MONGO_HOST_DATA: &str = "application/vnd.ercole.mongohostdata+json";

async fn setup_test_app(stub: StubDatabase, read_only: bool) -> (Router, Arc<StubDatabase>) {
    let stub = Arc::new(stub);
    let service = InventoryService::new(stub.clone(), read_only);

    let health_registry = HealthRegistry::new();
    health_registry.register(components::DATABASE).await;
    health_registry.register(components::API).await;

    let state = Arc::new(AppState::new(
        service,
        health_registry,
        ApiMetrics::new(),
        StructuredLogger::new("test-node"),
    ));
    (create_router(state), stub)
}

async fn stub_app(configure: impl FnOnce(&mut StubData)) -> (Router, Arc<StubDatabase>) {
    setup_test_app(StubDatabase::with(configure), false).await
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_accepting(uri: &str, accept: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::ACCEPT, accept)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn worksheet(response: axum::response::Response, name: &str) -> Range<Data> {
    let bytes = body_bytes(response).await;
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    workbook.worksheet_range(name).unwrap()
}

fn cell(range: &Range<Data>, row: u32, col: u32) -> Data {
    range.get_value((row, col)).cloned().unwrap_or(Data::Empty)
}

fn text(value: &str) -> Data {
    Data::String(value.to_string())
}

fn header_row(range: &Range<Data>, row: u32, width: u32) -> Vec<Data> {
    (0..width).map(|col| cell(range, row, col)).collect()
}

fn texts(values: &[&str]) -> Vec<Data> {
    values.iter().map(|v| text(v)).collect()
}

fn addm() -> Addm {
    Addm {
        hostname: "test-db".into(),
        location: "Italy".into(),
        environment: "TST".into(),
        dbname: "ERCOLE".into(),
        created_at: Utc.with_ymd_and_hms(2020, 4, 10, 8, 46, 58).unwrap(),
        action: "Run SQL Tuning Advisor".into(),
        benefit: 83.34,
        finding: "SQL statements consuming significant database time".into(),
        recommendation: "SQL Tuning".into(),
    }
}

fn when() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 4, 15, 8, 46, 58).unwrap()
}

fn host_summary() -> HostSummary {
    HostSummary {
        hostname: "test-virt".into(),
        location: "Italy".into(),
        environment: "PROD".into(),
        host_type: "oracle".into(),
        cluster: Some("Puzzait".into()),
        physical_host: Some("s157-cb32c10a56c256746c337e21b3f82402".into()),
        version: "latest".into(),
        created_at: when(),
        databases: vec!["ERCOLE".into()],
        os: "Red Hat Enterprise Linux 7.6".into(),
        kernel: "Linux 3.10.0-514.el7.x86_64".into(),
        oracle_cluster: false,
        sun_cluster: false,
        veritas_cluster: false,
        is_virtual: true,
        hardware_abstraction_technology: "VMWARE".into(),
        cpu_threads: 2,
        cpu_cores: 1,
        socket: 2,
        mem_total: 3.0,
        swap_total: 4.0,
        cpu_model: "Intel(R) Xeon(R) CPU E5-2680 v3 @ 2.50GHz".into(),
        database_details: None,
    }
}

fn lms_row() -> LmsRow {
    LmsRow {
        physical_server_name: "esx-01".into(),
        virtual_server_name: "test-virt".into(),
        virtualization_technology: "VMware".into(),
        db_instance_name: "ERCOLE".into(),
        pluggable_database_name: String::new(),
        connect_string: String::new(),
        product_version: "12".into(),
        product_edition: "Enterprise".into(),
        environment: "PROD".into(),
        features: "Diagnostics Pack".into(),
        rac_node_names: String::new(),
        processor_model: "Intel(R) Xeon(R) CPU E5-2680 v3 @ 2.50GHz".into(),
        processors: 2,
        cores_per_processor: 1,
        physical_cores: 2,
        threads_per_core: 2,
        processor_speed: "2.50GHz".into(),
        server_purchase_date: String::new(),
        operating_system: "Red Hat Enterprise Linux 7.6".into(),
        notes: String::new(),
    }
}

fn segment_advisor() -> SegmentAdvisor {
    SegmentAdvisor {
        hostname: "test-db".into(),
        location: "Italy".into(),
        environment: "TST".into(),
        dbname: "ERCOLE".into(),
        created_at: when(),
        partition_name: String::new(),
        reclaimable: "<1".into(),
        recommendation: "Perform shrink, estimated savings is 5 bytes.".into(),
        segment_name: "AUD$".into(),
        segment_owner: "SYS".into(),
        segment_type: "TABLE".into(),
    }
}

fn patch_advisor() -> PatchAdvisor {
    PatchAdvisor {
        hostname: "test-db".into(),
        location: "Italy".into(),
        environment: "TST".into(),
        created_at: when(),
        dbname: "ERCOLE".into(),
        dbver: "12.2.0.1.0 Enterprise Edition".into(),
        description: String::new(),
        date: None,
        status: PatchStatus::Ko,
    }
}

fn alert() -> Alert {
    Alert {
        id: "5e96ade270c184faca93fe36".into(),
        alert_affected_technology: None,
        alert_category: "ENGINE".into(),
        alert_code: "NEW_SERVER".into(),
        alert_severity: AlertSeverity::Info,
        alert_status: AlertStatus::New,
        date: when(),
        description: "The server 'test-virt' was added to ercole".into(),
        hostname: "test-virt".into(),
        other_info: serde_json::json!({ "hostname": "test-virt" }),
    }
}

fn load_balancer(profile: ProfileId) -> OciRecommendation {
    OciRecommendation {
        profile_id: profile.to_string(),
        kind: UNUSED_LOAD_BALANCER.into(),
        compartment_id: "ocid1.compartment.oc1..aaaa".into(),
        compartment_name: "ercole".into(),
        name: "lb-test".into(),
        resource_id: "ocid1.loadbalancer.oc1..bbbb".into(),
        object_type: "load balancer".into(),
        details: Vec::new(),
        created_at: Utc.with_ymd_and_hms(2022, 5, 3, 10, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_ping() {
    let (app, _) = stub_app(|_| {}).await;

    let response = app.oneshot(get("/ping")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"Pong");
}

#[tokio::test]
async fn test_paged_addms_carry_metadata() {
    let (app, stub) = stub_app(|d| {
        d.addms = SearchResult::paged(vec![addm()], PageRequest::new(1, 1), 3);
    })
    .await;

    let response = app
        .oneshot(get("/addms?search=foo%20bar&sort-by=Benefit&sort-desc=true&page=1&size=1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["Content"][0]["Hostname"], "test-db");
    assert_eq!(body["Metadata"]["TotalElements"], 3);
    assert_eq!(body["Metadata"]["TotalPages"], 3);
    assert_eq!(body["Metadata"]["First"], true);
    assert_eq!(body["Metadata"]["Last"], false);

    match &stub.calls()[0] {
        Call::SearchAddms(filter) => {
            assert_eq!(filter.search.keywords, vec!["foo", "bar"]);
            assert_eq!(filter.search.page, Some(PageRequest::new(1, 1)));
            let sort = filter.search.sort.as_ref().unwrap();
            assert_eq!(sort.field, "Benefit");
            assert!(sort.descending);
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_unpaged_addms_are_a_bare_list() {
    let (app, _) = stub_app(|d| d.addms = SearchResult::Unpaged(vec![addm()])).await;

    let response = app.oneshot(get("/addms")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.is_array());
    assert_eq!(body[0]["Dbname"], "ERCOLE");
}

#[tokio::test]
async fn test_second_page_echoes_store_metadata() {
    let (app, stub) = stub_app(|d| {
        d.addms = SearchResult::paged(vec![addm(), addm()], PageRequest::new(2, 3), 5);
    })
    .await;

    let response = app
        .oneshot(get(
            "/addms?search=foobar&sort-by=Benefit&sort-desc=true&page=2&size=3\
             &location=Italy&environment=TST&older-than=2020-06-10T11:54:59Z",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["Content"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["Metadata"],
        serde_json::json!({
            "Number": 2,
            "Size": 3,
            "TotalElements": 5,
            "TotalPages": 2,
            "First": false,
            "Last": true,
            "Empty": false,
        })
    );

    match &stub.calls()[0] {
        Call::SearchAddms(filter) => {
            assert_eq!(filter.global.locations, vec!["Italy"]);
            assert_eq!(filter.global.environment.as_deref(), Some("TST"));
            assert_eq!(
                filter.global.older_than,
                Some(Utc.with_ymd_and_hms(2020, 6, 10, 11, 54, 59).unwrap())
            );
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_unbounded_sentinel_means_unpaged() {
    let (app, stub) = stub_app(|d| d.addms = SearchResult::Unpaged(vec![addm()])).await;

    let response = app.oneshot(get("/addms?page=-1&size=-1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await.is_array());
    match &stub.calls()[0] {
        Call::SearchAddms(filter) => assert_eq!(filter.search.page, None),
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_filter_is_rejected_before_querying() {
    let (app, stub) = stub_app(|_| {}).await;

    let response = app
        .oneshot(get("/addms?older-than=yesterday"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body.error.contains("older-than"));
    assert_eq!(body.message, "Unprocessable Entity");
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_zero_page_size_is_rejected() {
    let (app, stub) = stub_app(|_| {}).await;

    let response = app
        .oneshot(get("/segment-advisors?page=1&size=0"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_addms_export_as_workbook() {
    let (app, stub) = stub_app(|d| d.addms = SearchResult::Unpaged(vec![addm()])).await;

    let request = Request::builder()
        .uri("/addms?page=2&size=10")
        .header(header::ACCEPT, XLSX)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"addms.xlsx\""
    );

    let bytes = body_bytes(response).await;
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    let sheet = workbook.worksheet_range("Addm").unwrap();
    assert_eq!(
        sheet.get_value((0, 0)),
        Some(&Data::String("Action".into()))
    );
    assert_eq!(
        sheet.get_value((1, 6)),
        Some(&Data::String("test-db".into()))
    );
    assert_eq!(sheet.get_value((1, 1)), Some(&Data::Float(83.34)));

    // Exports ignore paging
    match &stub.calls()[0] {
        Call::SearchAddms(filter) => assert_eq!(filter.search.page, None),
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_caller_locations_restrict_reports() {
    let (app, stub) = stub_app(|d| d.allowed_locations = vec!["Italy".into()]).await;

    let request = Request::builder()
        .uri("/postgresql/instances")
        .extension(Caller::new("carol"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let calls = stub.calls();
    assert_eq!(calls[0], Call::AllowedLocations("carol".into()));
    match &calls[1] {
        Call::SearchPostgreSqlInstances(filter) => {
            assert_eq!(filter.global.locations, vec!["Italy"])
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_archive_host_in_read_only_mode_is_forbidden() {
    let (app, stub) = setup_test_app(StubDatabase::new(), true).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/hosts/foobar")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_archive_host() {
    let (app, stub) = stub_app(|d| d.archivable = true).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/hosts/foobar")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(stub.calls(), vec![Call::ArchiveHost("foobar".into())]);
}

#[tokio::test]
async fn test_archive_unknown_host_is_not_found() {
    let (app, _) = stub_app(|_| {}).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/hosts/foobar")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.error, "host foobar not found");
}

#[tokio::test]
async fn test_unknown_cluster_is_not_found() {
    let (app, _) = stub_app(|_| {}).await;

    let response = app.oneshot(get("/clusters/Puzzait")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_database_failure_is_internal_error() {
    let (app, _) = setup_test_app(StubDatabase::failing("connection reset"), false).await;

    let response = app.oneshot(get("/locations")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.message, "Internal Server Error");
}

#[tokio::test]
async fn test_load_balancers_with_partial_failure() {
    let profile = ProfileId::new();
    let (app, _) = stub_app(|d| {
        d.oci_profiles = vec![serde_json::from_value(serde_json::json!({
            "id": profile.to_string(),
            "profile": "default",
            "tenancyOCID": "ocid1.tenancy.oc1..aaaa",
            "userOCID": "ocid1.user.oc1..aaaa",
            "keyFingerprint": "aa:bb",
            "region": "eu-frankfurt-1",
        }))
        .unwrap()];
        d.oci_recommendations = HashMap::from([(profile, vec![load_balancer(profile)])]);
    })
    .await;

    let response = app
        .oneshot(get(&format!("/oracle-cloud/loadbalancers?ids={profile},aaa")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    let body = body_json(response).await;
    assert_eq!(body["recommendations"][0]["name"], "lb-test");
    assert_eq!(body["error"], "1 error occurred: 'invalid profile id aaa'");
}

#[tokio::test]
async fn test_load_balancers_without_ids() {
    let (app, stub) = stub_app(|_| {}).await;

    let response = app
        .oneshot(get("/oracle-cloud/loadbalancers"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_load_balancers_with_only_invalid_ids() {
    let (app, _) = stub_app(|_| {}).await;

    let response = app
        .oneshot(get("/oracle-cloud/loadbalancers?ids=aaa,bbb"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_load_balancers_of_unknown_profiles() {
    let (app, _) = stub_app(|_| {}).await;

    let uri = format!("/oracle-cloud/loadbalancers?ids={}", ProfileId::new());
    let response = app.oneshot(get(&uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ack_refuses_no_data_alerts() {
    let (app, stub) = stub_app(|d| d.no_data_alerts = 1).await;

    let response = app
        .oneshot(post_json(
            "/alerts/ack",
            r#"{"ids": ["5e96ade270c184faca93fe36"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!stub
        .calls()
        .iter()
        .any(|call| matches!(call, Call::UpdateAlertsStatus(..))));
}

#[tokio::test]
async fn test_ack_alerts() {
    let (app, _) = stub_app(|d| d.updated_alerts = 2).await;

    let response = app
        .oneshot(post_json(
            "/alerts/ack",
            r#"{"ids": ["5e96ade270c184faca93fe36", "5e96ade270c184faca93fe37"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["updated"], 2);
}

#[tokio::test]
async fn test_dismiss_with_malformed_body() {
    let (app, stub) = stub_app(|_| {}).await;

    let response = app
        .oneshot(post_json("/alerts/dismiss", "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_healthz_returns_ok_when_healthy() {
    let (app, _) = stub_app(|_| {}).await;

    let response = app.oneshot(get("/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert!(health["components"]["database"].is_object());
}

#[tokio::test]
async fn test_readyz_probes_the_database() {
    let (app, stub) = stub_app(|_| {}).await;

    let response = app.oneshot(get("/readyz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["ready"], true);
    assert_eq!(stub.calls(), vec![Call::Ping]);
}

#[tokio::test]
async fn test_readyz_returns_unavailable_without_database() {
    let (app, _) = setup_test_app(StubDatabase::failing("no route to host"), false).await;

    let response = app.oneshot(get("/readyz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["ready"], false);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let (app, _) = stub_app(|_| {}).await;

    let response = app.clone().oneshot(get("/ping")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("inventory_api_request_duration_seconds"));
    assert!(text.contains("route=\"/ping\""));
}

#[tokio::test]
async fn test_location_lookup_failure_is_unprocessable() {
    let (app, stub) = setup_test_app(StubDatabase::failing("directory unreachable"), false).await;

    let request = Request::builder()
        .uri("/addms")
        .extension(Caller::new("carol"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body.error.contains("carol"));
    assert_eq!(stub.calls(), vec![Call::AllowedLocations("carol".into())]);
}

#[tokio::test]
async fn test_hosts_summary_as_json() {
    let (app, stub) = stub_app(|d| d.hosts = SearchResult::Unpaged(vec![host_summary()])).await;

    let response = app.oneshot(get("/hosts?mode=summary")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["Hostname"], "test-virt");
    assert_eq!(body[0]["OS"], "Red Hat Enterprise Linux 7.6");
    assert_eq!(body[0]["CPUCores"], 1);
    match &stub.calls()[0] {
        Call::SearchHosts(filter) => assert_eq!(filter.mode, HostsMode::Summary),
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_hosts_workbook_uses_summary_rows() {
    let (app, stub) = stub_app(|d| d.hosts = SearchResult::Unpaged(vec![host_summary()])).await;

    let response = app
        .oneshot(get_accepting("/hosts?page=1&size=5", XLSX))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"hosts.xlsx\""
    );
    let sheet = worksheet(response, "Hosts").await;
    assert_eq!(cell(&sheet, 0, 0), text("Hostname"));
    assert_eq!(cell(&sheet, 0, 20), text("CPUModel"));
    assert_eq!(cell(&sheet, 1, 0), text("test-virt"));
    assert_eq!(cell(&sheet, 1, 3), text("Puzzait"));
    assert_eq!(cell(&sheet, 1, 6), text("2020-04-15 08:46:58 UTC"));
    assert_eq!(cell(&sheet, 1, 13), Data::Bool(true));

    match &stub.calls()[0] {
        Call::SearchHosts(filter) => {
            assert_eq!(filter.mode, HostsMode::Summary);
            assert_eq!(filter.report.search.page, None);
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_lms_workbook_leaves_column_g_blank() {
    let (app, stub) = stub_app(|d| d.lms_rows = vec![lms_row()]).await;

    let response = app.oneshot(get_accepting("/hosts", LMS_XLSX)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], LMS_XLSX);
    let sheet = worksheet(response, "Database_&_EBS").await;
    assert_eq!(cell(&sheet, 0, 0), text("Oracle LMS - Database & EBS"));
    assert_eq!(cell(&sheet, 2, 0), text("Physical Server Name"));
    assert_eq!(cell(&sheet, 2, 5), text("Connect String"));
    assert_eq!(cell(&sheet, 2, 6), Data::Empty);
    assert_eq!(cell(&sheet, 2, 7), text("Product Version"));
    assert_eq!(cell(&sheet, 3, 0), text("esx-01"));
    assert_eq!(cell(&sheet, 3, 3), text("ERCOLE"));
    assert_eq!(cell(&sheet, 3, 6), Data::Empty);
    assert_eq!(cell(&sheet, 3, 7), text("12"));
    assert!(matches!(stub.calls()[0], Call::SearchHostsLms(_)));
}

#[tokio::test]
async fn test_hosts_as_extended_json_documents() {
    let mut document = bson::Document::new();
    document.insert(
        "_id",
        bson::oid::ObjectId::parse_str("5e96ade270c184faca93fe36").unwrap(),
    );
    document.insert("hostname", "test-virt");
    document.insert("createdAt", bson::DateTime::from_millis(1_586_940_418_471));
    let (app, stub) = stub_app(|d| {
        d.host_documents = SearchResult::Unpaged(vec![HostDocument(document)]);
    })
    .await;

    let response = app
        .oneshot(get_accepting("/hosts", MONGO_HOST_DATA))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["_id"]["$oid"], "5e96ade270c184faca93fe36");
    assert_eq!(body[0]["hostname"], "test-virt");
    assert!(body[0]["createdAt"]["$date"].is_string());
    assert!(matches!(stub.calls()[0], Call::SearchHostDocuments(_)));
}

#[tokio::test]
async fn test_patch_advisors_resolve_window_and_status() {
    let (app, stub) =
        stub_app(|d| d.patch_advisors = SearchResult::Unpaged(vec![patch_advisor()])).await;

    let earliest = Utc::now().checked_sub_months(Months::new(6)).unwrap();
    let response = app
        .oneshot(get("/patch-advisors?window-time=6&status=KO"))
        .await
        .unwrap();
    let latest = Utc::now().checked_sub_months(Months::new(6)).unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["Status"], "KO");
    assert!(body[0]["Date"].is_null());

    match &stub.calls()[0] {
        Call::SearchPatchAdvisors(query) => {
            assert_eq!(query.status, Some(PatchStatus::Ko));
            let start = query.window_start.unwrap();
            assert!(earliest <= start && start <= latest);
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_patch_advisors_reject_unknown_status() {
    let (app, stub) = stub_app(|_| {}).await;

    let response = app.oneshot(get("/patch-advisors?status=ok")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body.error.contains("status"));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_patch_advisors_workbook_columns() {
    let (app, _) =
        stub_app(|d| d.patch_advisors = SearchResult::Unpaged(vec![patch_advisor()])).await;

    let response = app
        .oneshot(get_accepting("/patch-advisors", XLSX))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sheet = worksheet(response, "Patch_Advisor").await;
    assert_eq!(
        header_row(&sheet, 0, 6),
        texts(&["Description", "Hostname", "Dbname", "Dbver", "Date", "Status"])
    );
    assert_eq!(cell(&sheet, 1, 1), text("test-db"));
    assert_eq!(cell(&sheet, 1, 4), Data::Empty);
    assert_eq!(cell(&sheet, 1, 5), text("KO"));
}

#[tokio::test]
async fn test_segment_advisors_workbook_columns() {
    let (app, _) =
        stub_app(|d| d.segment_advisors = SearchResult::Unpaged(vec![segment_advisor()])).await;

    let response = app
        .oneshot(get_accepting("/segment-advisors", XLSX))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sheet = worksheet(response, "Segment_Advisor").await;
    assert_eq!(
        header_row(&sheet, 0, 9),
        texts(&[
            "Dbname",
            "Environment",
            "Hostname",
            "PartitionName",
            "Reclaimable",
            "Recommendation",
            "SegmentName",
            "SegmentOwner",
            "SegmentType",
        ])
    );
    assert_eq!(cell(&sheet, 1, 0), text("ERCOLE"));
    assert_eq!(cell(&sheet, 1, 4), text("<1"));
    assert_eq!(cell(&sheet, 1, 6), text("AUD$"));
}

#[tokio::test]
async fn test_alerts_listing() {
    let (app, stub) = stub_app(|d| {
        d.alerts = AlertsPage::All(SearchResult::Unpaged(vec![alert()]));
    })
    .await;

    let response = app
        .oneshot(get("/alerts?severity=INFO&status=NEW&from=2020-04-01T00:00:00Z"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["alertCode"], "NEW_SERVER");
    assert_eq!(body[0]["alertSeverity"], "INFO");
    assert_eq!(body[0]["alertStatus"], "NEW");

    match &stub.calls()[0] {
        Call::SearchAlerts(filter) => {
            assert_eq!(filter.mode, AlertsMode::All);
            assert_eq!(filter.severity, Some(AlertSeverity::Info));
            assert_eq!(filter.status, Some(AlertStatus::New));
            assert_eq!(
                filter.from,
                Some(Utc.with_ymd_and_hms(2020, 4, 1, 0, 0, 0).unwrap())
            );
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_alerts_aggregated_by_code_and_severity() {
    let (app, stub) = stub_app(|d| {
        d.alerts = AlertsPage::Aggregated(SearchResult::Unpaged(vec![AlertAggregate {
            code: "NEW_SERVER".into(),
            severity: AlertSeverity::Info,
            count: 3,
            affected_hosts: 2,
            oldest_alert: when(),
        }]));
    })
    .await;

    let response = app
        .oneshot(get("/alerts?mode=aggregated-code-severity"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["Code"], "NEW_SERVER");
    assert_eq!(body[0]["Count"], 3);
    assert_eq!(body[0]["AffectedHosts"], 2);
    match &stub.calls()[0] {
        Call::SearchAlerts(filter) => assert_eq!(filter.mode, AlertsMode::AggregatedCodeSeverity),
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_alerts_workbook_lists_every_alert() {
    let (app, stub) = stub_app(|d| {
        d.alerts = AlertsPage::All(SearchResult::Unpaged(vec![alert()]));
    })
    .await;

    let response = app
        .oneshot(get_accepting(
            "/alerts?mode=aggregated-code-severity&page=1&size=10",
            XLSX,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sheet = worksheet(response, "Alerts").await;
    assert_eq!(
        header_row(&sheet, 0, 6),
        texts(&["Type", "Date", "Severity", "Hostname", "Code", "Description"])
    );
    assert_eq!(
        header_row(&sheet, 1, 6),
        texts(&[
            "ENGINE",
            "2020-04-15 08:46:58 UTC",
            "INFO",
            "test-virt",
            "NEW_SERVER",
            "The server 'test-virt' was added to ercole",
        ])
    );

    match &stub.calls()[0] {
        Call::SearchAlerts(filter) => {
            assert_eq!(filter.mode, AlertsMode::All);
            assert_eq!(filter.search.page, None);
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_clusters_listing() {
    let cluster = Cluster {
        name: "Puzzait".into(),
        kind: "vmware".into(),
        cpu: 140,
        sockets: 10,
        vms: vec![Vm {
            name: "test-virt".into(),
            hostname: "test-virt".into(),
            virtualization_node: "s157-cb32c10a56c256746c337e21b3f82402".into(),
            capped_cpu: false,
            is_ercole_installed: true,
            ..Vm::default()
        }],
        ..Cluster::default()
    };
    let (app, stub) = stub_app(|d| d.clusters = SearchResult::Unpaged(vec![cluster])).await;

    let response = app.oneshot(get("/clusters?location=Italy")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.is_array());
    assert_eq!(body[0]["Name"], "Puzzait");
    assert_eq!(body[0]["Type"], "vmware");
    assert_eq!(body[0]["VMsCount"], 1);
    assert_eq!(body[0]["VMsErcoleAgentCount"], 1);
    match &stub.calls()[0] {
        Call::SearchClusters(filter) => {
            assert_eq!(filter.report.global.locations, vec!["Italy"])
        }
        other => panic!("unexpected call {other:?}"),
    }
}
