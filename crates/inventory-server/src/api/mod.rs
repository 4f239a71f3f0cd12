//! HTTP API: report routes plus health, readiness and Prometheus metrics

mod alerts;
mod charts;
mod cloud;
mod clusters;
mod error;
mod hosts;
mod oracle;
mod postgresql;
mod respond;

pub use error::{ApiError, ApiResult, ErrorResponse};

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use inventory_lib::{
    health::{ComponentStatus, HealthRegistry},
    observability::{ApiMetrics, StructuredLogger},
    InventoryService,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub service: InventoryService,
    pub health_registry: HealthRegistry,
    pub metrics: ApiMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        service: InventoryService,
        health_registry: HealthRegistry,
        metrics: ApiMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            service,
            health_registry,
            metrics,
            logger,
        }
    }
}

async fn ping() -> &'static str {
    "Pong"
}

/// 200 while every component is at least degraded, 503 otherwise
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Pings the database, then reports readiness
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // A failed probe is recorded in the registry and surfaces in the body.
    let _ = state
        .health_registry
        .probe_database(&state.service)
        .await;
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(text) => (
            StatusCode::OK,
            [("content-type", "text/plain; charset=utf-8")],
            text,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Records latency per route template and logs rejected requests
async fn track_requests(
    State(state): State<Arc<AppState>>,
    matched: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let route = matched
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = request.method().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    state
        .metrics
        .observe_request(&method, &route, status, started.elapsed().as_secs_f64());
    if status >= 400 {
        state.logger.log_request_failed(&method, &route, status);
    }
    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Hosts
        .route("/hosts", get(hosts::search_hosts))
        .route(
            "/hosts/:hostname",
            get(hosts::get_host).delete(hosts::archive_host),
        )
        .route("/locations", get(hosts::list_locations))
        .route("/environments", get(hosts::list_environments))
        // Oracle
        .route("/addms", get(oracle::search_addms))
        .route("/segment-advisors", get(oracle::search_segment_advisors))
        .route("/patch-advisors", get(oracle::search_patch_advisors))
        .route("/oracle/pdbs", get(oracle::list_pluggable_databases))
        .route(
            "/hosts/:hostname/oracle/pdbs/:pdb/changes",
            get(oracle::pluggable_database_changes),
        )
        // PostgreSQL
        .route(
            "/postgresql/instances",
            get(postgresql::search_postgresql_instances),
        )
        // Clusters
        .route("/clusters", get(clusters::search_clusters))
        .route("/clusters/:name", get(clusters::get_cluster))
        // Alerts
        .route("/alerts", get(alerts::search_alerts))
        .route("/alerts/ack", post(alerts::ack_alerts))
        .route("/alerts/dismiss", post(alerts::dismiss_alerts))
        // Charts
        .route("/charts/hosts/cores", get(charts::host_cores))
        // Cloud
        .route(
            "/oracle-cloud/loadbalancers",
            get(cloud::oci_unused_load_balancers),
        )
        .route(
            "/oracle-cloud/recommendations",
            get(cloud::oci_recommendations),
        )
        .route(
            "/oracle-cloud/configurations",
            get(cloud::list_oci_profiles).post(cloud::add_oci_profile),
        )
        .route(
            "/oracle-cloud/configurations/:id",
            put(cloud::update_oci_profile).delete(cloud::delete_oci_profile),
        )
        .route("/aws/recommendations", get(cloud::aws_recommendations))
        .route(
            "/aws/recommendations/last",
            get(cloud::last_aws_recommendations),
        )
        // Operations
        .route("/ping", get(ping))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            track_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
