//! Prometheus metrics and structured lifecycle logging for the API server

use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Request latency buckets in seconds
const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

static GLOBAL_METRICS: OnceLock<ApiMetricsInner> = OnceLock::new();

struct ApiMetricsInner {
    request_duration_seconds: HistogramVec,
    request_errors: IntCounterVec,
    exported_rows: IntCounterVec,
}

impl ApiMetricsInner {
    fn new() -> Self {
        Self {
            request_duration_seconds: register_histogram_vec!(
                "inventory_api_request_duration_seconds",
                "Time spent serving an API request",
                &["method", "route"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register request_duration_seconds"),

            request_errors: register_int_counter_vec!(
                "inventory_api_request_errors_total",
                "Requests answered with a client or server error",
                &["route", "status"]
            )
            .expect("Failed to register request_errors"),

            exported_rows: register_int_counter_vec!(
                "inventory_api_exported_rows_total",
                "Rows written into spreadsheet exports",
                &["report"]
            )
            .expect("Failed to register exported_rows"),
        }
    }
}

/// Handle to the process-wide API metrics; clones share the same collectors
#[derive(Clone)]
pub struct ApiMetrics {
    _private: (),
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ApiMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ApiMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_request(&self, method: &str, route: &str, status: u16, duration_secs: f64) {
        let inner = self.inner();
        inner
            .request_duration_seconds
            .with_label_values(&[method, route])
            .observe(duration_secs);
        if status >= 400 {
            inner
                .request_errors
                .with_label_values(&[route, &status.to_string()])
                .inc();
        }
    }

    pub fn add_exported_rows(&self, report: &str, rows: usize) {
        self.inner()
            .exported_rows
            .with_label_values(&[report])
            .inc_by(rows as u64);
    }

    pub fn request_errors(&self, route: &str, status: u16) -> u64 {
        self.inner()
            .request_errors
            .with_label_values(&[route, &status.to_string()])
            .get()
    }

    /// Text exposition of the default registry
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Lifecycle and export events with a stable `event` field
#[derive(Clone)]
pub struct StructuredLogger {
    node_name: String,
}

impl StructuredLogger {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
        }
    }

    pub fn log_startup(&self, version: &str, port: u16, read_only: bool) {
        info!(
            event = "server_started",
            node = %self.node_name,
            version = %version,
            port = port,
            read_only = read_only,
            "Inventory API server started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "server_shutdown",
            node = %self.node_name,
            reason = %reason,
            "Inventory API server shutting down"
        );
    }

    pub fn log_export(&self, report: &str, media_type: &str, rows: usize, bytes: usize) {
        info!(
            event = "export_generated",
            node = %self.node_name,
            report = %report,
            media_type = %media_type,
            rows = rows,
            bytes = bytes,
            "Spreadsheet export generated"
        );
    }

    /// Server errors at error level, client errors at warn
    pub fn log_request_failed(&self, method: &str, route: &str, status: u16) {
        if status >= 500 {
            error!(
                event = "request_failed",
                node = %self.node_name,
                method = %method,
                route = %route,
                status = status,
                "Request failed"
            );
        } else {
            warn!(
                event = "request_failed",
                node = %self.node_name,
                method = %method,
                route = %route,
                status = status,
                "Request rejected"
            );
        }
    }

    pub fn log_partial_content(&self, route: &str, failures: usize) {
        warn!(
            event = "partial_content",
            node = %self.node_name,
            route = %route,
            failures = failures,
            "Request served with partial content"
        );
    }
}
