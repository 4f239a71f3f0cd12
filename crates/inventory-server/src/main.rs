//! Inventory server - reporting API over the collected host inventory
//!
//! Serves host, database, cluster, alert and cloud recommendation reports
//! as JSON or spreadsheet exports.

use anyhow::Result;
use inventory_lib::{
    health::{components, HealthRegistry},
    observability::{ApiMetrics, StructuredLogger},
    InventoryService, MongoDatabase,
};
use inventory_server::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting inventory-server");

    let config = ServerConfig::load()?;
    info!(
        node_name = %config.node_name,
        database = %config.database_name,
        read_only = config.read_only,
        "Server configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::DATABASE).await;
    health_registry.register(components::API).await;

    let metrics = ApiMetrics::new();
    let logger = StructuredLogger::new(&config.node_name);

    let db = MongoDatabase::connect(&config.mongodb_uri, &config.database_name).await?;
    let service = InventoryService::new(Arc::new(db), config.read_only);

    // The server still starts when the store is down; /readyz reports it.
    if let Err(e) = health_registry.probe_database(&service).await {
        warn!(error = %e, "Database not reachable at startup");
    }

    logger.log_startup(SERVER_VERSION, config.port, config.read_only);

    let app_state = Arc::new(api::AppState::new(
        service,
        health_registry.clone(),
        metrics,
        logger.clone(),
    ));

    let api_handle = tokio::spawn(api::serve(config.port, app_state));

    tokio::select! {
        result = api_handle => {
            match result {
                Ok(Err(e)) => {
                    health_registry.set_unhealthy(components::API, e.to_string()).await;
                    return Err(e);
                }
                Err(e) => return Err(e.into()),
                Ok(Ok(())) => {}
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
