//! Host maintenance commands

use anyhow::Result;

use crate::client::ApiClient;
use crate::output::print_success;

/// Archives a host so it drops out of the current inventory
pub async fn archive_host(client: &ApiClient, hostname: &str) -> Result<()> {
    client.delete(&format!("hosts/{hostname}")).await?;
    print_success(&format!("Host {hostname} archived"));
    Ok(())
}
