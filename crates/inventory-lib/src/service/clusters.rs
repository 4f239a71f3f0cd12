use chrono::{DateTime, Utc};

use super::InventoryService;
use crate::error::{InventoryError, Result};
use crate::filter::{ClustersFilter, ClustersMode};
use crate::models::Cluster;
use crate::pagination::SearchResult;

impl InventoryService {
    pub async fn search_clusters(&self, filter: &ClustersFilter) -> Result<SearchResult<Cluster>> {
        let clusters = self.db.search_clusters(filter).await?;
        Ok(match filter.mode {
            ClustersMode::Full => clusters.map(Cluster::with_computed_stats),
            ClustersMode::ClusterNames => clusters,
        })
    }

    pub async fn get_cluster(
        &self,
        name: &str,
        older_than: Option<DateTime<Utc>>,
    ) -> Result<Cluster> {
        self.db
            .get_cluster(name, older_than)
            .await?
            .map(Cluster::with_computed_stats)
            .ok_or_else(|| InventoryError::not_found(format!("cluster {name}")))
    }
}
