use chrono::{DateTime, Utc};
use tracing::info;

use super::InventoryService;
use crate::error::{InventoryError, Result};
use crate::filter::{GlobalFilter, HostsFilter};
use crate::models::{HostDocument, HostSummary, LmsRow};
use crate::pagination::SearchResult;

impl InventoryService {
    pub async fn search_hosts(&self, filter: &HostsFilter) -> Result<SearchResult<HostSummary>> {
        Ok(self.db.search_hosts(filter).await?)
    }

    /// Rows of the LMS workbook, always unpaged
    pub async fn search_hosts_lms(&self, filter: &HostsFilter) -> Result<Vec<LmsRow>> {
        let filter = HostsFilter {
            report: filter.report.clone().unpaged(),
            ..filter.clone()
        };
        Ok(self.db.search_hosts_lms(&filter).await?)
    }

    /// Raw host documents
    pub async fn search_host_documents(
        &self,
        filter: &HostsFilter,
    ) -> Result<SearchResult<HostDocument>> {
        Ok(self.db.search_host_documents(filter).await?)
    }

    pub async fn get_host(
        &self,
        hostname: &str,
        older_than: Option<DateTime<Utc>>,
    ) -> Result<HostDocument> {
        self.db
            .get_host(hostname, older_than)
            .await?
            .ok_or_else(|| InventoryError::not_found(format!("host {hostname}")))
    }

    pub async fn archive_host(&self, hostname: &str) -> Result<()> {
        self.ensure_writable()?;
        if !self.db.archive_host(hostname).await? {
            return Err(InventoryError::not_found(format!("host {hostname}")));
        }
        info!(hostname = %hostname, "Host archived");
        Ok(())
    }

    pub async fn list_locations(&self, filter: &GlobalFilter) -> Result<Vec<String>> {
        Ok(self.db.list_locations(filter).await?)
    }

    pub async fn list_environments(&self, filter: &GlobalFilter) -> Result<Vec<String>> {
        Ok(self.db.list_environments(filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{service, service_with_mode};
    use super::*;
    use crate::error::ErrorKind;
    use crate::filter::ReportFilter;
    use crate::pagination::PageRequest;
    use crate::testing::{Call, StubDatabase};
    use bson::doc;

    #[tokio::test]
    async fn test_get_missing_host_returns_not_found() {
        let (svc, _) = service(StubDatabase::new());
        let err = svc.get_host("ghost", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "host ghost not found");
    }

    #[tokio::test]
    async fn test_get_host_returns_document() {
        let (svc, _) = service(StubDatabase::with(|d| {
            d.host = Some(HostDocument(doc! { "hostname": "itl-csllab-112" }));
        }));
        let host = svc.get_host("itl-csllab-112", None).await.unwrap();
        assert_eq!(host.hostname(), Some("itl-csllab-112"));
    }

    #[tokio::test]
    async fn test_archive_in_read_only_mode_skips_database() {
        let (svc, stub) = service_with_mode(StubDatabase::new(), true);
        let err = svc.archive_host("itl-csllab-112").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn test_archive_missing_host_returns_not_found() {
        let (svc, stub) = service(StubDatabase::new());
        let err = svc.archive_host("ghost").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(stub.calls(), vec![Call::ArchiveHost("ghost".into())]);
    }

    #[tokio::test]
    async fn test_archive_existing_host() {
        let (svc, _) = service(StubDatabase::with(|d| d.archivable = true));
        svc.archive_host("itl-csllab-112").await.unwrap();
    }

    #[tokio::test]
    async fn test_lms_rows_are_never_paged() {
        let (svc, stub) = service(StubDatabase::new());
        let mut filter = HostsFilter::default();
        filter.report = ReportFilter::default();
        filter.report.search.page = Some(PageRequest::new(1, 10));

        svc.search_hosts_lms(&filter).await.unwrap();

        match &stub.calls()[0] {
            Call::SearchHostsLms(sent) => assert_eq!(sent.report.search.page, None),
            other => panic!("unexpected call {other:?}"),
        }
    }
}
