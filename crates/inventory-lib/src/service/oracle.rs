use chrono::Months;

use super::InventoryService;
use crate::error::{InventoryError, Result};
use crate::filter::{
    GlobalFilter, PatchAdvisorsFilter, PatchAdvisorsQuery, ReportFilter, TimeRange,
};
use crate::models::{Addm, Caller, PatchAdvisor, PdbChange, PluggableDatabase, SegmentAdvisor};
use crate::pagination::SearchResult;

impl InventoryService {
    pub async fn search_addms(
        &self,
        mut filter: ReportFilter,
        caller: Option<&Caller>,
    ) -> Result<SearchResult<Addm>> {
        filter.global = self.with_allowed_locations(filter.global, caller).await?;
        Ok(self.db.search_addms(&filter).await?)
    }

    pub async fn search_segment_advisors(
        &self,
        mut filter: ReportFilter,
        caller: Option<&Caller>,
    ) -> Result<SearchResult<SegmentAdvisor>> {
        filter.global = self.with_allowed_locations(filter.global, caller).await?;
        Ok(self.db.search_segment_advisors(&filter).await?)
    }

    /// Resolves the patch window against the current time before querying
    pub async fn search_patch_advisors(
        &self,
        filter: PatchAdvisorsFilter,
        caller: Option<&Caller>,
    ) -> Result<SearchResult<PatchAdvisor>> {
        let mut report = filter.report;
        report.global = self.with_allowed_locations(report.global, caller).await?;

        let window_start = match filter.window_months {
            None => None,
            Some(months) => Some(
                self.now()
                    .checked_sub_months(Months::new(months))
                    .ok_or_else(|| {
                        InventoryError::Validation(format!(
                            "window-time of {months} months is out of range"
                        ))
                    })?,
            ),
        };

        let query = PatchAdvisorsQuery {
            report,
            window_start,
            status: filter.status,
        };
        Ok(self.db.search_patch_advisors(&query).await?)
    }

    pub async fn list_pluggable_databases(
        &self,
        filter: GlobalFilter,
        caller: Option<&Caller>,
    ) -> Result<Vec<PluggableDatabase>> {
        let filter = self.with_allowed_locations(filter, caller).await?;
        Ok(self.db.list_pluggable_databases(&filter).await?)
    }

    pub async fn pluggable_database_changes(
        &self,
        hostname: &str,
        pdb: &str,
        range: &TimeRange,
    ) -> Result<Vec<PdbChange>> {
        Ok(self.db.pluggable_database_changes(hostname, pdb, range).await?)
    }
}
