//! Service layer: one method per report, dispatching validated filters to the database
//!
//! Services apply the cross-cutting policies that do not belong to a query:
//! location defaulting from the caller's permissions, the read-only guard on
//! writes, and the domain rules of alerts and cloud profiles.

mod alerts;
mod cloud;
mod clusters;
mod hosts;
mod oracle;

pub use cloud::ProfilesOutcome;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::database::Database;
use crate::error::{InventoryError, Result};
use crate::filter::{GlobalFilter, ReportFilter, TimeRange};
use crate::models::{Caller, HostCores, PostgreSqlInstance};
use crate::pagination::SearchResult;

/// Source of the current time, replaceable in tests
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct InventoryService {
    db: Arc<dyn Database>,
    read_only: bool,
    clock: Clock,
}

impl InventoryService {
    pub fn new(db: Arc<dyn Database>, read_only: bool) -> Self {
        Self {
            db,
            read_only,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn database(&self) -> &Arc<dyn Database> {
        &self.db
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            Err(InventoryError::ReadOnly)
        } else {
            Ok(())
        }
    }

    /// Substitutes the caller's permitted locations when none were requested
    async fn with_allowed_locations(
        &self,
        mut filter: GlobalFilter,
        caller: Option<&Caller>,
    ) -> Result<GlobalFilter> {
        if filter.locations.is_empty() {
            if let Some(caller) = caller {
                filter.locations = self.db.allowed_locations(caller).await.map_err(|source| {
                    InventoryError::LocationLookup {
                        user: caller.username.clone(),
                        source,
                    }
                })?;
            }
        }
        Ok(filter)
    }

    pub async fn ping(&self) -> Result<()> {
        Ok(self.db.ping().await?)
    }

    pub async fn search_postgresql_instances(
        &self,
        mut filter: ReportFilter,
        caller: Option<&Caller>,
    ) -> Result<SearchResult<PostgreSqlInstance>> {
        filter.global = self.with_allowed_locations(filter.global, caller).await?;
        Ok(self.db.search_postgresql_instances(&filter).await?)
    }

    pub async fn host_cores(
        &self,
        filter: &GlobalFilter,
        range: &TimeRange,
    ) -> Result<Vec<HostCores>> {
        Ok(self.db.host_cores(filter, range).await?)
    }
}
