use tracing::info;

use super::InventoryService;
use crate::error::{DatabaseError, InventoryError, Result};
use crate::filter::{AlertsMode, AlertsSearchFilter, AlertsSelection};
use crate::models::{Alert, AlertStatus, AlertsPage};

impl InventoryService {
    pub async fn search_alerts(&self, filter: &AlertsSearchFilter) -> Result<AlertsPage> {
        let filter = clamp_upper_bound(filter.clone());
        Ok(self.db.search_alerts(&filter).await?)
    }

    /// Every matching alert, one per row, for the spreadsheet export
    pub async fn alerts_for_export(&self, filter: &AlertsSearchFilter) -> Result<Vec<Alert>> {
        let mut filter = clamp_upper_bound(filter.clone());
        filter.mode = AlertsMode::All;
        filter.search = filter.search.unpaged();
        match self.db.search_alerts(&filter).await? {
            AlertsPage::All(alerts) => Ok(alerts.into_items()),
            AlertsPage::Aggregated(_) => Err(DatabaseError::Backend(
                "aggregated alerts returned for a plain listing".to_string(),
            )
            .into()),
        }
    }

    /// Marks the selected alerts as acknowledged; `NO_DATA` alerts are refused
    pub async fn ack_alerts(&self, selection: &AlertsSelection) -> Result<u64> {
        self.check_selection(selection)?;
        if self.db.count_no_data_alerts(selection).await? > 0 {
            return Err(InventoryError::Validation(
                "NO_DATA alerts cannot be acknowledged".to_string(),
            ));
        }
        let updated = self.db.update_alerts_status(selection, AlertStatus::Ack).await?;
        info!(updated = updated, "Alerts acknowledged");
        Ok(updated)
    }

    pub async fn dismiss_alerts(&self, selection: &AlertsSelection) -> Result<u64> {
        self.check_selection(selection)?;
        let updated = self
            .db
            .update_alerts_status(selection, AlertStatus::Dismissed)
            .await?;
        info!(updated = updated, "Alerts dismissed");
        Ok(updated)
    }

    fn check_selection(&self, selection: &AlertsSelection) -> Result<()> {
        self.ensure_writable()?;
        if selection.is_empty() {
            return Err(InventoryError::Validation(
                "the alert selection must not be empty".to_string(),
            ));
        }
        selection.object_ids()?;
        Ok(())
    }
}

/// `older-than` caps `to` when both are given; the database layer only reads `to`
fn clamp_upper_bound(mut filter: AlertsSearchFilter) -> AlertsSearchFilter {
    filter.to = match (filter.to, filter.global.older_than) {
        (Some(to), Some(older_than)) => Some(to.min(older_than)),
        (to, older_than) => to.or(older_than),
    };
    filter
}
