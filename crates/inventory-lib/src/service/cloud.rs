use tracing::{info, warn};

use super::InventoryService;
use crate::error::{InventoryError, PartialFailure, Result};
use crate::models::{
    AwsRecommendation, OciProfile, OciProfileRequest, OciRecommendation, ProfileId,
    UNUSED_LOAD_BALANCER,
};

/// Items gathered from several profiles plus the profiles that failed
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilesOutcome<T> {
    pub items: Vec<T>,
    pub errors: PartialFailure,
}

impl<T> Default for ProfilesOutcome<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            errors: PartialFailure::new(),
        }
    }
}

impl<T> ProfilesOutcome<T> {
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl InventoryService {
    pub async fn list_oci_profiles(&self) -> Result<Vec<OciProfile>> {
        Ok(self.db.list_oci_profiles().await?)
    }

    pub async fn add_oci_profile(&self, request: OciProfileRequest) -> Result<OciProfile> {
        self.ensure_writable()?;
        check_required_fields(&request)?;
        let (profile, private_key) = request.into_profile(ProfileId::new());
        let private_key = non_blank(private_key)
            .ok_or_else(|| InventoryError::BadRequest("privateKey is required".to_string()))?;

        self.db.insert_oci_profile(&profile, &private_key).await?;
        info!(profile_id = %profile.id, profile = %profile.profile, "OCI profile added");
        Ok(profile)
    }

    /// Replaces a stored profile, keeping its private key unless a new one is given
    pub async fn update_oci_profile(
        &self,
        id: &str,
        request: OciProfileRequest,
    ) -> Result<OciProfile> {
        self.ensure_writable()?;
        let id = parse_profile_id(id)?;
        check_required_fields(&request)?;
        let (profile, private_key) = request.into_profile(id);

        if !self
            .db
            .update_oci_profile(&profile, non_blank(private_key).as_deref())
            .await?
        {
            return Err(InventoryError::not_found(format!("profile {id}")));
        }
        info!(profile_id = %id, "OCI profile updated");
        Ok(profile)
    }

    pub async fn delete_oci_profile(&self, id: &str) -> Result<()> {
        self.ensure_writable()?;
        let id = parse_profile_id(id)?;
        if !self.db.delete_oci_profile(&id).await? {
            return Err(InventoryError::not_found(format!("profile {id}")));
        }
        info!(profile_id = %id, "OCI profile deleted");
        Ok(())
    }

    pub async fn oci_unused_load_balancers(
        &self,
        ids: &[String],
    ) -> Result<ProfilesOutcome<OciRecommendation>> {
        self.oci_recommendations(ids, Some(UNUSED_LOAD_BALANCER)).await
    }

    /// Recommendations of every listed profile.
    ///
    /// Unknown or malformed ids are collected into the outcome's errors; the
    /// call fails only when nothing at all could be returned.
    pub async fn oci_recommendations(
        &self,
        ids: &[String],
        kind: Option<&str>,
    ) -> Result<ProfilesOutcome<OciRecommendation>> {
        if ids.is_empty() {
            return Err(InventoryError::BadRequest(
                "Ids not present or malformed".to_string(),
            ));
        }

        let mut outcome = ProfilesOutcome::default();
        let mut invalid = 0;
        for raw in ids {
            let id = match raw.parse::<ProfileId>() {
                Ok(id) => id,
                Err(_) => {
                    invalid += 1;
                    outcome.errors.push(format!("invalid profile id {raw}"));
                    continue;
                }
            };
            if self.db.get_oci_profile(&id).await?.is_none() {
                outcome.errors.push(format!("profile {id} not found"));
                continue;
            }
            outcome
                .items
                .extend(self.db.oci_recommendations(&id, kind).await?);
        }

        if outcome.items.is_empty() {
            if invalid == ids.len() {
                return Err(InventoryError::InvalidProfileId);
            }
            return Err(InventoryError::not_found("recommendations"));
        }
        if outcome.is_partial() {
            warn!(errors = %outcome.errors, "Some OCI profiles could not be read");
        }
        Ok(outcome)
    }

    /// Recommendations of the AWS profiles currently selected
    pub async fn aws_recommendations(&self) -> Result<Vec<AwsRecommendation>> {
        let profiles = self.db.selected_aws_profiles().await?;
        if profiles.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.db.aws_recommendations_by_profiles(&profiles).await?)
    }

    /// Recommendations of the latest collection run
    pub async fn last_aws_recommendations(&self) -> Result<Vec<AwsRecommendation>> {
        match self.db.last_aws_seq_value().await? {
            Some(seq_value) => Ok(self.db.aws_recommendations_by_seq_value(seq_value).await?),
            None => Ok(Vec::new()),
        }
    }
}

fn parse_profile_id(id: &str) -> Result<ProfileId> {
    id.parse().map_err(|_| InventoryError::InvalidProfileId)
}

fn check_required_fields(request: &OciProfileRequest) -> Result<()> {
    match request.missing_field() {
        Some(field) => Err(InventoryError::BadRequest(format!("{field} is required"))),
        None => Ok(()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
