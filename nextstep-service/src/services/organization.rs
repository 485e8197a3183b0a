//! Organization administration.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::models::Organization;
use crate::store::OrganizationRepository;

use super::error::{NextStepError, ServiceResult};

pub struct OrganizationService {
    organizations: Arc<dyn OrganizationRepository>,
}

impl OrganizationService {
    pub fn new(organizations: Arc<dyn OrganizationRepository>) -> Self {
        Self { organizations }
    }

    pub async fn create_organization(
        &self,
        organization_id: String,
        display_name_key: Option<String>,
        is_default: bool,
        order_number: u32,
    ) -> ServiceResult<Organization> {
        if self.organizations.get(&organization_id).await?.is_some() {
            return Err(NextStepError::OrganizationAlreadyExists(organization_id));
        }
        let organization = Organization {
            organization_id,
            display_name_key,
            is_default,
            order_number,
            timestamp_created: Utc::now(),
        };
        self.organizations.save(organization.clone()).await?;
        info!(organization_id = %organization.organization_id, "organization created");
        Ok(organization)
    }

    pub async fn get_organization(&self, organization_id: &str) -> ServiceResult<Organization> {
        self.organizations
            .get(organization_id)
            .await?
            .ok_or_else(|| NextStepError::OrganizationNotFound(organization_id.to_string()))
    }

    pub async fn list_organizations(&self) -> ServiceResult<Vec<Organization>> {
        Ok(self.organizations.list().await?)
    }

    pub async fn delete_organization(&self, organization_id: &str) -> ServiceResult<()> {
        if !self.organizations.delete(organization_id).await? {
            return Err(NextStepError::OrganizationNotFound(
                organization_id.to_string(),
            ));
        }
        info!(organization_id, "organization deleted");
        Ok(())
    }
}
