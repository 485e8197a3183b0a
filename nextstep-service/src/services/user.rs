//! User identity administration.

use std::sync::Arc;

use tracing::info;

use crate::models::{UserIdentity, UserIdentityStatus};
use crate::store::{OrganizationRepository, UserRepository};

use super::error::{NextStepError, ServiceResult};

pub struct UserService {
    users: Arc<dyn UserRepository>,
    organizations: Arc<dyn OrganizationRepository>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self {
            users,
            organizations,
        }
    }

    pub async fn create_user(
        &self,
        user_id: String,
        organization_id: Option<String>,
    ) -> ServiceResult<UserIdentity> {
        if let Some(organization_id) = &organization_id {
            self.organizations
                .get(organization_id)
                .await?
                .ok_or_else(|| NextStepError::OrganizationNotFound(organization_id.clone()))?;
        }
        if self.users.get(&user_id).await?.is_some() {
            return Err(NextStepError::UserIdentityAlreadyExists(user_id));
        }
        let user = UserIdentity::new(user_id, organization_id);
        self.users.save(user.clone()).await?;
        info!(user_id = %user.user_id, "user identity created");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> ServiceResult<UserIdentity> {
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| NextStepError::UserIdentityNotFound(user_id.to_string()))
    }

    /// Block or unblock a user identity. Blocking requires an ACTIVE user,
    /// unblocking a BLOCKED one.
    pub async fn update_user_status(
        &self,
        user_id: &str,
        status: UserIdentityStatus,
    ) -> ServiceResult<UserIdentity> {
        let mut user = self.get_user(user_id).await?;
        match status {
            UserIdentityStatus::Active => {
                if user.status != UserIdentityStatus::Blocked {
                    return Err(NextStepError::UserIdentityNotBlocked(user_id.to_string()));
                }
            }
            UserIdentityStatus::Blocked => {
                if user.status != UserIdentityStatus::Active {
                    return Err(NextStepError::UserIdentityNotActive(user_id.to_string()));
                }
            }
            UserIdentityStatus::Removed => {}
        }
        user.status = status;
        self.users.save(user.clone()).await?;
        info!(user_id, status = ?status, "user identity status updated");
        Ok(user)
    }

    /// A user must exist and be ACTIVE to authenticate.
    pub(crate) async fn require_active_user(&self, user_id: &str) -> ServiceResult<UserIdentity> {
        let user = self.get_user(user_id).await?;
        if !user.is_active() {
            return Err(NextStepError::UserIdentityNotActive(user_id.to_string()));
        }
        Ok(user)
    }
}
