//! Credential definitions and per-user credentials.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::models::{Credential, CredentialDefinition, CredentialStatus};
use crate::store::{CredentialDefinitionRepository, CredentialRepository, UserRepository};

use super::error::{NextStepError, ServiceResult};

pub struct CredentialService {
    definitions: Arc<dyn CredentialDefinitionRepository>,
    credentials: Arc<dyn CredentialRepository>,
    users: Arc<dyn UserRepository>,
}

impl CredentialService {
    pub fn new(
        definitions: Arc<dyn CredentialDefinitionRepository>,
        credentials: Arc<dyn CredentialRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            definitions,
            credentials,
            users,
        }
    }

    pub async fn create_definition(
        &self,
        name: String,
        organization_id: String,
        description: Option<String>,
        limit_soft: Option<u32>,
        limit_hard: Option<u32>,
    ) -> ServiceResult<CredentialDefinition> {
        if self.definitions.get(&name).await?.is_some() {
            return Err(NextStepError::CredentialDefinitionAlreadyExists(name));
        }
        let definition = CredentialDefinition {
            name,
            organization_id,
            description,
            limit_soft,
            limit_hard,
            active: true,
            timestamp_created: Utc::now(),
        };
        self.definitions.save(definition.clone()).await?;
        info!(name = %definition.name, "credential definition created");
        Ok(definition)
    }

    pub async fn get_definition(&self, name: &str) -> ServiceResult<CredentialDefinition> {
        self.definitions
            .get(name)
            .await?
            .ok_or_else(|| NextStepError::CredentialDefinitionNotFound(name.to_string()))
    }

    pub async fn list_definitions(&self) -> ServiceResult<Vec<CredentialDefinition>> {
        Ok(self.definitions.list().await?)
    }

    pub async fn delete_definition(&self, name: &str) -> ServiceResult<()> {
        if !self.definitions.delete(name).await? {
            return Err(NextStepError::CredentialDefinitionNotFound(name.to_string()));
        }
        info!(name, "credential definition deleted");
        Ok(())
    }

    /// Issues a credential for a user under an existing definition.
    pub async fn create_credential(
        &self,
        credential_name: String,
        user_id: String,
        value: String,
    ) -> ServiceResult<Credential> {
        let definition = self.get_definition(&credential_name).await?;
        if !definition.active {
            return Err(NextStepError::CredentialDefinitionNotFound(format!(
                "credential definition is not active: {}",
                credential_name
            )));
        }
        self.users
            .get(&user_id)
            .await?
            .ok_or_else(|| NextStepError::UserIdentityNotFound(user_id.clone()))?;
        validate_credential_value(&value)?;
        let credential = Credential::new(credential_name, user_id, value);
        self.credentials.save(credential.clone()).await?;
        info!(
            credential_name = %credential.credential_name,
            user_id = %credential.user_id,
            "credential created"
        );
        Ok(credential)
    }

    pub async fn get_credential(
        &self,
        credential_name: &str,
        user_id: &str,
    ) -> ServiceResult<Credential> {
        self.credentials
            .find(credential_name, user_id)
            .await?
            .ok_or_else(|| {
                NextStepError::CredentialNotFound(format!(
                    "{} for user {}",
                    credential_name, user_id
                ))
            })
    }

    pub async fn list_credentials(&self, user_id: &str) -> ServiceResult<Vec<Credential>> {
        Ok(self.credentials.list_by_user(user_id).await?)
    }

    pub(crate) async fn persist(&self, credential: Credential) -> ServiceResult<()> {
        self.credentials.save(credential).await?;
        Ok(())
    }

    /// Explicit status change by an administrator. Unblocking requires a
    /// blocked credential and resets the failed-attempt counters; blocking
    /// requires an ACTIVE credential.
    pub async fn update_credential_status(
        &self,
        credential_name: &str,
        user_id: &str,
        status: CredentialStatus,
    ) -> ServiceResult<Credential> {
        let mut credential = self.get_credential(credential_name, user_id).await?;
        if credential.status == CredentialStatus::Removed {
            return Err(NextStepError::CredentialNotFound(format!(
                "credential is REMOVED: {} for user {}",
                credential_name, user_id
            )));
        }
        match status {
            CredentialStatus::Active => {
                if !matches!(
                    credential.status,
                    CredentialStatus::BlockedTemporary | CredentialStatus::BlockedPermanent
                ) {
                    return Err(NextStepError::CredentialNotBlocked(format!(
                        "credential {} has status {:?}",
                        credential.credential_id, credential.status
                    )));
                }
                credential.reset_counters();
            }
            CredentialStatus::BlockedTemporary | CredentialStatus::BlockedPermanent => {
                if credential.status != CredentialStatus::Active {
                    return Err(NextStepError::CredentialNotActive(format!(
                        "credential {} has status {:?}",
                        credential.credential_id, credential.status
                    )));
                }
            }
            CredentialStatus::Removed => {}
        }
        credential.status = status;
        credential.timestamp_last_updated = Some(Utc::now());
        self.credentials.save(credential.clone()).await?;
        info!(credential_name, user_id, status = ?status, "credential status updated");
        Ok(credential)
    }
}

/// Policy checks applied to a new credential value. Failures are collected
/// so the client sees every violation at once.
fn validate_credential_value(value: &str) -> ServiceResult<()> {
    let mut failures = Vec::new();
    if value.is_empty() {
        failures.push("CREDENTIAL_EMPTY".to_string());
    }
    if value.chars().any(char::is_whitespace) {
        failures.push("CREDENTIAL_ILLEGAL_WHITESPACE".to_string());
    }
    if failures.is_empty() {
        Ok(())
    } else {
        Err(NextStepError::CredentialValidationFailed(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_in_credential_value_is_rejected() {
        let err = validate_credential_value("bad value").unwrap_err();
        match err {
            NextStepError::CredentialValidationFailed(failures) => {
                assert_eq!(failures, vec!["CREDENTIAL_ILLEGAL_WHITESPACE".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_credential_value_is_rejected() {
        assert!(validate_credential_value("").is_err());
        assert!(validate_credential_value("s3cret").is_ok());
    }
}
