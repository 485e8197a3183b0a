//! Operation lifecycle control.
//!
//! All mutations of an operation run under its per-operation lock so that
//! concurrent step submissions serialize and terminal results stay absorbing.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{
    ApplicationContext, AuthMethod, AuthResult, AuthStepResult, Operation, OperationCancelReason,
    OperationHistoryEntry, UserAccountStatus,
};
use crate::store::{
    OperationConfigRepository, OperationLocks, OperationRepository, OrganizationRepository,
    StepDefinitionRepository,
};

use super::error::{NextStepError, ServiceResult};
use super::step_resolution::{resolve, StepInput};

/// Service-wide fallbacks applied when no per-operation configuration exists.
#[derive(Debug, Clone, Copy)]
pub struct OperationDefaults {
    pub expiration_seconds: i64,
    pub max_auth_fails: u32,
}

pub struct CreateOperationInput {
    pub operation_name: String,
    pub operation_id: Option<String>,
    pub operation_data: String,
    pub external_transaction_id: Option<String>,
    pub user_id: Option<String>,
    pub organization_id: Option<String>,
    pub application_context: Option<ApplicationContext>,
    pub form_data: Option<serde_json::Value>,
}

pub struct UpdateOperationInput {
    pub operation_id: String,
    pub user_id: Option<String>,
    pub organization_id: Option<String>,
    pub auth_method: AuthMethod,
    pub auth_step_result: AuthStepResult,
    pub auth_step_result_description: Option<String>,
}

pub struct OperationService {
    operations: Arc<dyn OperationRepository>,
    step_definitions: Arc<dyn StepDefinitionRepository>,
    operation_configs: Arc<dyn OperationConfigRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    locks: Arc<OperationLocks>,
    defaults: OperationDefaults,
}

impl OperationService {
    pub fn new(
        operations: Arc<dyn OperationRepository>,
        step_definitions: Arc<dyn StepDefinitionRepository>,
        operation_configs: Arc<dyn OperationConfigRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        locks: Arc<OperationLocks>,
        defaults: OperationDefaults,
    ) -> Self {
        Self {
            operations,
            step_definitions,
            operation_configs,
            organizations,
            locks,
            defaults,
        }
    }

    /// Creates an operation and resolves its initial candidate steps.
    pub async fn create_operation(
        &self,
        input: CreateOperationInput,
    ) -> ServiceResult<Operation> {
        if let Some(organization_id) = &input.organization_id {
            self.require_organization(organization_id).await?;
        }

        let definitions = self
            .step_definitions
            .find_by_operation_name(&input.operation_name)
            .await?;
        if definitions.is_empty() {
            return Err(NextStepError::OperationConfigNotFound(format!(
                "no step definitions configured for operation: {}",
                input.operation_name
            )));
        }
        let resolution = resolve(&definitions, StepInput::Create)?;

        let expiration_seconds = self
            .operation_configs
            .get(&input.operation_name)
            .await?
            .and_then(|c| c.expiration_seconds)
            .unwrap_or(self.defaults.expiration_seconds);

        let operation_id = input
            .operation_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let _guard = self.locks.lock(&operation_id).await;

        if self.operations.get(&operation_id).await?.is_some() {
            return Err(NextStepError::OperationAlreadyExists(operation_id));
        }

        let now = Utc::now();
        let operation = Operation {
            operation_id: operation_id.clone(),
            operation_name: input.operation_name,
            operation_data: input.operation_data,
            external_transaction_id: input.external_transaction_id,
            user_id: input.user_id,
            organization_id: input.organization_id,
            user_account_status: None,
            application_context: input.application_context,
            form_data: input.form_data,
            chosen_auth_method: None,
            mobile_token_active: false,
            result: resolution.result,
            cancel_reason: None,
            current_steps: resolution.steps,
            history: vec![OperationHistoryEntry {
                auth_method: Some(AuthMethod::Init),
                auth_step_result: AuthStepResult::Confirmed,
                auth_result: resolution.result,
                failure_reason: None,
                timestamp_created: now,
            }],
            timestamp_created: now,
            timestamp_expires: now + Duration::seconds(expiration_seconds),
        };
        self.operations.save(operation.clone()).await?;
        info!(
            operation_id = %operation.operation_id,
            operation_name = %operation.operation_name,
            "operation created"
        );
        Ok(operation)
    }

    /// Applies one completed authentication step and resolves what follows.
    pub async fn update_operation(
        &self,
        input: UpdateOperationInput,
    ) -> ServiceResult<Operation> {
        let _guard = self.locks.lock(&input.operation_id).await;
        let mut operation = self.get_updatable(&input.operation_id).await?;

        if !operation.is_eligible(input.auth_method) {
            return Err(NextStepError::AuthMethodNotFound(format!(
                "method {} is not among the current steps of operation {}",
                input.auth_method, input.operation_id
            )));
        }

        if operation.user_id.is_none() {
            if let Some(organization_id) = &input.organization_id {
                self.require_organization(organization_id).await?;
            }
            operation.user_id = input.user_id.clone();
            operation.organization_id = input.organization_id.clone();
        }

        match input.auth_step_result {
            AuthStepResult::Canceled => {
                operation.result = AuthResult::Failed;
                operation.cancel_reason = Some(OperationCancelReason::Unknown);
                operation.current_steps.clear();
            }
            AuthStepResult::AuthFailed => {
                let max_auth_fails = self.max_auth_fails(&operation, input.auth_method).await?;
                let failed_so_far = operation.failed_attempt_count() + 1;
                if failed_so_far >= max_auth_fails {
                    // Attempts exhausted; resolve the method as failed.
                    let definitions = self
                        .step_definitions
                        .find_by_operation_name(&operation.operation_name)
                        .await?;
                    let resolution = resolve(
                        &definitions,
                        StepInput::Update {
                            auth_method: input.auth_method,
                            step_result: AuthStepResult::AuthMethodFailed,
                        },
                    )?;
                    operation.result = resolution.result;
                    operation.current_steps = resolution.steps;
                    warn!(
                        operation_id = %operation.operation_id,
                        auth_method = %input.auth_method,
                        "authentication attempts exhausted"
                    );
                } else {
                    // Attempts remain; the same steps stay eligible for retry.
                    operation.result = AuthResult::Continue;
                }
            }
            AuthStepResult::Confirmed | AuthStepResult::AuthMethodFailed => {
                let definitions = self
                    .step_definitions
                    .find_by_operation_name(&operation.operation_name)
                    .await?;
                let resolution = resolve(
                    &definitions,
                    StepInput::Update {
                        auth_method: input.auth_method,
                        step_result: input.auth_step_result,
                    },
                )?;
                operation.result = resolution.result;
                operation.current_steps = resolution.steps;
            }
        }

        operation.history.push(OperationHistoryEntry {
            auth_method: Some(input.auth_method),
            auth_step_result: input.auth_step_result,
            auth_result: operation.result,
            failure_reason: input.auth_step_result_description,
            timestamp_created: Utc::now(),
        });
        self.operations.save(operation.clone()).await?;
        info!(
            operation_id = %operation.operation_id,
            auth_method = %input.auth_method,
            result = ?operation.result,
            "operation updated"
        );
        Ok(operation)
    }

    /// Operation detail; a pending operation past its deadline is failed with
    /// a timeout before it is returned.
    pub async fn get_operation_detail(&self, operation_id: &str) -> ServiceResult<Operation> {
        let _guard = self.locks.lock(operation_id).await;
        let mut operation = self
            .operations
            .get(operation_id)
            .await?
            .ok_or_else(|| NextStepError::OperationNotFound(operation_id.to_string()))?;
        if !operation.is_terminal() && operation.is_expired(Utc::now()) {
            self.expire(&mut operation).await?;
        }
        Ok(operation)
    }

    pub async fn list_pending_operations(
        &self,
        user_id: &str,
        mobile_token_only: bool,
    ) -> ServiceResult<Vec<Operation>> {
        let now = Utc::now();
        let pending = self.operations.find_pending(user_id, mobile_token_only).await?;
        Ok(pending
            .into_iter()
            .filter(|op| !op.is_expired(now))
            .collect())
    }

    pub async fn lookup_by_external_transaction_id(
        &self,
        external_transaction_id: &str,
    ) -> ServiceResult<Vec<Operation>> {
        let found = self
            .operations
            .find_by_external_transaction_id(external_transaction_id)
            .await?;
        if found.is_empty() {
            return Err(NextStepError::OperationNotFound(format!(
                "no operation with external transaction id: {}",
                external_transaction_id
            )));
        }
        Ok(found)
    }

    /// Assigns a user identity to an anonymous operation.
    pub async fn update_operation_user(
        &self,
        operation_id: &str,
        user_id: String,
        organization_id: Option<String>,
        account_status: Option<UserAccountStatus>,
    ) -> ServiceResult<Operation> {
        if let Some(organization_id) = &organization_id {
            self.require_organization(organization_id).await?;
        }
        self.mutate(operation_id, |operation| {
            operation.user_id = Some(user_id);
            operation.organization_id = organization_id;
            operation.user_account_status = account_status;
            Ok(())
        })
        .await
    }

    pub async fn update_form_data(
        &self,
        operation_id: &str,
        form_data: serde_json::Value,
    ) -> ServiceResult<Operation> {
        self.mutate(operation_id, |operation| {
            operation.form_data = Some(form_data);
            Ok(())
        })
        .await
    }

    /// Records the method the user picked out of the current candidates.
    pub async fn update_chosen_auth_method(
        &self,
        operation_id: &str,
        chosen_auth_method: AuthMethod,
    ) -> ServiceResult<Operation> {
        self.mutate(operation_id, |operation| {
            if !operation.is_eligible(chosen_auth_method) {
                return Err(NextStepError::AuthMethodNotFound(format!(
                    "method {} is not among the current steps of operation {}",
                    chosen_auth_method, operation.operation_id
                )));
            }
            operation.chosen_auth_method = Some(chosen_auth_method);
            Ok(())
        })
        .await
    }

    pub async fn update_mobile_token_status(
        &self,
        operation_id: &str,
        mobile_token_active: bool,
    ) -> ServiceResult<Operation> {
        self.mutate(operation_id, |operation| {
            operation.mobile_token_active = mobile_token_active;
            Ok(())
        })
        .await
    }

    pub async fn update_application_context(
        &self,
        operation_id: &str,
        application_context: ApplicationContext,
    ) -> ServiceResult<Operation> {
        self.mutate(operation_id, |operation| {
            operation.application_context = Some(application_context);
            Ok(())
        })
        .await
    }

    /// Cancels a pending operation.
    pub async fn cancel_operation(
        &self,
        operation_id: &str,
        reason: Option<OperationCancelReason>,
    ) -> ServiceResult<Operation> {
        let _guard = self.locks.lock(operation_id).await;
        let mut operation = self.get_updatable(operation_id).await?;
        let reason = reason.unwrap_or(OperationCancelReason::Unknown);
        operation.result = AuthResult::Failed;
        operation.cancel_reason = Some(reason);
        operation.current_steps.clear();
        operation.history.push(OperationHistoryEntry {
            auth_method: operation.chosen_auth_method,
            auth_step_result: AuthStepResult::Canceled,
            auth_result: AuthResult::Failed,
            failure_reason: None,
            timestamp_created: Utc::now(),
        });
        self.operations.save(operation.clone()).await?;
        info!(operation_id = %operation.operation_id, reason = ?reason, "operation canceled");
        Ok(operation)
    }

    /// Loads an operation and rejects anything no longer updatable.
    ///
    /// Guard order matters: terminal results are checked before expiration so
    /// a finished operation always reports its terminal state.
    async fn get_updatable(&self, operation_id: &str) -> ServiceResult<Operation> {
        let mut operation = self
            .operations
            .get(operation_id)
            .await?
            .ok_or_else(|| NextStepError::OperationNotFound(operation_id.to_string()))?;
        match operation.result {
            AuthResult::Done => {
                return Err(NextStepError::OperationAlreadyFinished(
                    operation_id.to_string(),
                ))
            }
            AuthResult::Failed if operation.is_canceled() => {
                return Err(NextStepError::OperationAlreadyCanceled(
                    operation_id.to_string(),
                ))
            }
            AuthResult::Failed => {
                return Err(NextStepError::OperationAlreadyFailed(
                    operation_id.to_string(),
                ))
            }
            AuthResult::Continue => {}
        }
        if operation.is_expired(Utc::now()) {
            self.expire(&mut operation).await?;
            return Err(NextStepError::OperationNotValid(format!(
                "operation has expired: {}",
                operation_id
            )));
        }
        Ok(operation)
    }

    /// Checks an operation can still accept a step for the method, without
    /// recording anything. The authentication dispatcher runs this before
    /// any credential or OTP counter moves.
    pub(crate) async fn check_operation_usable(
        &self,
        operation_id: &str,
        auth_method: AuthMethod,
    ) -> ServiceResult<()> {
        let _guard = self.locks.lock(operation_id).await;
        let operation = self.get_updatable(operation_id).await?;
        if !operation.is_eligible(auth_method) {
            return Err(NextStepError::AuthMethodNotFound(format!(
                "method {} is not among the current steps of operation {}",
                auth_method, operation_id
            )));
        }
        Ok(())
    }

    async fn mutate<F>(&self, operation_id: &str, apply: F) -> ServiceResult<Operation>
    where
        F: FnOnce(&mut Operation) -> ServiceResult<()>,
    {
        let _guard = self.locks.lock(operation_id).await;
        let mut operation = self.get_updatable(operation_id).await?;
        apply(&mut operation)?;
        self.operations.save(operation.clone()).await?;
        Ok(operation)
    }

    async fn expire(&self, operation: &mut Operation) -> ServiceResult<()> {
        operation.result = AuthResult::Failed;
        operation.cancel_reason = Some(OperationCancelReason::TimedOutOperation);
        operation.current_steps.clear();
        operation.history.push(OperationHistoryEntry {
            auth_method: None,
            auth_step_result: AuthStepResult::Canceled,
            auth_result: AuthResult::Failed,
            failure_reason: Some("operation expired".to_string()),
            timestamp_created: Utc::now(),
        });
        self.operations.save(operation.clone()).await?;
        warn!(operation_id = %operation.operation_id, "operation expired");
        Ok(())
    }

    /// Operation-level failed-attempt ceiling for a method.
    pub(crate) async fn max_auth_fails(
        &self,
        operation: &Operation,
        auth_method: AuthMethod,
    ) -> ServiceResult<u32> {
        let configured = self
            .operation_configs
            .get_method_config(&operation.operation_name, auth_method)
            .await?
            .map(|c| c.max_auth_fails);
        Ok(configured.unwrap_or(self.defaults.max_auth_fails))
    }

    async fn require_organization(&self, organization_id: &str) -> ServiceResult<()> {
        self.organizations
            .get(organization_id)
            .await?
            .ok_or_else(|| NextStepError::OrganizationNotFound(organization_id.to_string()))?;
        Ok(())
    }
}
