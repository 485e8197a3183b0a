//! Authentication dispatcher for credential, OTP and combined verification.
//!
//! The dispatcher first checks the bound operation still accepts the step,
//! then verifies the secret, records the attempt against the credential or
//! OTP counters, moves the operation forward and writes one audit record per
//! call. A call against a terminal or expired operation consumes no attempt.

use std::sync::Arc;

use tracing::info;

use crate::models::{
    AuthMethod, AuthResult, AuthStepResult, AuthenticationRecord, AuthenticationResult,
    Credential, Operation, Otp,
};
use crate::store::AuthenticationRepository;

use super::attempt_limit::{
    record_credential_attempt, record_otp_attempt, RemainingAttempts,
};
use super::credential::CredentialService;
use super::error::{NextStepError, ServiceResult};
use super::operation::{OperationService, UpdateOperationInput};
use super::otp::OtpService;
use super::user::UserService;

/// Verifies a supplied secret against a stored credential value.
///
/// Value hashing or HSM-backed verification plugs in here; the default
/// implementation compares stored plaintext.
pub trait CredentialValueValidator: Send + Sync {
    fn verify(&self, credential: &Credential, supplied: &str) -> bool;
}

pub struct PlaintextValueValidator;

impl CredentialValueValidator for PlaintextValueValidator {
    fn verify(&self, credential: &Credential, supplied: &str) -> bool {
        credential.value == supplied
    }
}

pub struct CredentialAuthInput {
    pub credential_name: String,
    pub user_id: String,
    pub credential_value: String,
    pub operation_id: Option<String>,
    pub auth_method: Option<AuthMethod>,
}

pub struct OtpAuthInput {
    pub otp_id: Option<String>,
    pub operation_id: Option<String>,
    pub otp_value: String,
    pub auth_method: Option<AuthMethod>,
}

pub struct CombinedAuthInput {
    pub credential: CredentialAuthInput,
    pub otp_value: String,
}

/// Result of one dispatcher call.
pub struct AuthenticationOutcome {
    pub result: AuthenticationResult,
    /// Attempts left before lockout; `None` means unlimited.
    pub remaining_attempts: Option<u32>,
    pub user_id: Option<String>,
    /// Operation state after the bound operation was moved forward.
    pub operation: Option<Operation>,
    pub result_credential: Option<AuthenticationResult>,
    pub result_otp: Option<AuthenticationResult>,
}

pub struct AuthenticationService {
    credentials: Arc<CredentialService>,
    otps: Arc<OtpService>,
    users: Arc<UserService>,
    operations: Arc<OperationService>,
    audit: Arc<dyn AuthenticationRepository>,
    validator: Arc<dyn CredentialValueValidator>,
}

impl AuthenticationService {
    pub fn new(
        credentials: Arc<CredentialService>,
        otps: Arc<OtpService>,
        users: Arc<UserService>,
        operations: Arc<OperationService>,
        audit: Arc<dyn AuthenticationRepository>,
        validator: Arc<dyn CredentialValueValidator>,
    ) -> Self {
        Self {
            credentials,
            otps,
            users,
            operations,
            audit,
            validator,
        }
    }

    pub async fn authenticate_with_credential(
        &self,
        input: CredentialAuthInput,
    ) -> ServiceResult<AuthenticationOutcome> {
        let auth_method = input.auth_method.unwrap_or(AuthMethod::UsernamePasswordAuth);
        // The bound operation must still accept this step before any counter
        // moves or an audit record is written.
        if let Some(operation_id) = input.operation_id.as_deref() {
            self.operations
                .check_operation_usable(operation_id, auth_method)
                .await?;
        }
        let (success, remaining) = self
            .verify_credential(&input.credential_name, &input.user_id, &input.credential_value)
            .await?;
        let result = to_result(success);

        let mut record = AuthenticationRecord::new(crate::models::AuthenticationType::Credential, result);
        record.user_id = Some(input.user_id.clone());
        record.credential_name = Some(input.credential_name.clone());
        record.operation_id = input.operation_id.clone();
        self.audit.save(record).await?;

        let (operation, remaining) = self
            .advance_operation(
                input.operation_id.as_deref(),
                auth_method,
                Some(input.user_id.clone()),
                success,
                remaining,
            )
            .await?;

        info!(
            user_id = %input.user_id,
            credential_name = %input.credential_name,
            result = ?result,
            "credential authentication"
        );
        Ok(AuthenticationOutcome {
            result,
            remaining_attempts: remaining.as_option(),
            user_id: Some(input.user_id),
            operation,
            result_credential: Some(result),
            result_otp: None,
        })
    }

    pub async fn authenticate_with_otp(
        &self,
        input: OtpAuthInput,
    ) -> ServiceResult<AuthenticationOutcome> {
        let auth_method = input.auth_method.unwrap_or(AuthMethod::OtpCode);
        if let Some(operation_id) = input.operation_id.as_deref() {
            self.operations
                .check_operation_usable(operation_id, auth_method)
                .await?;
        }
        let otp = self.load_otp(&input).await?;
        // An OTP referenced by ID may carry its own operation binding.
        if input.operation_id.is_none() {
            if let Some(operation_id) = otp.operation_id.as_deref() {
                self.operations
                    .check_operation_usable(operation_id, auth_method)
                    .await?;
            }
        }
        let (otp, success, remaining) = self.verify_otp(otp, &input.otp_value).await?;
        let result = to_result(success);

        let mut record = AuthenticationRecord::new(crate::models::AuthenticationType::Otp, result);
        record.user_id = otp.user_id.clone();
        record.otp_id = Some(otp.otp_id.clone());
        record.operation_id = otp.operation_id.clone();
        self.audit.save(record).await?;

        let operation_id = input.operation_id.or_else(|| otp.operation_id.clone());
        let (operation, remaining) = self
            .advance_operation(
                operation_id.as_deref(),
                auth_method,
                otp.user_id.clone(),
                success,
                remaining,
            )
            .await?;

        info!(otp_id = %otp.otp_id, result = ?result, "otp authentication");
        Ok(AuthenticationOutcome {
            result,
            remaining_attempts: remaining.as_option(),
            user_id: otp.user_id,
            operation,
            result_credential: None,
            result_otp: Some(result),
        })
    }

    /// Combined flow: both sub-checks run on every call and each outcome is
    /// recorded against its own counters; the overall result is CONFIRMED
    /// only when the credential and the OTP both pass.
    pub async fn authenticate_combined(
        &self,
        input: CombinedAuthInput,
    ) -> ServiceResult<AuthenticationOutcome> {
        let credential_input = input.credential;
        let auth_method = credential_input.auth_method.unwrap_or(AuthMethod::SmsKey);
        if let Some(operation_id) = credential_input.operation_id.as_deref() {
            self.operations
                .check_operation_usable(operation_id, auth_method)
                .await?;
        }
        let (credential_success, credential_remaining) = self
            .verify_credential(
                &credential_input.credential_name,
                &credential_input.user_id,
                &credential_input.credential_value,
            )
            .await?;
        let otp = self
            .load_otp(&OtpAuthInput {
                otp_id: None,
                operation_id: credential_input.operation_id.clone(),
                otp_value: input.otp_value.clone(),
                auth_method: credential_input.auth_method,
            })
            .await?;
        let (otp, otp_success, otp_remaining) = self.verify_otp(otp, &input.otp_value).await?;

        let success = credential_success && otp_success;
        let remaining = credential_remaining.min_with(otp_remaining);
        let result = to_result(success);

        let mut record =
            AuthenticationRecord::new(crate::models::AuthenticationType::CredentialOtp, result);
        record.user_id = Some(credential_input.user_id.clone());
        record.credential_name = Some(credential_input.credential_name.clone());
        record.otp_id = Some(otp.otp_id);
        record.operation_id = credential_input.operation_id.clone();
        record.result_credential = Some(to_result(credential_success));
        record.result_otp = Some(to_result(otp_success));
        self.audit.save(record).await?;

        let (operation, remaining) = self
            .advance_operation(
                credential_input.operation_id.as_deref(),
                auth_method,
                Some(credential_input.user_id.clone()),
                success,
                remaining,
            )
            .await?;

        info!(
            user_id = %credential_input.user_id,
            result = ?result,
            "combined authentication"
        );
        Ok(AuthenticationOutcome {
            result,
            remaining_attempts: remaining.as_option(),
            user_id: Some(credential_input.user_id),
            operation,
            result_credential: Some(to_result(credential_success)),
            result_otp: Some(to_result(otp_success)),
        })
    }

    pub async fn list_for_user(
        &self,
        user_id: &str,
    ) -> ServiceResult<Vec<AuthenticationRecord>> {
        Ok(self.audit.list_by_user(user_id).await?)
    }

    /// Verifies a credential value and records the attempt.
    async fn verify_credential(
        &self,
        credential_name: &str,
        user_id: &str,
        supplied: &str,
    ) -> ServiceResult<(bool, RemainingAttempts)> {
        let definition = self.credentials.get_definition(credential_name).await?;
        if !definition.active {
            return Err(NextStepError::CredentialDefinitionNotFound(format!(
                "credential definition is not active: {}",
                credential_name
            )));
        }
        self.users.require_active_user(user_id).await?;
        let mut credential = self.credentials.get_credential(credential_name, user_id).await?;
        if !credential.is_usable() {
            return Err(NextStepError::CredentialNotActive(format!(
                "credential {} has status {:?}",
                credential.credential_id, credential.status
            )));
        }
        let success = self.validator.verify(&credential, supplied);
        let outcome = record_credential_attempt(&mut credential, &definition, success);
        self.credentials.persist(credential).await?;
        Ok((success, outcome.remaining))
    }

    async fn load_otp(&self, input: &OtpAuthInput) -> ServiceResult<Otp> {
        match (&input.otp_id, &input.operation_id) {
            (Some(otp_id), _) => self.otps.get_active_otp(otp_id).await,
            (None, Some(operation_id)) => {
                let otp = self.otps.get_otp_for_operation(operation_id).await?;
                self.otps.get_active_otp(&otp.otp_id).await
            }
            (None, None) => Err(NextStepError::InvalidRequest(
                "OTP ID or operation ID is required".to_string(),
            )),
        }
    }

    /// Verifies an OTP value and records the attempt.
    async fn verify_otp(
        &self,
        mut otp: Otp,
        supplied: &str,
    ) -> ServiceResult<(Otp, bool, RemainingAttempts)> {
        let definition = self.otps.get_definition(&otp.otp_name).await?;
        if let Some(user_id) = &otp.user_id {
            self.users.require_active_user(user_id).await?;
        }
        let success = otp.value == supplied;
        let remaining = record_otp_attempt(&mut otp, definition.attempt_limit, success);
        self.otps.persist(otp.clone()).await?;
        Ok((otp, success, remaining))
    }

    /// Moves the bound operation forward and folds the operation-level
    /// attempt ceiling into the remaining-attempt count.
    async fn advance_operation(
        &self,
        operation_id: Option<&str>,
        auth_method: AuthMethod,
        user_id: Option<String>,
        success: bool,
        remaining: RemainingAttempts,
    ) -> ServiceResult<(Option<Operation>, RemainingAttempts)> {
        let Some(operation_id) = operation_id else {
            return Ok((None, remaining));
        };
        let step_result = if success {
            AuthStepResult::Confirmed
        } else {
            AuthStepResult::AuthFailed
        };
        let operation = self
            .operations
            .update_operation(UpdateOperationInput {
                operation_id: operation_id.to_string(),
                user_id,
                organization_id: None,
                auth_method,
                auth_step_result: step_result,
                auth_step_result_description: None,
            })
            .await?;

        let remaining = if operation.result == AuthResult::Continue {
            let max_auth_fails = self.operations.max_auth_fails(&operation, auth_method).await?;
            let operation_remaining =
                max_auth_fails.saturating_sub(operation.failed_attempt_count());
            remaining.min_with(RemainingAttempts::Count(operation_remaining))
        } else {
            remaining
        };
        Ok((Some(operation), remaining))
    }
}

fn to_result(success: bool) -> AuthenticationResult {
    if success {
        AuthenticationResult::Succeeded
    } else {
        AuthenticationResult::Failed
    }
}
