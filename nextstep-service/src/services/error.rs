//! Domain errors with stable, client-facing error codes.

use axum::http::StatusCode;
use service_core::error::AppError;
use thiserror::Error;

/// Business failures surfaced by the step engine and entity services.
///
/// Each variant maps to a stable error code carried in the response body so
/// clients can branch on semantics rather than on messages.
#[derive(Debug, Error)]
pub enum NextStepError {
    #[error("operation was not found: {0}")]
    OperationNotFound(String),
    #[error("operation already exists: {0}")]
    OperationAlreadyExists(String),
    #[error("operation is already finished: {0}")]
    OperationAlreadyFinished(String),
    #[error("operation is already failed: {0}")]
    OperationAlreadyFailed(String),
    #[error("operation is already canceled: {0}")]
    OperationAlreadyCanceled(String),
    #[error("operation is not valid: {0}")]
    OperationNotValid(String),
    #[error("authentication method is not available for operation: {0}")]
    AuthMethodNotFound(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("step resolution produced no valid outcome: {0}")]
    InvalidConfiguration(String),
    #[error("organization was not found: {0}")]
    OrganizationNotFound(String),
    #[error("organization already exists: {0}")]
    OrganizationAlreadyExists(String),
    #[error("user identity was not found: {0}")]
    UserIdentityNotFound(String),
    #[error("user identity already exists: {0}")]
    UserIdentityAlreadyExists(String),
    #[error("user identity is not active: {0}")]
    UserIdentityNotActive(String),
    #[error("user identity is not blocked: {0}")]
    UserIdentityNotBlocked(String),
    #[error("credential definition was not found: {0}")]
    CredentialDefinitionNotFound(String),
    #[error("credential definition already exists: {0}")]
    CredentialDefinitionAlreadyExists(String),
    #[error("credential was not found: {0}")]
    CredentialNotFound(String),
    #[error("credential is not active: {0}")]
    CredentialNotActive(String),
    #[error("credential is not blocked: {0}")]
    CredentialNotBlocked(String),
    #[error("credential validation failed: {}", .0.join(", "))]
    CredentialValidationFailed(Vec<String>),
    #[error("otp definition was not found: {0}")]
    OtpDefinitionNotFound(String),
    #[error("otp definition already exists: {0}")]
    OtpDefinitionAlreadyExists(String),
    #[error("otp was not found: {0}")]
    OtpNotFound(String),
    #[error("otp is not active: {0}")]
    OtpNotActive(String),
    #[error("step definition was not found: {0}")]
    StepDefinitionNotFound(String),
    #[error("step definition already exists: {0}")]
    StepDefinitionAlreadyExists(String),
    #[error("operation config was not found: {0}")]
    OperationConfigNotFound(String),
    #[error("operation config already exists: {0}")]
    OperationConfigAlreadyExists(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl NextStepError {
    pub fn code(&self) -> &'static str {
        match self {
            NextStepError::OperationNotFound(_) => "OPERATION_NOT_FOUND",
            NextStepError::OperationAlreadyExists(_) => "OPERATION_ALREADY_EXISTS",
            NextStepError::OperationAlreadyFinished(_) => "OPERATION_ALREADY_FINISHED",
            NextStepError::OperationAlreadyFailed(_) => "OPERATION_ALREADY_FAILED",
            NextStepError::OperationAlreadyCanceled(_) => "OPERATION_ALREADY_CANCELED",
            NextStepError::OperationNotValid(_) => "OPERATION_NOT_VALID",
            NextStepError::AuthMethodNotFound(_) => "AUTH_METHOD_NOT_FOUND",
            NextStepError::InvalidRequest(_) => "INVALID_REQUEST",
            NextStepError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            NextStepError::OrganizationNotFound(_) => "ORGANIZATION_NOT_FOUND",
            NextStepError::OrganizationAlreadyExists(_) => "ORGANIZATION_ALREADY_EXISTS",
            NextStepError::UserIdentityNotFound(_) => "USER_IDENTITY_NOT_FOUND",
            NextStepError::UserIdentityAlreadyExists(_) => "USER_IDENTITY_ALREADY_EXISTS",
            NextStepError::UserIdentityNotActive(_) => "USER_IDENTITY_NOT_ACTIVE",
            NextStepError::UserIdentityNotBlocked(_) => "USER_IDENTITY_NOT_BLOCKED",
            NextStepError::CredentialDefinitionNotFound(_) => "CREDENTIAL_DEFINITION_NOT_FOUND",
            NextStepError::CredentialDefinitionAlreadyExists(_) => {
                "CREDENTIAL_DEFINITION_ALREADY_EXISTS"
            }
            NextStepError::CredentialNotFound(_) => "CREDENTIAL_NOT_FOUND",
            NextStepError::CredentialNotActive(_) => "CREDENTIAL_NOT_ACTIVE",
            NextStepError::CredentialNotBlocked(_) => "CREDENTIAL_NOT_BLOCKED",
            NextStepError::CredentialValidationFailed(_) => "CREDENTIAL_VALIDATION_FAILED",
            NextStepError::OtpDefinitionNotFound(_) => "OTP_DEFINITION_NOT_FOUND",
            NextStepError::OtpDefinitionAlreadyExists(_) => "OTP_DEFINITION_ALREADY_EXISTS",
            NextStepError::OtpNotFound(_) => "OTP_NOT_FOUND",
            NextStepError::OtpNotActive(_) => "OTP_NOT_ACTIVE",
            NextStepError::StepDefinitionNotFound(_) => "STEP_DEFINITION_NOT_FOUND",
            NextStepError::StepDefinitionAlreadyExists(_) => "STEP_DEFINITION_ALREADY_EXISTS",
            NextStepError::OperationConfigNotFound(_) => "OPERATION_CONFIG_NOT_FOUND",
            NextStepError::OperationConfigAlreadyExists(_) => "OPERATION_CONFIG_ALREADY_EXISTS",
            NextStepError::Internal(_) => "ERROR_GENERIC",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            NextStepError::OperationNotFound(_)
            | NextStepError::OrganizationNotFound(_)
            | NextStepError::UserIdentityNotFound(_)
            | NextStepError::CredentialDefinitionNotFound(_)
            | NextStepError::CredentialNotFound(_)
            | NextStepError::OtpDefinitionNotFound(_)
            | NextStepError::OtpNotFound(_)
            | NextStepError::StepDefinitionNotFound(_)
            | NextStepError::OperationConfigNotFound(_) => StatusCode::NOT_FOUND,
            NextStepError::OperationAlreadyExists(_)
            | NextStepError::OrganizationAlreadyExists(_)
            | NextStepError::UserIdentityAlreadyExists(_)
            | NextStepError::CredentialDefinitionAlreadyExists(_)
            | NextStepError::OtpDefinitionAlreadyExists(_)
            | NextStepError::StepDefinitionAlreadyExists(_)
            | NextStepError::OperationConfigAlreadyExists(_) => StatusCode::CONFLICT,
            NextStepError::Internal(_) | NextStepError::InvalidConfiguration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<NextStepError> for AppError {
    fn from(err: NextStepError) -> Self {
        match err {
            NextStepError::Internal(source) => AppError::InternalError(source),
            other => AppError::Domain {
                status: other.status(),
                code: other.code(),
                message: other.to_string(),
            },
        }
    }
}

pub type ServiceResult<T> = Result<T, NextStepError>;
