//! Authentication request/response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{AuthMethod, AuthenticationResult};
use crate::services::AuthenticationOutcome;

use super::operation::OperationResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CredentialAuthenticationRequest {
    #[validate(length(min = 1, max = 256))]
    pub credential_name: String,
    #[validate(length(min = 1, max = 256))]
    pub user_id: String,
    #[validate(length(min = 1, max = 1024))]
    pub credential_value: String,
    #[validate(length(max = 256))]
    pub operation_id: Option<String>,
    pub auth_method: Option<AuthMethod>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OtpAuthenticationRequest {
    #[validate(length(max = 256))]
    pub otp_id: Option<String>,
    #[validate(length(max = 256))]
    pub operation_id: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub otp_value: String,
    pub auth_method: Option<AuthMethod>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CombinedAuthenticationRequest {
    #[validate(length(min = 1, max = 256))]
    pub credential_name: String,
    #[validate(length(min = 1, max = 256))]
    pub user_id: String,
    #[validate(length(min = 1, max = 1024))]
    pub credential_value: String,
    #[validate(length(min = 1, max = 64))]
    pub otp_value: String,
    #[validate(length(max = 256))]
    pub operation_id: Option<String>,
    pub auth_method: Option<AuthMethod>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthenticationResponse {
    pub result: AuthenticationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_credential: Option<AuthenticationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_otp: Option<AuthenticationResult>,
    /// Attempts left before lockout; absent when unlimited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationResponse>,
}

impl From<AuthenticationOutcome> for AuthenticationResponse {
    fn from(outcome: AuthenticationOutcome) -> Self {
        Self {
            result: outcome.result,
            result_credential: outcome.result_credential,
            result_otp: outcome.result_otp,
            remaining_attempts: outcome.remaining_attempts,
            user_id: outcome.user_id,
            operation: outcome.operation.map(OperationResponse::from),
        }
    }
}
