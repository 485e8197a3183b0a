//! Administration request/response types for organizations, users,
//! credentials, OTPs and step definitions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{
    AuthMethod, AuthResult, AuthStepResult, CredentialStatus, Otp, StepRequestType,
    UserIdentityStatus,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 256))]
    pub organization_id: String,
    #[validate(length(max = 256))]
    pub display_name_key: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub order_number: u32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 256))]
    pub user_id: String,
    #[validate(length(max = 256))]
    pub organization_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserStatusRequest {
    pub status: UserIdentityStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCredentialDefinitionRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(length(min = 1, max = 256))]
    pub organization_id: String,
    #[validate(length(max = 1024))]
    pub description: Option<String>,
    pub limit_soft: Option<u32>,
    pub limit_hard: Option<u32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCredentialRequest {
    #[validate(length(min = 1, max = 256))]
    pub credential_name: String,
    #[validate(length(min = 1, max = 256))]
    pub user_id: String,
    #[validate(length(min = 1, max = 1024))]
    pub value: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCredentialStatusRequest {
    #[validate(length(min = 1, max = 256))]
    pub credential_name: String,
    #[validate(length(min = 1, max = 256))]
    pub user_id: String,
    pub status: CredentialStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOtpDefinitionRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(length(min = 1, max = 256))]
    pub organization_id: String,
    #[validate(range(min = 4, max = 16))]
    pub length: u32,
    pub attempt_limit: Option<u32>,
    pub expiration_seconds: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOtpRequest {
    #[validate(length(min = 1, max = 256))]
    pub otp_name: String,
    #[validate(length(max = 256))]
    pub user_id: Option<String>,
    #[validate(length(max = 256))]
    pub operation_id: Option<String>,
    #[validate(length(max = 4096))]
    pub otp_data: Option<String>,
}

/// OTP issuance response. The value is returned once so the caller can hand
/// it to the delivery channel; it is never serialized from the entity again.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOtpResponse {
    pub otp_id: String,
    pub otp_name: String,
    pub otp_value: String,
    pub otp_data: String,
}

impl From<Otp> for CreateOtpResponse {
    fn from(otp: Otp) -> Self {
        Self {
            otp_id: otp.otp_id,
            otp_name: otp.otp_name,
            otp_value: otp.value,
            otp_data: otp.otp_data,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStepDefinitionRequest {
    pub step_definition_id: u64,
    #[validate(length(min = 1, max = 256))]
    pub operation_name: String,
    pub operation_type: StepRequestType,
    pub request_auth_method: Option<AuthMethod>,
    pub request_auth_step_result: Option<AuthStepResult>,
    pub response_priority: u32,
    pub response_auth_method: Option<AuthMethod>,
    pub response_result: AuthResult,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOperationConfigRequest {
    #[validate(length(min = 1, max = 256))]
    pub operation_name: String,
    pub expiration_seconds: Option<i64>,
    #[serde(default)]
    pub mobile_token_enabled: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMethodConfigRequest {
    #[validate(length(min = 1, max = 256))]
    pub operation_name: String,
    pub auth_method: AuthMethod,
    #[validate(range(min = 1, max = 100))]
    pub max_auth_fails: u32,
}
