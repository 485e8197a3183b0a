//! Authentication audit record - one entry per dispatcher call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticationType {
    Credential,
    Otp,
    CredentialOtp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticationResult {
    Succeeded,
    Failed,
}

/// Immutable record of one credential/OTP/combined authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticationRecord {
    pub authentication_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub authentication_type: AuthenticationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    pub result: AuthenticationResult,
    /// Credential sub-result for combined authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_credential: Option<AuthenticationResult>,
    /// OTP sub-result for combined authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_otp: Option<AuthenticationResult>,
    pub timestamp_created: DateTime<Utc>,
}

impl AuthenticationRecord {
    pub fn new(authentication_type: AuthenticationType, result: AuthenticationResult) -> Self {
        Self {
            authentication_id: Uuid::new_v4().to_string(),
            user_id: None,
            authentication_type,
            credential_name: None,
            otp_id: None,
            operation_id: None,
            result,
            result_credential: None,
            result_otp: None,
            timestamp_created: Utc::now(),
        }
    }
}
