//! Authentication method identifiers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An authentication mechanism that can appear as a step within an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthMethod {
    /// Implicit first step assigned when an operation is initialized.
    Init,
    /// Assignment of a user identity to an anonymous operation.
    UserIdAssign,
    /// Username and password form authentication.
    UsernamePasswordAuth,
    /// Review of operation details before approval.
    ShowOperationDetail,
    /// Approval through the mobile token application.
    MobileToken,
    /// One-time password delivered over SMS.
    SmsKey,
    /// Generic one-time password code.
    OtpCode,
    /// Explicit user consent step.
    Consent,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Init => "INIT",
            AuthMethod::UserIdAssign => "USER_ID_ASSIGN",
            AuthMethod::UsernamePasswordAuth => "USERNAME_PASSWORD_AUTH",
            AuthMethod::ShowOperationDetail => "SHOW_OPERATION_DETAIL",
            AuthMethod::MobileToken => "MOBILE_TOKEN",
            AuthMethod::SmsKey => "SMS_KEY",
            AuthMethod::OtpCode => "OTP_CODE",
            AuthMethod::Consent => "CONSENT",
        }
    }
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
