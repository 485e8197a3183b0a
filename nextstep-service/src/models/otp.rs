//! One-time password model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpStatus {
    Active,
    Used,
    Blocked,
    Expired,
    Removed,
}

/// Configured policy for one OTP type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OtpDefinition {
    pub name: String,
    pub organization_id: String,
    /// Number of generated digits.
    pub length: u32,
    /// Failed attempts before the OTP is blocked; unlimited when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_seconds: Option<i64>,
    pub active: bool,
    pub timestamp_created: DateTime<Utc>,
}

/// OTP entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Otp {
    pub otp_id: String,
    /// Name of the OTP definition this OTP was issued under.
    pub otp_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Data the OTP value was derived from (dynamic linking).
    pub otp_data: String,
    #[serde(skip_serializing)]
    pub value: String,
    pub status: OtpStatus,
    pub attempt_counter: u32,
    pub failed_attempt_counter: u32,
    pub timestamp_created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_expires: Option<DateTime<Utc>>,
}

impl Otp {
    pub fn new(
        otp_name: String,
        user_id: Option<String>,
        operation_id: Option<String>,
        otp_data: String,
        value: String,
        timestamp_expires: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            otp_id: Uuid::new_v4().to_string(),
            otp_name,
            user_id,
            operation_id,
            otp_data,
            value,
            status: OtpStatus::Active,
            attempt_counter: 0,
            failed_attempt_counter: 0,
            timestamp_created: Utc::now(),
            timestamp_expires,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.timestamp_expires {
            Some(expires) => now > expires,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn otp_without_expiration_never_expires() {
        let otp = Otp::new(
            "SMS_OTP".to_string(),
            None,
            None,
            "A1".to_string(),
            "12345678".to_string(),
            None,
        );
        assert!(!otp.is_expired(Utc::now() + Duration::days(365)));
    }

    #[test]
    fn otp_expires_after_deadline() {
        let expires = Utc::now() + Duration::seconds(30);
        let otp = Otp::new(
            "SMS_OTP".to_string(),
            None,
            None,
            "A1".to_string(),
            "12345678".to_string(),
            Some(expires),
        );
        assert!(!otp.is_expired(expires));
        assert!(otp.is_expired(expires + Duration::seconds(1)));
    }
}
