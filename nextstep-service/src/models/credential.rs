//! Credential model - named credentials with failed-attempt bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Credential lifecycle status checked before any use in a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialStatus {
    Active,
    BlockedTemporary,
    BlockedPermanent,
    Removed,
}

/// Configured policy for one credential type within an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CredentialDefinition {
    pub name: String,
    pub organization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Failed attempts before a temporary block; unlimited when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_soft: Option<u32>,
    /// Failed attempts before a permanent block; unlimited when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_hard: Option<u32>,
    pub active: bool,
    pub timestamp_created: DateTime<Utc>,
}

/// Credential entity for one user and credential definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Credential {
    pub credential_id: String,
    /// Name of the credential definition this credential belongs to.
    pub credential_name: String,
    pub user_id: String,
    /// Stored credential value; value hashing/encryption is owned by an
    /// external subsystem.
    #[serde(skip_serializing)]
    pub value: String,
    pub status: CredentialStatus,
    pub attempt_counter: u32,
    pub failed_attempt_counter_soft: u32,
    pub failed_attempt_counter_hard: u32,
    pub timestamp_created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_last_updated: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(credential_name: String, user_id: String, value: String) -> Self {
        Self {
            credential_id: Uuid::new_v4().to_string(),
            credential_name,
            user_id,
            value,
            status: CredentialStatus::Active,
            attempt_counter: 0,
            failed_attempt_counter_soft: 0,
            failed_attempt_counter_hard: 0,
            timestamp_created: Utc::now(),
            timestamp_last_updated: None,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.status == CredentialStatus::Active
    }

    /// Counters reset whenever a credential transitions back to ACTIVE.
    pub fn reset_counters(&mut self) {
        self.failed_attempt_counter_soft = 0;
        self.failed_attempt_counter_hard = 0;
    }
}
