//! Operation model - a multi-step authentication/authorization transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use super::AuthMethod;

/// Overall result of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthResult {
    Continue,
    Done,
    Failed,
}

/// Result of a single authentication step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthStepResult {
    Confirmed,
    Canceled,
    AuthFailed,
    AuthMethodFailed,
}

/// Reason recorded when an operation is canceled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationCancelReason {
    Unknown,
    IncorrectData,
    UnexpectedOperation,
    InterruptedOperation,
    TimedOutOperation,
}

/// Snapshot of the user account status supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserAccountStatus {
    Active,
    NotActive,
}

/// One candidate authentication step offered to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthStep {
    pub auth_method: AuthMethod,
}

impl AuthStep {
    pub fn new(auth_method: AuthMethod) -> Self {
        Self { auth_method }
    }
}

/// Recorded outcome of one authentication step. Entries are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OperationHistoryEntry {
    /// Method the step was executed with; absent for direct cancellation.
    pub auth_method: Option<AuthMethod>,
    pub auth_step_result: AuthStepResult,
    /// Overall operation result after this step was applied.
    pub auth_result: AuthResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub timestamp_created: DateTime<Utc>,
}

/// Application context passed by the calling application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApplicationContext {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extras: HashMap<String, serde_json::Value>,
}

/// Operation entity. Owns its full step history; never physically deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Operation {
    pub operation_id: String,
    pub operation_name: String,
    /// Opaque business payload used for dynamic linking and OTP seeding.
    pub operation_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_account_status: Option<UserAccountStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_context: Option<ApplicationContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen_auth_method: Option<AuthMethod>,
    pub mobile_token_active: bool,
    pub result: AuthResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<OperationCancelReason>,
    /// Candidate steps from the most recent resolution.
    pub current_steps: Vec<AuthStep>,
    pub history: Vec<OperationHistoryEntry>,
    pub timestamp_created: DateTime<Utc>,
    pub timestamp_expires: DateTime<Utc>,
}

impl Operation {
    /// Whether the operation reached a terminal result.
    pub fn is_terminal(&self) -> bool {
        matches!(self.result, AuthResult::Done | AuthResult::Failed)
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel_reason.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.timestamp_expires
    }

    /// Number of failed authentication attempts recorded so far.
    pub fn failed_attempt_count(&self) -> u32 {
        self.history
            .iter()
            .filter(|entry| entry.auth_step_result == AuthStepResult::AuthFailed)
            .count() as u32
    }

    /// Whether the given method is part of the current candidate step set.
    pub fn is_eligible(&self, auth_method: AuthMethod) -> bool {
        self.current_steps
            .iter()
            .any(|step| step.auth_method == auth_method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn operation() -> Operation {
        let now = Utc::now();
        Operation {
            operation_id: "op-1".to_string(),
            operation_name: "login".to_string(),
            operation_data: "A1".to_string(),
            external_transaction_id: None,
            user_id: None,
            organization_id: None,
            user_account_status: None,
            application_context: None,
            form_data: None,
            chosen_auth_method: None,
            mobile_token_active: false,
            result: AuthResult::Continue,
            cancel_reason: None,
            current_steps: vec![AuthStep::new(AuthMethod::UsernamePasswordAuth)],
            history: vec![],
            timestamp_created: now,
            timestamp_expires: now + Duration::seconds(300),
        }
    }

    #[test]
    fn continue_result_is_not_terminal() {
        let op = operation();
        assert!(!op.is_terminal());
        assert!(op.is_eligible(AuthMethod::UsernamePasswordAuth));
        assert!(!op.is_eligible(AuthMethod::SmsKey));
    }

    #[test]
    fn done_and_failed_are_terminal() {
        let mut op = operation();
        op.result = AuthResult::Done;
        assert!(op.is_terminal());
        op.result = AuthResult::Failed;
        assert!(op.is_terminal());
    }

    #[test]
    fn expiration_is_a_strict_deadline() {
        let op = operation();
        assert!(!op.is_expired(op.timestamp_expires));
        assert!(op.is_expired(op.timestamp_expires + Duration::seconds(1)));
    }

    #[test]
    fn failed_attempts_counted_from_history() {
        let mut op = operation();
        for _ in 0..3 {
            op.history.push(OperationHistoryEntry {
                auth_method: Some(AuthMethod::UsernamePasswordAuth),
                auth_step_result: AuthStepResult::AuthFailed,
                auth_result: AuthResult::Continue,
                failure_reason: None,
                timestamp_created: Utc::now(),
            });
        }
        assert_eq!(op.failed_attempt_count(), 3);
    }
}
