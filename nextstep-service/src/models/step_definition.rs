//! Step definition model - the declarative method-chain configuration.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthMethod, AuthResult, AuthStepResult};

/// Whether a step definition applies when an operation is created or when it
/// is updated with a completed step result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepRequestType {
    Create,
    Update,
}

/// One edge in the step-definition graph for an operation name.
///
/// The request side describes the prerequisite ("method X finished with
/// result Y"); the response side describes what becomes eligible next and
/// with which overall result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StepDefinition {
    pub step_definition_id: u64,
    pub operation_name: String,
    pub operation_type: StepRequestType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_auth_method: Option<AuthMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_auth_step_result: Option<AuthStepResult>,
    pub response_priority: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_auth_method: Option<AuthMethod>,
    pub response_result: AuthResult,
}

impl StepDefinition {
    /// Whether this definition matches an operation-creation request.
    pub fn matches_create(&self) -> bool {
        self.operation_type == StepRequestType::Create
    }

    /// Whether this definition matches an update with the given completed step.
    pub fn matches_update(&self, auth_method: AuthMethod, step_result: AuthStepResult) -> bool {
        self.operation_type == StepRequestType::Update
            && self.request_auth_method == Some(auth_method)
            && self.request_auth_step_result == Some(step_result)
    }
}

/// Per-operation-name configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OperationConfig {
    pub operation_name: String,
    /// Operation expiration override in seconds; service default applies
    /// when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_seconds: Option<i64>,
    pub mobile_token_enabled: bool,
}

/// Per-(operation, method) configuration carrying the operation-level
/// failed-attempt ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OperationMethodConfig {
    pub operation_name: String,
    pub auth_method: AuthMethod,
    pub max_auth_fails: u32,
}
