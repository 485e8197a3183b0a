//! Operation request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{
    ApplicationContext, AuthMethod, AuthResult, AuthStep, AuthStepResult, Operation,
    OperationCancelReason, OperationHistoryEntry, UserAccountStatus,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOperationRequest {
    #[validate(length(min = 1, max = 256))]
    pub operation_name: String,
    /// Client-supplied operation ID; generated when absent.
    #[validate(length(min = 1, max = 256))]
    pub operation_id: Option<String>,
    #[validate(length(min = 1, max = 4096))]
    pub operation_data: String,
    #[validate(length(max = 256))]
    pub external_transaction_id: Option<String>,
    #[validate(length(max = 256))]
    pub user_id: Option<String>,
    #[validate(length(max = 256))]
    pub organization_id: Option<String>,
    pub application_context: Option<ApplicationContext>,
    pub form_data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOperationRequest {
    #[validate(length(min = 1, max = 256))]
    pub operation_id: String,
    #[validate(length(max = 256))]
    pub user_id: Option<String>,
    #[validate(length(max = 256))]
    pub organization_id: Option<String>,
    pub auth_method: AuthMethod,
    pub auth_step_result: AuthStepResult,
    #[validate(length(max = 1024))]
    pub auth_step_result_description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOperationUserRequest {
    #[validate(length(min = 1, max = 256))]
    pub operation_id: String,
    #[validate(length(min = 1, max = 256))]
    pub user_id: String,
    #[validate(length(max = 256))]
    pub organization_id: Option<String>,
    pub user_account_status: Option<UserAccountStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OperationDetailRequest {
    #[validate(length(min = 1, max = 256))]
    pub operation_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PendingOperationsRequest {
    #[validate(length(min = 1, max = 256))]
    pub user_id: String,
    #[serde(default)]
    pub mobile_token_only: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LookupExternalTransactionRequest {
    #[validate(length(min = 1, max = 256))]
    pub external_transaction_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFormDataRequest {
    #[validate(length(min = 1, max = 256))]
    pub operation_id: String,
    pub form_data: serde_json::Value,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateChosenAuthMethodRequest {
    #[validate(length(min = 1, max = 256))]
    pub operation_id: String,
    pub chosen_auth_method: AuthMethod,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMobileTokenStatusRequest {
    #[validate(length(min = 1, max = 256))]
    pub operation_id: String,
    pub mobile_token_active: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateApplicationContextRequest {
    #[validate(length(min = 1, max = 256))]
    pub operation_id: String,
    pub application_context: ApplicationContext,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CancelOperationRequest {
    #[validate(length(min = 1, max = 256))]
    pub operation_id: String,
    pub cancel_reason: Option<OperationCancelReason>,
}

/// Operation state returned from every lifecycle endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct OperationResponse {
    pub operation_id: String,
    pub operation_name: String,
    pub operation_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
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
    /// Candidate next steps in priority order.
    pub steps: Vec<AuthStep>,
    pub history: Vec<OperationHistoryEntry>,
    pub timestamp_created: DateTime<Utc>,
    pub timestamp_expires: DateTime<Utc>,
}

impl From<Operation> for OperationResponse {
    fn from(operation: Operation) -> Self {
        Self {
            operation_id: operation.operation_id,
            operation_name: operation.operation_name,
            operation_data: operation.operation_data,
            external_transaction_id: operation.external_transaction_id,
            user_id: operation.user_id,
            organization_id: operation.organization_id,
            application_context: operation.application_context,
            form_data: operation.form_data,
            chosen_auth_method: operation.chosen_auth_method,
            mobile_token_active: operation.mobile_token_active,
            result: operation.result,
            cancel_reason: operation.cancel_reason,
            steps: operation.current_steps,
            history: operation.history,
            timestamp_created: operation.timestamp_created,
            timestamp_expires: operation.timestamp_expires,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OperationListResponse {
    pub operations: Vec<OperationResponse>,
}

impl From<Vec<Operation>> for OperationListResponse {
    fn from(operations: Vec<Operation>) -> Self {
        Self {
            operations: operations.into_iter().map(OperationResponse::from).collect(),
        }
    }
}
