//! Operation lifecycle handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    dtos::{
        operation::{
            CancelOperationRequest, CreateOperationRequest, LookupExternalTransactionRequest,
            OperationDetailRequest, OperationListResponse, OperationResponse,
            PendingOperationsRequest, UpdateApplicationContextRequest,
            UpdateChosenAuthMethodRequest, UpdateFormDataRequest, UpdateMobileTokenStatusRequest,
            UpdateOperationRequest, UpdateOperationUserRequest,
        },
        ErrorResponse,
    },
    models::Otp,
    services::{CreateOperationInput, UpdateOperationInput},
    utils::ValidatedJson,
    AppState,
};
use service_core::error::AppError;

/// Create an operation and resolve its initial steps
#[utoipa::path(
    post,
    path = "/operation",
    request_body = CreateOperationRequest,
    responses(
        (status = 201, description = "Operation created", body = OperationResponse),
        (status = 404, description = "Organization or step definitions not found", body = ErrorResponse),
        (status = 409, description = "Operation already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Operations"
)]
pub async fn create_operation(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateOperationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let operation = state
        .operations
        .create_operation(CreateOperationInput {
            operation_name: req.operation_name,
            operation_id: req.operation_id,
            operation_data: req.operation_data,
            external_transaction_id: req.external_transaction_id,
            user_id: req.user_id,
            organization_id: req.organization_id,
            application_context: req.application_context,
            form_data: req.form_data,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(OperationResponse::from(operation))))
}

/// Apply a completed authentication step
#[utoipa::path(
    put,
    path = "/operation",
    request_body = UpdateOperationRequest,
    responses(
        (status = 200, description = "Operation updated", body = OperationResponse),
        (status = 400, description = "Operation finished, failed, canceled or expired", body = ErrorResponse),
        (status = 404, description = "Operation not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Operations"
)]
pub async fn update_operation(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateOperationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let operation = state
        .operations
        .update_operation(UpdateOperationInput {
            operation_id: req.operation_id,
            user_id: req.user_id,
            organization_id: req.organization_id,
            auth_method: req.auth_method,
            auth_step_result: req.auth_step_result,
            auth_step_result_description: req.auth_step_result_description,
        })
        .await?;
    Ok(Json(OperationResponse::from(operation)))
}

/// Assign a user identity to an operation
#[utoipa::path(
    put,
    path = "/operation/user",
    request_body = UpdateOperationUserRequest,
    responses(
        (status = 200, description = "User assigned", body = OperationResponse),
        (status = 404, description = "Operation or organization not found", body = ErrorResponse)
    ),
    tag = "Operations"
)]
pub async fn update_operation_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateOperationUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let operation = state
        .operations
        .update_operation_user(
            &req.operation_id,
            req.user_id,
            req.organization_id,
            req.user_account_status,
        )
        .await?;
    Ok(Json(OperationResponse::from(operation)))
}

/// Operation detail
#[utoipa::path(
    post,
    path = "/operation/detail",
    request_body = OperationDetailRequest,
    responses(
        (status = 200, description = "Operation detail", body = OperationResponse),
        (status = 404, description = "Operation not found", body = ErrorResponse)
    ),
    tag = "Operations"
)]
pub async fn operation_detail(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<OperationDetailRequest>,
) -> Result<impl IntoResponse, AppError> {
    let operation = state.operations.get_operation_detail(&req.operation_id).await?;
    Ok(Json(OperationResponse::from(operation)))
}

/// Pending operations for a user
#[utoipa::path(
    post,
    path = "/user/operation/list",
    request_body = PendingOperationsRequest,
    responses(
        (status = 200, description = "Pending operations", body = OperationListResponse)
    ),
    tag = "Operations"
)]
pub async fn pending_operations(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<PendingOperationsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let operations = state
        .operations
        .list_pending_operations(&req.user_id, req.mobile_token_only)
        .await?;
    Ok(Json(OperationListResponse::from(operations)))
}

/// Look up operations by external transaction ID
#[utoipa::path(
    post,
    path = "/operation/lookup/external",
    request_body = LookupExternalTransactionRequest,
    responses(
        (status = 200, description = "Matching operations", body = OperationListResponse),
        (status = 404, description = "No matching operation", body = ErrorResponse)
    ),
    tag = "Operations"
)]
pub async fn lookup_external(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LookupExternalTransactionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let operations = state
        .operations
        .lookup_by_external_transaction_id(&req.external_transaction_id)
        .await?;
    Ok(Json(OperationListResponse::from(operations)))
}

/// Update operation form data
#[utoipa::path(
    put,
    path = "/operation/formData",
    request_body = UpdateFormDataRequest,
    responses(
        (status = 200, description = "Form data updated", body = OperationResponse),
        (status = 404, description = "Operation not found", body = ErrorResponse)
    ),
    tag = "Operations"
)]
pub async fn update_form_data(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateFormDataRequest>,
) -> Result<impl IntoResponse, AppError> {
    let operation = state
        .operations
        .update_form_data(&req.operation_id, req.form_data)
        .await?;
    Ok(Json(OperationResponse::from(operation)))
}

/// Record the authentication method chosen by the user
#[utoipa::path(
    put,
    path = "/operation/chosenAuthMethod",
    request_body = UpdateChosenAuthMethodRequest,
    responses(
        (status = 200, description = "Chosen method recorded", body = OperationResponse),
        (status = 400, description = "Method not among current steps", body = ErrorResponse),
        (status = 404, description = "Operation not found", body = ErrorResponse)
    ),
    tag = "Operations"
)]
pub async fn update_chosen_auth_method(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateChosenAuthMethodRequest>,
) -> Result<impl IntoResponse, AppError> {
    let operation = state
        .operations
        .update_chosen_auth_method(&req.operation_id, req.chosen_auth_method)
        .await?;
    Ok(Json(OperationResponse::from(operation)))
}

/// Update mobile token status for an operation
#[utoipa::path(
    put,
    path = "/operation/mobileToken/status",
    request_body = UpdateMobileTokenStatusRequest,
    responses(
        (status = 200, description = "Mobile token status updated", body = OperationResponse),
        (status = 404, description = "Operation not found", body = ErrorResponse)
    ),
    tag = "Operations"
)]
pub async fn update_mobile_token_status(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateMobileTokenStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let operation = state
        .operations
        .update_mobile_token_status(&req.operation_id, req.mobile_token_active)
        .await?;
    Ok(Json(OperationResponse::from(operation)))
}

/// Update the application context of an operation
#[utoipa::path(
    put,
    path = "/operation/application",
    request_body = UpdateApplicationContextRequest,
    responses(
        (status = 200, description = "Application context updated", body = OperationResponse),
        (status = 404, description = "Operation not found", body = ErrorResponse)
    ),
    tag = "Operations"
)]
pub async fn update_application_context(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateApplicationContextRequest>,
) -> Result<impl IntoResponse, AppError> {
    let operation = state
        .operations
        .update_application_context(&req.operation_id, req.application_context)
        .await?;
    Ok(Json(OperationResponse::from(operation)))
}

/// Cancel a pending operation
#[utoipa::path(
    post,
    path = "/operation/cancel",
    request_body = CancelOperationRequest,
    responses(
        (status = 200, description = "Operation canceled", body = OperationResponse),
        (status = 400, description = "Operation already finished, failed or canceled", body = ErrorResponse),
        (status = 404, description = "Operation not found", body = ErrorResponse)
    ),
    tag = "Operations"
)]
pub async fn cancel_operation(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CancelOperationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let operation = state
        .operations
        .cancel_operation(&req.operation_id, req.cancel_reason)
        .await?;
    Ok(Json(OperationResponse::from(operation)))
}

/// Latest OTP issued for an operation
#[utoipa::path(
    get,
    path = "/operation/{operation_id}/otp",
    params(("operation_id" = String, Path, description = "Operation ID")),
    responses(
        (status = 200, description = "OTP detail", body = Otp),
        (status = 404, description = "No OTP for operation", body = ErrorResponse)
    ),
    tag = "OTPs"
)]
pub async fn operation_otp_detail(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let otp = state.otps.get_otp_for_operation(&operation_id).await?;
    Ok(Json(otp))
}
