//! Step-definition and operation-config administration handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    dtos::{
        admin::{
            CreateMethodConfigRequest, CreateOperationConfigRequest, CreateStepDefinitionRequest,
        },
        ErrorResponse,
    },
    models::{AuthMethod, OperationConfig, OperationMethodConfig, StepDefinition},
    utils::ValidatedJson,
    AppState,
};
use service_core::error::AppError;

/// Create a step definition
#[utoipa::path(
    post,
    path = "/step/definition",
    request_body = CreateStepDefinitionRequest,
    responses(
        (status = 201, description = "Step definition created", body = StepDefinition),
        (status = 409, description = "Step definition already exists", body = ErrorResponse)
    ),
    tag = "Step definitions"
)]
pub async fn create_step_definition(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateStepDefinitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let definition = state
        .step_definitions
        .create_step_definition(StepDefinition {
            step_definition_id: req.step_definition_id,
            operation_name: req.operation_name,
            operation_type: req.operation_type,
            request_auth_method: req.request_auth_method,
            request_auth_step_result: req.request_auth_step_result,
            response_priority: req.response_priority,
            response_auth_method: req.response_auth_method,
            response_result: req.response_result,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(definition)))
}

/// Step definitions for an operation name
#[utoipa::path(
    get,
    path = "/step/definition/{operation_name}",
    params(("operation_name" = String, Path, description = "Operation name")),
    responses(
        (status = 200, description = "Step definitions in priority order", body = [StepDefinition])
    ),
    tag = "Step definitions"
)]
pub async fn list_step_definitions(
    State(state): State<AppState>,
    Path(operation_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let definitions = state
        .step_definitions
        .list_step_definitions(&operation_name)
        .await?;
    Ok(Json(definitions))
}

/// Delete a step definition
#[utoipa::path(
    delete,
    path = "/step/definition/{operation_name}/{step_definition_id}",
    params(
        ("operation_name" = String, Path, description = "Operation name"),
        ("step_definition_id" = u64, Path, description = "Step definition ID")
    ),
    responses(
        (status = 204, description = "Step definition deleted"),
        (status = 404, description = "Step definition not found", body = ErrorResponse)
    ),
    tag = "Step definitions"
)]
pub async fn delete_step_definition(
    State(state): State<AppState>,
    Path((operation_name, step_definition_id)): Path<(String, u64)>,
) -> Result<impl IntoResponse, AppError> {
    state
        .step_definitions
        .delete_step_definition(&operation_name, step_definition_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create an operation config
#[utoipa::path(
    post,
    path = "/operation/config",
    request_body = CreateOperationConfigRequest,
    responses(
        (status = 201, description = "Operation config created", body = OperationConfig),
        (status = 409, description = "Operation config already exists", body = ErrorResponse)
    ),
    tag = "Step definitions"
)]
pub async fn create_operation_config(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateOperationConfigRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = state
        .step_definitions
        .create_operation_config(OperationConfig {
            operation_name: req.operation_name,
            expiration_seconds: req.expiration_seconds,
            mobile_token_enabled: req.mobile_token_enabled,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(config)))
}

/// List operation configs
#[utoipa::path(
    get,
    path = "/operation/config",
    responses(
        (status = 200, description = "Operation configs", body = [OperationConfig])
    ),
    tag = "Step definitions"
)]
pub async fn list_operation_configs(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let configs = state.step_definitions.list_operation_configs().await?;
    Ok(Json(configs))
}

/// Operation config detail
#[utoipa::path(
    get,
    path = "/operation/config/{operation_name}",
    params(("operation_name" = String, Path, description = "Operation name")),
    responses(
        (status = 200, description = "Operation config detail", body = OperationConfig),
        (status = 404, description = "Operation config not found", body = ErrorResponse)
    ),
    tag = "Step definitions"
)]
pub async fn get_operation_config(
    State(state): State<AppState>,
    Path(operation_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let config = state
        .step_definitions
        .get_operation_config(&operation_name)
        .await?;
    Ok(Json(config))
}

/// Delete an operation config
#[utoipa::path(
    delete,
    path = "/operation/config/{operation_name}",
    params(("operation_name" = String, Path, description = "Operation name")),
    responses(
        (status = 204, description = "Operation config deleted"),
        (status = 404, description = "Operation config not found", body = ErrorResponse)
    ),
    tag = "Step definitions"
)]
pub async fn delete_operation_config(
    State(state): State<AppState>,
    Path(operation_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .step_definitions
        .delete_operation_config(&operation_name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create or replace a per-method attempt ceiling
#[utoipa::path(
    post,
    path = "/operation/authMethod/config",
    request_body = CreateMethodConfigRequest,
    responses(
        (status = 200, description = "Method config saved", body = OperationMethodConfig)
    ),
    tag = "Step definitions"
)]
pub async fn save_method_config(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateMethodConfigRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = state
        .step_definitions
        .save_method_config(OperationMethodConfig {
            operation_name: req.operation_name,
            auth_method: req.auth_method,
            max_auth_fails: req.max_auth_fails,
        })
        .await?;
    Ok(Json(config))
}

/// Delete a per-method attempt ceiling
#[utoipa::path(
    delete,
    path = "/operation/authMethod/config/{operation_name}/{auth_method}",
    params(
        ("operation_name" = String, Path, description = "Operation name"),
        ("auth_method" = AuthMethod, Path, description = "Authentication method")
    ),
    responses(
        (status = 204, description = "Method config deleted"),
        (status = 404, description = "Method config not found", body = ErrorResponse)
    ),
    tag = "Step definitions"
)]
pub async fn delete_method_config(
    State(state): State<AppState>,
    Path((operation_name, auth_method)): Path<(String, AuthMethod)>,
) -> Result<impl IntoResponse, AppError> {
    state
        .step_definitions
        .delete_method_config(&operation_name, auth_method)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
