//! Credential administration handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    dtos::{
        admin::{
            CreateCredentialDefinitionRequest, CreateCredentialRequest,
            UpdateCredentialStatusRequest,
        },
        ErrorResponse,
    },
    models::{Credential, CredentialDefinition},
    utils::ValidatedJson,
    AppState,
};
use service_core::error::AppError;

/// Create a credential definition
#[utoipa::path(
    post,
    path = "/credential/definition",
    request_body = CreateCredentialDefinitionRequest,
    responses(
        (status = 201, description = "Credential definition created", body = CredentialDefinition),
        (status = 409, description = "Credential definition already exists", body = ErrorResponse)
    ),
    tag = "Credentials"
)]
pub async fn create_credential_definition(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateCredentialDefinitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let definition = state
        .credentials
        .create_definition(
            req.name,
            req.organization_id,
            req.description,
            req.limit_soft,
            req.limit_hard,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(definition)))
}

/// List credential definitions
#[utoipa::path(
    get,
    path = "/credential/definition",
    responses(
        (status = 200, description = "Credential definitions", body = [CredentialDefinition])
    ),
    tag = "Credentials"
)]
pub async fn list_credential_definitions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let definitions = state.credentials.list_definitions().await?;
    Ok(Json(definitions))
}

/// Credential definition detail
#[utoipa::path(
    get,
    path = "/credential/definition/{name}",
    params(("name" = String, Path, description = "Credential definition name")),
    responses(
        (status = 200, description = "Credential definition detail", body = CredentialDefinition),
        (status = 404, description = "Credential definition not found", body = ErrorResponse)
    ),
    tag = "Credentials"
)]
pub async fn get_credential_definition(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let definition = state.credentials.get_definition(&name).await?;
    Ok(Json(definition))
}

/// Delete a credential definition
#[utoipa::path(
    delete,
    path = "/credential/definition/{name}",
    params(("name" = String, Path, description = "Credential definition name")),
    responses(
        (status = 204, description = "Credential definition deleted"),
        (status = 404, description = "Credential definition not found", body = ErrorResponse)
    ),
    tag = "Credentials"
)]
pub async fn delete_credential_definition(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.credentials.delete_definition(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Issue a credential for a user
#[utoipa::path(
    post,
    path = "/credential",
    request_body = CreateCredentialRequest,
    responses(
        (status = 201, description = "Credential created", body = Credential),
        (status = 404, description = "Credential definition or user not found", body = ErrorResponse)
    ),
    tag = "Credentials"
)]
pub async fn create_credential(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateCredentialRequest>,
) -> Result<impl IntoResponse, AppError> {
    let credential = state
        .credentials
        .create_credential(req.credential_name, req.user_id, req.value)
        .await?;
    Ok((StatusCode::CREATED, Json(credential)))
}

/// Update credential status
#[utoipa::path(
    put,
    path = "/credential/status",
    request_body = UpdateCredentialStatusRequest,
    responses(
        (status = 200, description = "Credential status updated", body = Credential),
        (status = 404, description = "Credential not found", body = ErrorResponse)
    ),
    tag = "Credentials"
)]
pub async fn update_credential_status(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateCredentialStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let credential = state
        .credentials
        .update_credential_status(&req.credential_name, &req.user_id, req.status)
        .await?;
    Ok(Json(credential))
}
