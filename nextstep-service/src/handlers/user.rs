//! User identity handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    dtos::{
        admin::{CreateUserRequest, UpdateUserStatusRequest},
        ErrorResponse,
    },
    models::{AuthenticationRecord, Credential, UserIdentity},
    utils::ValidatedJson,
    AppState,
};
use service_core::error::AppError;

/// Create a user identity
#[utoipa::path(
    post,
    path = "/user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User identity created", body = UserIdentity),
        (status = 404, description = "Organization not found", body = ErrorResponse),
        (status = 409, description = "User identity already exists", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.create_user(req.user_id, req.organization_id).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// User identity detail
#[utoipa::path(
    get,
    path = "/user/{user_id}",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User identity detail", body = UserIdentity),
        (status = 404, description = "User identity not found", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.get_user(&user_id).await?;
    Ok(Json(user))
}

/// Update user identity status
#[utoipa::path(
    put,
    path = "/user/{user_id}/status",
    params(("user_id" = String, Path, description = "User ID")),
    request_body = UpdateUserStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = UserIdentity),
        (status = 404, description = "User identity not found", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn update_user_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateUserStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.update_user_status(&user_id, req.status).await?;
    Ok(Json(user))
}

/// Credentials issued to a user
#[utoipa::path(
    get,
    path = "/user/{user_id}/credential",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User credentials", body = [Credential])
    ),
    tag = "Users"
)]
pub async fn list_user_credentials(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let credentials = state.credentials.list_credentials(&user_id).await?;
    Ok(Json(credentials))
}

/// Authentication audit records for a user
#[utoipa::path(
    get,
    path = "/user/{user_id}/authentication",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Authentication records, oldest first", body = [AuthenticationRecord])
    ),
    tag = "Users"
)]
pub async fn list_user_authentications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let records = state.authentication.list_for_user(&user_id).await?;
    Ok(Json(records))
}
