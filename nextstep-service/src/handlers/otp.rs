//! OTP administration handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    dtos::{
        admin::{CreateOtpDefinitionRequest, CreateOtpRequest, CreateOtpResponse},
        ErrorResponse,
    },
    models::{Otp, OtpDefinition},
    utils::ValidatedJson,
    AppState,
};
use service_core::error::AppError;

/// Create an OTP definition
#[utoipa::path(
    post,
    path = "/otp/definition",
    request_body = CreateOtpDefinitionRequest,
    responses(
        (status = 201, description = "OTP definition created", body = OtpDefinition),
        (status = 409, description = "OTP definition already exists", body = ErrorResponse)
    ),
    tag = "OTPs"
)]
pub async fn create_otp_definition(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateOtpDefinitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let definition = state
        .otps
        .create_definition(
            req.name,
            req.organization_id,
            req.length,
            req.attempt_limit,
            req.expiration_seconds,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(definition)))
}

/// List OTP definitions
#[utoipa::path(
    get,
    path = "/otp/definition",
    responses(
        (status = 200, description = "OTP definitions", body = [OtpDefinition])
    ),
    tag = "OTPs"
)]
pub async fn list_otp_definitions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let definitions = state.otps.list_definitions().await?;
    Ok(Json(definitions))
}

/// OTP definition detail
#[utoipa::path(
    get,
    path = "/otp/definition/{name}",
    params(("name" = String, Path, description = "OTP definition name")),
    responses(
        (status = 200, description = "OTP definition detail", body = OtpDefinition),
        (status = 404, description = "OTP definition not found", body = ErrorResponse)
    ),
    tag = "OTPs"
)]
pub async fn get_otp_definition(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let definition = state.otps.get_definition(&name).await?;
    Ok(Json(definition))
}

/// Delete an OTP definition
#[utoipa::path(
    delete,
    path = "/otp/definition/{name}",
    params(("name" = String, Path, description = "OTP definition name")),
    responses(
        (status = 204, description = "OTP definition deleted"),
        (status = 404, description = "OTP definition not found", body = ErrorResponse)
    ),
    tag = "OTPs"
)]
pub async fn delete_otp_definition(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.otps.delete_definition(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Generate an OTP
#[utoipa::path(
    post,
    path = "/otp",
    request_body = CreateOtpRequest,
    responses(
        (status = 201, description = "OTP created", body = CreateOtpResponse),
        (status = 400, description = "OTP data not available", body = ErrorResponse),
        (status = 404, description = "OTP definition or operation not found", body = ErrorResponse)
    ),
    tag = "OTPs"
)]
pub async fn create_otp(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let otp = state
        .otps
        .create_otp(req.otp_name, req.user_id, req.operation_id, req.otp_data)
        .await?;
    Ok((StatusCode::CREATED, Json(CreateOtpResponse::from(otp))))
}

/// OTP detail
#[utoipa::path(
    get,
    path = "/otp/{otp_id}",
    params(("otp_id" = String, Path, description = "OTP ID")),
    responses(
        (status = 200, description = "OTP detail", body = Otp),
        (status = 404, description = "OTP not found", body = ErrorResponse)
    ),
    tag = "OTPs"
)]
pub async fn get_otp(
    State(state): State<AppState>,
    Path(otp_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let otp = state.otps.get_otp(&otp_id).await?;
    Ok(Json(otp))
}
