//! Authentication dispatcher handlers.

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    dtos::{
        auth::{
            AuthenticationResponse, CombinedAuthenticationRequest,
            CredentialAuthenticationRequest, OtpAuthenticationRequest,
        },
        ErrorResponse,
    },
    services::{CombinedAuthInput, CredentialAuthInput, OtpAuthInput},
    utils::ValidatedJson,
    AppState,
};
use service_core::error::AppError;

/// Authenticate with a credential
#[utoipa::path(
    post,
    path = "/auth/credential",
    request_body = CredentialAuthenticationRequest,
    responses(
        (status = 200, description = "Authentication result", body = AuthenticationResponse),
        (status = 400, description = "Credential or user not active", body = ErrorResponse),
        (status = 404, description = "Credential, user or operation not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn authenticate_credential(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CredentialAuthenticationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .authentication
        .authenticate_with_credential(CredentialAuthInput {
            credential_name: req.credential_name,
            user_id: req.user_id,
            credential_value: req.credential_value,
            operation_id: req.operation_id,
            auth_method: req.auth_method,
        })
        .await?;
    Ok(Json(AuthenticationResponse::from(outcome)))
}

/// Authenticate with an OTP
#[utoipa::path(
    post,
    path = "/auth/otp",
    request_body = OtpAuthenticationRequest,
    responses(
        (status = 200, description = "Authentication result", body = AuthenticationResponse),
        (status = 400, description = "OTP not active or request incomplete", body = ErrorResponse),
        (status = 404, description = "OTP or operation not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn authenticate_otp(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<OtpAuthenticationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .authentication
        .authenticate_with_otp(OtpAuthInput {
            otp_id: req.otp_id,
            operation_id: req.operation_id,
            otp_value: req.otp_value,
            auth_method: req.auth_method,
        })
        .await?;
    Ok(Json(AuthenticationResponse::from(outcome)))
}

/// Authenticate with a credential and an OTP in one call
#[utoipa::path(
    post,
    path = "/auth/combined",
    request_body = CombinedAuthenticationRequest,
    responses(
        (status = 200, description = "Authentication result", body = AuthenticationResponse),
        (status = 400, description = "Credential, user or OTP not active", body = ErrorResponse),
        (status = 404, description = "Credential, user, OTP or operation not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn authenticate_combined(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CombinedAuthenticationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .authentication
        .authenticate_combined(CombinedAuthInput {
            credential: CredentialAuthInput {
                credential_name: req.credential_name,
                user_id: req.user_id,
                credential_value: req.credential_value,
                operation_id: req.operation_id,
                auth_method: req.auth_method,
            },
            otp_value: req.otp_value,
        })
        .await?;
    Ok(Json(AuthenticationResponse::from(outcome)))
}
