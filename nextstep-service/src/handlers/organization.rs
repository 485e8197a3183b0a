//! Organization administration handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    dtos::{admin::CreateOrganizationRequest, ErrorResponse},
    models::Organization,
    utils::ValidatedJson,
    AppState,
};
use service_core::error::AppError;

/// Create an organization
#[utoipa::path(
    post,
    path = "/organization",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = Organization),
        (status = 409, description = "Organization already exists", body = ErrorResponse)
    ),
    tag = "Organizations"
)]
pub async fn create_organization(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let organization = state
        .organizations
        .create_organization(
            req.organization_id,
            req.display_name_key,
            req.is_default,
            req.order_number,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(organization)))
}

/// List organizations
#[utoipa::path(
    get,
    path = "/organization",
    responses(
        (status = 200, description = "Organizations ordered by order number", body = [Organization])
    ),
    tag = "Organizations"
)]
pub async fn list_organizations(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let organizations = state.organizations.list_organizations().await?;
    Ok(Json(organizations))
}

/// Organization detail
#[utoipa::path(
    get,
    path = "/organization/{organization_id}",
    params(("organization_id" = String, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization detail", body = Organization),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "Organizations"
)]
pub async fn get_organization(
    State(state): State<AppState>,
    Path(organization_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let organization = state.organizations.get_organization(&organization_id).await?;
    Ok(Json(organization))
}

/// Delete an organization
#[utoipa::path(
    delete,
    path = "/organization/{organization_id}",
    params(("organization_id" = String, Path, description = "Organization ID")),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "Organizations"
)]
pub async fn delete_organization(
    State(state): State<AppState>,
    Path(organization_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.organizations.delete_organization(&organization_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
