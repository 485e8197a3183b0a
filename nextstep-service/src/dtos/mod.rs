//! Request and response types for the HTTP surface.

pub mod admin;
pub mod auth;
pub mod operation;

use serde::Serialize;
use utoipa::ToSchema;

/// OpenAPI mirror of the error body produced by the shared error handler.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
