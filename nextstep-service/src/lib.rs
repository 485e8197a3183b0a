pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use service_core::axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, rate_limit::ip_rate_limit_middleware,
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::NextStepConfig;
use crate::services::{
    AuthenticationService, CredentialService, OperationDefaults, OperationService,
    OrganizationService, OtpService, PlaintextValueValidator, StepDefinitionService, UserService,
};
use crate::store::{
    InMemoryAuthenticationRepository, InMemoryCredentialDefinitionRepository,
    InMemoryCredentialRepository, InMemoryOperationConfigRepository, InMemoryOperationRepository,
    InMemoryOrganizationRepository, InMemoryOtpDefinitionRepository, InMemoryOtpRepository,
    InMemoryStepDefinitionRepository, InMemoryUserRepository, OperationLocks,
};
use service_core::error::AppError;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::operation::create_operation,
        handlers::operation::update_operation,
        handlers::operation::update_operation_user,
        handlers::operation::operation_detail,
        handlers::operation::pending_operations,
        handlers::operation::lookup_external,
        handlers::operation::update_form_data,
        handlers::operation::update_chosen_auth_method,
        handlers::operation::update_mobile_token_status,
        handlers::operation::update_application_context,
        handlers::operation::cancel_operation,
        handlers::operation::operation_otp_detail,
        handlers::authentication::authenticate_credential,
        handlers::authentication::authenticate_otp,
        handlers::authentication::authenticate_combined,
        handlers::organization::create_organization,
        handlers::organization::list_organizations,
        handlers::organization::get_organization,
        handlers::organization::delete_organization,
        handlers::user::create_user,
        handlers::user::get_user,
        handlers::user::update_user_status,
        handlers::user::list_user_credentials,
        handlers::user::list_user_authentications,
        handlers::credential::create_credential_definition,
        handlers::credential::list_credential_definitions,
        handlers::credential::get_credential_definition,
        handlers::credential::delete_credential_definition,
        handlers::credential::create_credential,
        handlers::credential::update_credential_status,
        handlers::otp::create_otp_definition,
        handlers::otp::list_otp_definitions,
        handlers::otp::get_otp_definition,
        handlers::otp::delete_otp_definition,
        handlers::otp::create_otp,
        handlers::otp::get_otp,
        handlers::step_definition::create_step_definition,
        handlers::step_definition::list_step_definitions,
        handlers::step_definition::delete_step_definition,
        handlers::step_definition::create_operation_config,
        handlers::step_definition::list_operation_configs,
        handlers::step_definition::get_operation_config,
        handlers::step_definition::delete_operation_config,
        handlers::step_definition::save_method_config,
        handlers::step_definition::delete_method_config,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::operation::CreateOperationRequest,
            dtos::operation::UpdateOperationRequest,
            dtos::operation::UpdateOperationUserRequest,
            dtos::operation::OperationDetailRequest,
            dtos::operation::PendingOperationsRequest,
            dtos::operation::LookupExternalTransactionRequest,
            dtos::operation::UpdateFormDataRequest,
            dtos::operation::UpdateChosenAuthMethodRequest,
            dtos::operation::UpdateMobileTokenStatusRequest,
            dtos::operation::UpdateApplicationContextRequest,
            dtos::operation::CancelOperationRequest,
            dtos::operation::OperationResponse,
            dtos::operation::OperationListResponse,
            dtos::auth::CredentialAuthenticationRequest,
            dtos::auth::OtpAuthenticationRequest,
            dtos::auth::CombinedAuthenticationRequest,
            dtos::auth::AuthenticationResponse,
            dtos::admin::CreateOrganizationRequest,
            dtos::admin::CreateUserRequest,
            dtos::admin::UpdateUserStatusRequest,
            dtos::admin::CreateCredentialDefinitionRequest,
            dtos::admin::CreateCredentialRequest,
            dtos::admin::UpdateCredentialStatusRequest,
            dtos::admin::CreateOtpDefinitionRequest,
            dtos::admin::CreateOtpRequest,
            dtos::admin::CreateOtpResponse,
            dtos::admin::CreateStepDefinitionRequest,
            dtos::admin::CreateOperationConfigRequest,
            dtos::admin::CreateMethodConfigRequest,
            models::AuthMethod,
            models::AuthResult,
            models::AuthStepResult,
            models::AuthStep,
            models::OperationCancelReason,
            models::OperationHistoryEntry,
            models::ApplicationContext,
            models::UserAccountStatus,
            models::StepRequestType,
            models::StepDefinition,
            models::OperationConfig,
            models::OperationMethodConfig,
            models::Organization,
            models::UserIdentity,
            models::UserIdentityStatus,
            models::CredentialDefinition,
            models::Credential,
            models::CredentialStatus,
            models::OtpDefinition,
            models::Otp,
            models::OtpStatus,
            models::AuthenticationRecord,
            models::AuthenticationType,
            models::AuthenticationResult,
        )
    ),
    tags(
        (name = "Operations", description = "Operation lifecycle and step resolution"),
        (name = "Authentication", description = "Credential, OTP and combined authentication"),
        (name = "Organizations", description = "Organization administration"),
        (name = "Users", description = "User identity administration"),
        (name = "Credentials", description = "Credential definitions and credentials"),
        (name = "OTPs", description = "OTP definitions and one-time passwords"),
        (name = "Step definitions", description = "Method-chain configuration"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<NextStepConfig>,
    pub operations: Arc<OperationService>,
    pub authentication: Arc<AuthenticationService>,
    pub credentials: Arc<CredentialService>,
    pub otps: Arc<OtpService>,
    pub users: Arc<UserService>,
    pub organizations: Arc<OrganizationService>,
    pub step_definitions: Arc<StepDefinitionService>,
    pub metrics_handle: PrometheusHandle,
    pub ip_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
}

/// Wires the in-memory stores and services into an application state.
pub fn build_state(config: NextStepConfig, metrics_handle: PrometheusHandle) -> AppState {
    let operation_repo = Arc::new(InMemoryOperationRepository::new());
    let step_definition_repo = Arc::new(InMemoryStepDefinitionRepository::new());
    let operation_config_repo = Arc::new(InMemoryOperationConfigRepository::new());
    let credential_definition_repo = Arc::new(InMemoryCredentialDefinitionRepository::new());
    let credential_repo = Arc::new(InMemoryCredentialRepository::new());
    let otp_definition_repo = Arc::new(InMemoryOtpDefinitionRepository::new());
    let otp_repo = Arc::new(InMemoryOtpRepository::new());
    let user_repo = Arc::new(InMemoryUserRepository::new());
    let organization_repo = Arc::new(InMemoryOrganizationRepository::new());
    let authentication_repo = Arc::new(InMemoryAuthenticationRepository::new());
    let locks = Arc::new(OperationLocks::new());

    let operations = Arc::new(OperationService::new(
        operation_repo.clone(),
        step_definition_repo.clone(),
        operation_config_repo.clone(),
        organization_repo.clone(),
        locks,
        OperationDefaults {
            expiration_seconds: config.operation.expiration_seconds,
            max_auth_fails: config.operation.max_auth_fails,
        },
    ));
    let organizations = Arc::new(OrganizationService::new(organization_repo.clone()));
    let users = Arc::new(UserService::new(user_repo.clone(), organization_repo));
    let credentials = Arc::new(CredentialService::new(
        credential_definition_repo,
        credential_repo,
        user_repo,
    ));
    let otps = Arc::new(OtpService::new(
        otp_definition_repo,
        otp_repo,
        operation_repo,
    ));
    let step_definitions = Arc::new(StepDefinitionService::new(
        step_definition_repo,
        operation_config_repo,
    ));
    let authentication = Arc::new(AuthenticationService::new(
        credentials.clone(),
        otps.clone(),
        users.clone(),
        operations.clone(),
        authentication_repo,
        Arc::new(PlaintextValueValidator),
    ));

    let ip_rate_limiter = service_core::middleware::rate_limit::create_ip_rate_limiter(
        config.rate_limit.global_ip_limit,
        config.rate_limit.global_ip_window_seconds,
    );

    AppState {
        config: Arc::new(config),
        operations,
        authentication,
        credentials,
        otps,
        users,
        organizations,
        step_definitions,
        metrics_handle,
        ip_rate_limiter,
    }
}

pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics));

    if state.config.swagger.enabled {
        app =
            app.merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    } else {
        app = app.route(
            "/.well-known/openapi.json",
            get(|| async { service_core::axum::Json(ApiDoc::openapi()) }),
        );
    }

    let ip_limiter = state.ip_rate_limiter.clone();

    let app = app
        // Operation lifecycle
        .route(
            "/operation",
            post(handlers::operation::create_operation).put(handlers::operation::update_operation),
        )
        .route(
            "/operation/update",
            post(handlers::operation::update_operation),
        )
        .route(
            "/operation/user",
            put(handlers::operation::update_operation_user),
        )
        .route(
            "/operation/detail",
            post(handlers::operation::operation_detail),
        )
        .route(
            "/user/operation/list",
            post(handlers::operation::pending_operations),
        )
        .route(
            "/operation/lookup/external",
            post(handlers::operation::lookup_external),
        )
        .route(
            "/operation/formData",
            put(handlers::operation::update_form_data),
        )
        .route(
            "/operation/chosenAuthMethod",
            put(handlers::operation::update_chosen_auth_method),
        )
        .route(
            "/operation/mobileToken/status",
            put(handlers::operation::update_mobile_token_status),
        )
        .route(
            "/operation/application",
            put(handlers::operation::update_application_context),
        )
        .route(
            "/operation/cancel",
            post(handlers::operation::cancel_operation),
        )
        .route(
            "/operation/:operation_id/otp",
            get(handlers::operation::operation_otp_detail),
        )
        // Operation configuration
        .route(
            "/operation/config",
            post(handlers::step_definition::create_operation_config)
                .get(handlers::step_definition::list_operation_configs),
        )
        .route(
            "/operation/config/:operation_name",
            get(handlers::step_definition::get_operation_config)
                .delete(handlers::step_definition::delete_operation_config),
        )
        .route(
            "/operation/authMethod/config",
            post(handlers::step_definition::save_method_config),
        )
        .route(
            "/operation/authMethod/config/:operation_name/:auth_method",
            delete(handlers::step_definition::delete_method_config),
        )
        // Authentication dispatcher
        .route(
            "/auth/credential",
            post(handlers::authentication::authenticate_credential),
        )
        .route("/auth/otp", post(handlers::authentication::authenticate_otp))
        .route(
            "/auth/combined",
            post(handlers::authentication::authenticate_combined),
        )
        // Administration
        .route(
            "/organization",
            post(handlers::organization::create_organization)
                .get(handlers::organization::list_organizations),
        )
        .route(
            "/organization/:organization_id",
            get(handlers::organization::get_organization)
                .delete(handlers::organization::delete_organization),
        )
        .route("/user", post(handlers::user::create_user))
        .route("/user/:user_id", get(handlers::user::get_user))
        .route(
            "/user/:user_id/status",
            put(handlers::user::update_user_status),
        )
        .route(
            "/user/:user_id/credential",
            get(handlers::user::list_user_credentials),
        )
        .route(
            "/user/:user_id/authentication",
            get(handlers::user::list_user_authentications),
        )
        .route(
            "/credential/definition",
            post(handlers::credential::create_credential_definition)
                .get(handlers::credential::list_credential_definitions),
        )
        .route(
            "/credential/definition/:name",
            get(handlers::credential::get_credential_definition)
                .delete(handlers::credential::delete_credential_definition),
        )
        .route("/credential", post(handlers::credential::create_credential))
        .route(
            "/credential/status",
            put(handlers::credential::update_credential_status),
        )
        .route(
            "/otp/definition",
            post(handlers::otp::create_otp_definition).get(handlers::otp::list_otp_definitions),
        )
        .route(
            "/otp/definition/:name",
            get(handlers::otp::get_otp_definition).delete(handlers::otp::delete_otp_definition),
        )
        .route("/otp", post(handlers::otp::create_otp))
        .route("/otp/:otp_id", get(handlers::otp::get_otp))
        .route(
            "/step/definition",
            post(handlers::step_definition::create_step_definition),
        )
        .route(
            "/step/definition/:operation_name",
            get(handlers::step_definition::list_step_definitions),
        )
        .route(
            "/step/definition/:operation_name/:step_definition_id",
            delete(handlers::step_definition::delete_step_definition),
        )
        .with_state(state)
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &service_core::axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive());

    Ok(app)
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy")
    ),
    tag = "Observability"
)]
pub async fn health_check(
    service_core::axum::extract::State(state): service_core::axum::extract::State<AppState>,
) -> service_core::axum::Json<serde_json::Value> {
    service_core::axum::Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
    }))
}
