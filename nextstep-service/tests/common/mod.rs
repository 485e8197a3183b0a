use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use nextstep_service::{
    build_router, build_state,
    config::{Environment, NextStepConfig, OperationSettings, RateLimitConfig, SwaggerConfig},
    AppState,
};

pub fn test_config() -> NextStepConfig {
    NextStepConfig {
        common: service_core::config::Config { port: 8080 },
        environment: Environment::Dev,
        service_name: "nextstep-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        operation: OperationSettings {
            expiration_seconds: 300,
            max_auth_fails: 3,
            bootstrap_step_definitions: true,
        },
        swagger: SwaggerConfig { enabled: false },
        rate_limit: RateLimitConfig {
            global_ip_limit: 10_000,
            global_ip_window_seconds: 60,
        },
    }
}

/// Fully wired application with in-memory stores and the default step
/// definitions seeded.
pub async fn test_app() -> (Router, AppState) {
    let metrics_handle = PrometheusBuilder::new().build_recorder().handle();
    let state = build_state(test_config(), metrics_handle);
    state
        .step_definitions
        .bootstrap_default_definitions()
        .await
        .expect("Failed to seed step definitions");
    let app = build_router(state.clone())
        .await
        .expect("Failed to build router");
    (app, state)
}

pub async fn send_json(
    app: &Router,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            builder.body(Body::from(body.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Seeds an organization, a user, a password credential and an SMS OTP
/// definition through the admin endpoints.
pub async fn seed_basics(app: &Router) {
    let (status, _) = send_json(
        app,
        "POST",
        "/organization",
        Some(json!({"organization_id": "RETAIL", "is_default": true, "order_number": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send_json(
        app,
        "POST",
        "/user",
        Some(json!({"user_id": "user-1", "organization_id": "RETAIL"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send_json(
        app,
        "POST",
        "/credential/definition",
        Some(json!({
            "name": "PASSWORD",
            "organization_id": "RETAIL",
            "limit_soft": 3,
            "limit_hard": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send_json(
        app,
        "POST",
        "/credential",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "value": "s3cret"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send_json(
        app,
        "POST",
        "/otp/definition",
        Some(json!({
            "name": "SMS_OTP",
            "organization_id": "RETAIL",
            "length": 8,
            "attempt_limit": 3,
            "expiration_seconds": 120
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

/// Creates an operation and returns its ID.
pub async fn create_operation(app: &Router, operation_name: &str) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/operation",
        Some(json!({
            "operation_name": operation_name,
            "operation_data": "A1*A100.00EUR*Q238400856",
            "user_id": "user-1",
            "organization_id": "RETAIL"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["operation_id"].as_str().unwrap().to_string()
}
