mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_operation, seed_basics, send_json, test_app};

#[tokio::test]
async fn create_login_operation_resolves_initial_step() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/operation",
        Some(json!({
            "operation_name": "login",
            "operation_data": "A2",
            "user_id": "user-1",
            "organization_id": "RETAIL"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["result"], "CONTINUE");
    assert_eq!(body["steps"][0]["auth_method"], "USERNAME_PASSWORD_AUTH");
    assert_eq!(body["history"].as_array().unwrap().len(), 1);
    assert_eq!(body["history"][0]["auth_method"], "INIT");
}

#[tokio::test]
async fn confirmed_step_finishes_login_operation() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "login").await;

    let (status, body) = send_json(
        &app,
        "PUT",
        "/operation",
        Some(json!({
            "operation_id": operation_id,
            "auth_method": "USERNAME_PASSWORD_AUTH",
            "auth_step_result": "CONFIRMED"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "DONE");
    assert!(body["steps"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_after_done_is_rejected_and_state_unchanged() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "login").await;

    let confirm = json!({
        "operation_id": operation_id,
        "auth_method": "USERNAME_PASSWORD_AUTH",
        "auth_step_result": "CONFIRMED"
    });
    let (status, _) = send_json(&app, "PUT", "/operation", Some(confirm.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, "PUT", "/operation", Some(confirm)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "OPERATION_ALREADY_FINISHED");

    let (status, body) = send_json(
        &app,
        "POST",
        "/operation/detail",
        Some(json!({"operation_id": operation_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "DONE");
    assert_eq!(body["history"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn update_of_unknown_operation_returns_not_found() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let (status, body) = send_json(
        &app,
        "PUT",
        "/operation",
        Some(json!({
            "operation_id": "no-such-operation",
            "auth_method": "USERNAME_PASSWORD_AUTH",
            "auth_step_result": "CONFIRMED"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "OPERATION_NOT_FOUND");
}

#[tokio::test]
async fn duplicate_operation_id_is_a_conflict() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let request = json!({
        "operation_name": "login",
        "operation_id": "op-fixed",
        "operation_data": "A2"
    });
    let (status, _) = send_json(&app, "POST", "/operation", Some(request.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(&app, "POST", "/operation", Some(request)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "OPERATION_ALREADY_EXISTS");
}

#[tokio::test]
async fn ineligible_method_is_rejected() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "login").await;

    let (status, body) = send_json(
        &app,
        "PUT",
        "/operation",
        Some(json!({
            "operation_id": operation_id,
            "auth_method": "SMS_KEY",
            "auth_step_result": "CONFIRMED"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "AUTH_METHOD_NOT_FOUND");
}

#[tokio::test]
async fn canceled_operation_rejects_further_updates() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "login").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/operation/cancel",
        Some(json!({
            "operation_id": operation_id,
            "cancel_reason": "INCORRECT_DATA"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "FAILED");
    assert_eq!(body["cancel_reason"], "INCORRECT_DATA");

    let (status, body) = send_json(
        &app,
        "PUT",
        "/operation",
        Some(json!({
            "operation_id": operation_id,
            "auth_method": "USERNAME_PASSWORD_AUTH",
            "auth_step_result": "CONFIRMED"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "OPERATION_ALREADY_CANCELED");
}

#[tokio::test]
async fn expired_operation_is_not_valid_for_updates() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    // Zero lifetime makes the operation expire immediately after creation.
    let (status, _) = send_json(
        &app,
        "POST",
        "/operation/config",
        Some(json!({"operation_name": "login", "expiration_seconds": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let operation_id = create_operation(&app, "login").await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let (status, body) = send_json(
        &app,
        "PUT",
        "/operation",
        Some(json!({
            "operation_id": operation_id,
            "auth_method": "USERNAME_PASSWORD_AUTH",
            "auth_step_result": "CONFIRMED"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "OPERATION_NOT_VALID");

    let (status, body) = send_json(
        &app,
        "POST",
        "/operation/detail",
        Some(json!({"operation_id": operation_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "FAILED");
    assert_eq!(body["cancel_reason"], "TIMED_OUT_OPERATION");
}

#[tokio::test]
async fn failed_attempts_retry_until_the_ceiling_is_hit() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "authorize_payment").await;

    let failed_update = json!({
        "operation_id": operation_id,
        "auth_method": "SMS_KEY",
        "auth_step_result": "AUTH_FAILED"
    });

    // Default ceiling is 3; the first two failures keep the step eligible.
    for _ in 0..2 {
        let (status, body) = send_json(&app, "PUT", "/operation", Some(failed_update.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "CONTINUE");
        assert_eq!(body["steps"][0]["auth_method"], "SMS_KEY");
    }

    let (status, body) = send_json(&app, "PUT", "/operation", Some(failed_update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "FAILED");
    assert!(body["steps"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn payment_operation_offers_methods_in_priority_order() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/operation",
        Some(json!({
            "operation_name": "authorize_payment",
            "operation_data": "A1*A100.00EUR*Q238400856",
            "user_id": "user-1",
            "organization_id": "RETAIL"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["steps"][0]["auth_method"], "SMS_KEY");
    assert_eq!(body["steps"][1]["auth_method"], "MOBILE_TOKEN");
}

#[tokio::test]
async fn chosen_auth_method_must_be_eligible() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "authorize_payment").await;

    let (status, body) = send_json(
        &app,
        "PUT",
        "/operation/chosenAuthMethod",
        Some(json!({
            "operation_id": operation_id,
            "chosen_auth_method": "SMS_KEY"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chosen_auth_method"], "SMS_KEY");

    let (status, body) = send_json(
        &app,
        "PUT",
        "/operation/chosenAuthMethod",
        Some(json!({
            "operation_id": operation_id,
            "chosen_auth_method": "CONSENT"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "AUTH_METHOD_NOT_FOUND");
}

#[tokio::test]
async fn pending_operations_shrink_as_operations_finish() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let first = create_operation(&app, "login").await;
    let _second = create_operation(&app, "authorize_payment").await;

    let list_request = json!({"user_id": "user-1"});
    let (status, body) = send_json(&app, "POST", "/user/operation/list", Some(list_request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operations"].as_array().unwrap().len(), 2);

    let (status, _) = send_json(
        &app,
        "PUT",
        "/operation",
        Some(json!({
            "operation_id": first,
            "auth_method": "USERNAME_PASSWORD_AUTH",
            "auth_step_result": "CONFIRMED"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, "POST", "/user/operation/list", Some(list_request)).await;
    assert_eq!(status, StatusCode::OK);
    let operations = body["operations"].as_array().unwrap();
    assert_eq!(operations.len(), 1);
    assert_eq!(operations[0]["operation_name"], "authorize_payment");
}

#[tokio::test]
async fn external_transaction_lookup_finds_operations() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/operation",
        Some(json!({
            "operation_name": "login",
            "operation_data": "A2",
            "external_transaction_id": "ext-42"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        &app,
        "POST",
        "/operation/lookup/external",
        Some(json!({"external_transaction_id": "ext-42"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operations"].as_array().unwrap().len(), 1);

    let (status, body) = send_json(
        &app,
        "POST",
        "/operation/lookup/external",
        Some(json!({"external_transaction_id": "ext-unknown"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "OPERATION_NOT_FOUND");
}

#[tokio::test]
async fn operation_auxiliary_updates_round_trip() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "authorize_payment").await;

    let (status, body) = send_json(
        &app,
        "PUT",
        "/operation/formData",
        Some(json!({
            "operation_id": operation_id,
            "form_data": {"title": "Payment approval", "amount": "100.00"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form_data"]["amount"], "100.00");

    let (status, body) = send_json(
        &app,
        "PUT",
        "/operation/mobileToken/status",
        Some(json!({"operation_id": operation_id, "mobile_token_active": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mobile_token_active"], true);

    let (status, body) = send_json(
        &app,
        "PUT",
        "/operation/application",
        Some(json!({
            "operation_id": operation_id,
            "application_context": {"id": "app-1", "name": "Internet banking"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["application_context"]["name"], "Internet banking");
}

#[tokio::test]
async fn user_can_be_assigned_to_anonymous_operation() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/operation",
        Some(json!({"operation_name": "login", "operation_data": "A2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["user_id"].is_null());
    let operation_id = body["operation_id"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        &app,
        "PUT",
        "/operation/user",
        Some(json!({
            "operation_id": operation_id,
            "user_id": "user-1",
            "organization_id": "RETAIL",
            "user_account_status": "ACTIVE"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "user-1");
    assert_eq!(body["organization_id"], "RETAIL");
}

#[tokio::test]
async fn operation_config_crud() {
    let (app, _state) = test_app().await;

    let config = json!({"operation_name": "login", "expiration_seconds": 600, "mobile_token_enabled": true});
    let (status, _) = send_json(&app, "POST", "/operation/config", Some(config.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(&app, "POST", "/operation/config", Some(config)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "OPERATION_CONFIG_ALREADY_EXISTS");

    let (status, body) = send_json(&app, "GET", "/operation/config/login", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expiration_seconds"], 600);

    let (status, _) = send_json(&app, "DELETE", "/operation/config/login", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send_json(&app, "GET", "/operation/config/login", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "OPERATION_CONFIG_NOT_FOUND");
}

#[tokio::test]
async fn step_definitions_can_be_administered() {
    let (app, _state) = test_app().await;

    let definition = json!({
        "step_definition_id": 1,
        "operation_name": "approve_document",
        "operation_type": "CREATE",
        "response_priority": 1,
        "response_auth_method": "CONSENT",
        "response_result": "CONTINUE"
    });
    let (status, _) = send_json(&app, "POST", "/step/definition", Some(definition.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(&app, "POST", "/step/definition", Some(definition)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "STEP_DEFINITION_ALREADY_EXISTS");

    let (status, body) = send_json(&app, "GET", "/step/definition/approve_document", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send_json(&app, "DELETE", "/step/definition/approve_document/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send_json(&app, "DELETE", "/step/definition/approve_document/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "STEP_DEFINITION_NOT_FOUND");
}

#[tokio::test]
async fn operation_without_step_definitions_cannot_be_created() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/operation",
        Some(json!({"operation_name": "unknown_operation", "operation_data": "A9"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "OPERATION_CONFIG_NOT_FOUND");
}
