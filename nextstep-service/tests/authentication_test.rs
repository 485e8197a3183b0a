mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_operation, seed_basics, send_json, test_app};

#[tokio::test]
async fn credential_success_completes_login_operation() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "login").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/credential",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "credential_value": "s3cret",
            "operation_id": operation_id
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "SUCCEEDED");
    assert_eq!(body["result_credential"], "SUCCEEDED");
    assert_eq!(body["operation"]["result"], "DONE");
}

#[tokio::test]
async fn failed_credential_attempts_fail_the_operation_at_the_ceiling() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "login").await;

    let bad_request = json!({
        "credential_name": "PASSWORD",
        "user_id": "user-1",
        "credential_value": "wrong",
        "operation_id": operation_id
    });

    // Operation ceiling of 3 is tighter than the hard credential limit of 5.
    let (status, body) = send_json(&app, "POST", "/auth/credential", Some(bad_request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "FAILED");
    assert_eq!(body["remaining_attempts"], 2);
    assert_eq!(body["operation"]["result"], "CONTINUE");

    let (_, body) = send_json(&app, "POST", "/auth/credential", Some(bad_request.clone())).await;
    assert_eq!(body["remaining_attempts"], 1);
    assert_eq!(body["operation"]["result"], "CONTINUE");

    let (status, body) = send_json(&app, "POST", "/auth/credential", Some(bad_request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "FAILED");
    assert_eq!(body["operation"]["result"], "FAILED");

    // The third failure also tripped the soft credential limit.
    let (status, body) = send_json(&app, "GET", "/user/user-1/credential", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["status"], "BLOCKED_TEMPORARY");
    assert_eq!(body[0]["failed_attempt_counter_soft"], 3);

    // The blocked credential is rejected before any value comparison.
    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/credential",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "credential_value": "wrong"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CREDENTIAL_NOT_ACTIVE");
}

#[tokio::test]
async fn reactivating_a_blocked_credential_resets_counters() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let bad_request = json!({
        "credential_name": "PASSWORD",
        "user_id": "user-1",
        "credential_value": "wrong"
    });
    for _ in 0..3 {
        let (status, _) = send_json(&app, "POST", "/auth/credential", Some(bad_request.clone())).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send_json(
        &app,
        "PUT",
        "/credential/status",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "status": "ACTIVE"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACTIVE");
    assert_eq!(body["failed_attempt_counter_soft"], 0);
    assert_eq!(body["failed_attempt_counter_hard"], 0);

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/credential",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "credential_value": "s3cret"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "SUCCEEDED");
}

#[tokio::test]
async fn inactive_user_cannot_authenticate() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let (status, _) = send_json(
        &app,
        "PUT",
        "/user/user-1/status",
        Some(json!({"status": "BLOCKED"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/credential",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "credential_value": "s3cret"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "USER_IDENTITY_NOT_ACTIVE");
}

#[tokio::test]
async fn otp_bound_to_operation_inherits_operation_data() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "authorize_payment").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/otp",
        Some(json!({
            "otp_name": "SMS_OTP",
            "user_id": "user-1",
            "operation_id": operation_id
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["otp_data"], "A1*A100.00EUR*Q238400856");
    let value = body["otp_value"].as_str().unwrap();
    assert_eq!(value.len(), 8);
    assert!(value.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn otp_creation_without_data_or_operation_is_rejected() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/otp",
        Some(json!({"otp_name": "SMS_OTP", "user_id": "user-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn otp_success_completes_payment_operation() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "authorize_payment").await;

    let (_, otp) = send_json(
        &app,
        "POST",
        "/otp",
        Some(json!({
            "otp_name": "SMS_OTP",
            "user_id": "user-1",
            "operation_id": operation_id
        })),
    )
    .await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/otp",
        Some(json!({
            "otp_id": otp["otp_id"],
            "otp_value": otp["otp_value"],
            "auth_method": "SMS_KEY"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "SUCCEEDED");
    assert_eq!(body["result_otp"], "SUCCEEDED");
    assert_eq!(body["operation"]["result"], "DONE");

    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/otp/{}", otp["otp_id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "USED");
}

#[tokio::test]
async fn otp_is_blocked_after_the_attempt_limit() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "authorize_payment").await;

    let (_, otp) = send_json(
        &app,
        "POST",
        "/otp",
        Some(json!({
            "otp_name": "SMS_OTP",
            "user_id": "user-1",
            "operation_id": operation_id
        })),
    )
    .await;

    let bad_request = json!({
        "otp_id": otp["otp_id"],
        "otp_value": "00000000",
        "auth_method": "SMS_KEY"
    });

    let (status, body) = send_json(&app, "POST", "/auth/otp", Some(bad_request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "FAILED");
    assert_eq!(body["remaining_attempts"], 2);

    let (_, body) = send_json(&app, "POST", "/auth/otp", Some(bad_request.clone())).await;
    assert_eq!(body["remaining_attempts"], 1);

    let (status, body) = send_json(&app, "POST", "/auth/otp", Some(bad_request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remaining_attempts"], 0);
    assert_eq!(body["operation"]["result"], "FAILED");

    let (status, body) = send_json(&app, "POST", "/auth/otp", Some(bad_request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "OTP_NOT_ACTIVE");
}

#[tokio::test]
async fn otp_authentication_requires_a_reference() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/otp",
        Some(json!({"otp_value": "12345678"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn combined_authentication_verifies_credential_then_otp() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "authorize_payment").await;

    let (_, otp) = send_json(
        &app,
        "POST",
        "/otp",
        Some(json!({
            "otp_name": "SMS_OTP",
            "user_id": "user-1",
            "operation_id": operation_id
        })),
    )
    .await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/combined",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "credential_value": "s3cret",
            "otp_value": otp["otp_value"],
            "operation_id": operation_id,
            "auth_method": "SMS_KEY"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "SUCCEEDED");
    assert_eq!(body["result_credential"], "SUCCEEDED");
    assert_eq!(body["result_otp"], "SUCCEEDED");
    assert_eq!(body["operation"]["result"], "DONE");
}

#[tokio::test]
async fn combined_authentication_records_both_outcomes_when_credential_fails() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "authorize_payment").await;

    let (_, otp) = send_json(
        &app,
        "POST",
        "/otp",
        Some(json!({
            "otp_name": "SMS_OTP",
            "user_id": "user-1",
            "operation_id": operation_id
        })),
    )
    .await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/combined",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "credential_value": "wrong",
            "otp_value": "00000000",
            "operation_id": operation_id,
            "auth_method": "SMS_KEY"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "FAILED");
    assert_eq!(body["result_credential"], "FAILED");
    assert_eq!(body["result_otp"], "FAILED");
    assert_eq!(body["remaining_attempts"], 2);
    assert_eq!(body["operation"]["result"], "CONTINUE");

    // Both sub-checks consumed an attempt on their own counters.
    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/otp/{}", otp["otp_id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACTIVE");
    assert_eq!(body["attempt_counter"], 1);
    assert_eq!(body["failed_attempt_counter"], 1);

    let (status, body) = send_json(&app, "GET", "/user/user-1/credential", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["failed_attempt_counter_soft"], 1);
}

#[tokio::test]
async fn finished_operation_rejects_authentication_without_consuming_attempts() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;
    let operation_id = create_operation(&app, "login").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/auth/credential",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "credential_value": "s3cret",
            "operation_id": operation_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/credential",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "credential_value": "wrong",
            "operation_id": operation_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "OPERATION_ALREADY_FINISHED");

    // The rejected call burned no lockout budget and left no audit record.
    let (status, body) = send_json(&app, "GET", "/user/user-1/credential", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["status"], "ACTIVE");
    assert_eq!(body[0]["attempt_counter"], 1);
    assert_eq!(body[0]["failed_attempt_counter_soft"], 0);

    let (status, body) = send_json(&app, "GET", "/user/user-1/authentication", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn credential_status_transitions_require_the_opposite_state() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let unblock = json!({
        "credential_name": "PASSWORD",
        "user_id": "user-1",
        "status": "ACTIVE"
    });
    let (status, body) = send_json(&app, "PUT", "/credential/status", Some(unblock.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CREDENTIAL_NOT_BLOCKED");

    let (status, _) = send_json(
        &app,
        "PUT",
        "/credential/status",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "status": "BLOCKED_PERMANENT"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Blocking an already blocked credential is rejected.
    let (status, body) = send_json(
        &app,
        "PUT",
        "/credential/status",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "status": "BLOCKED_TEMPORARY"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CREDENTIAL_NOT_ACTIVE");

    let (status, body) = send_json(&app, "PUT", "/credential/status", Some(unblock)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACTIVE");
}

#[tokio::test]
async fn user_status_transitions_require_the_opposite_state() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let (status, body) = send_json(
        &app,
        "PUT",
        "/user/user-1/status",
        Some(json!({"status": "ACTIVE"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "USER_IDENTITY_NOT_BLOCKED");

    let (status, _) = send_json(
        &app,
        "PUT",
        "/user/user-1/status",
        Some(json!({"status": "BLOCKED"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        "PUT",
        "/user/user-1/status",
        Some(json!({"status": "BLOCKED"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "USER_IDENTITY_NOT_ACTIVE");

    let (status, body) = send_json(
        &app,
        "PUT",
        "/user/user-1/status",
        Some(json!({"status": "ACTIVE"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACTIVE");
}

#[tokio::test]
async fn credential_value_with_whitespace_fails_validation() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/credential",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "value": "bad value"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CREDENTIAL_VALIDATION_FAILED");
}

#[tokio::test]
async fn every_dispatcher_call_leaves_an_audit_record() {
    let (app, _state) = test_app().await;
    seed_basics(&app).await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/auth/credential",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "credential_value": "wrong"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        "POST",
        "/auth/credential",
        Some(json!({
            "credential_name": "PASSWORD",
            "user_id": "user-1",
            "credential_value": "s3cret"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, "GET", "/user/user-1/authentication", None).await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|record| record["authentication_type"] == "CREDENTIAL"));
    assert!(records.iter().any(|record| record["result"] == "FAILED"));
    assert!(records.iter().any(|record| record["result"] == "SUCCEEDED"));
}
