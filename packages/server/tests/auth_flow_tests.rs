//! End-to-end signup, verification and login over the real router.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use common::{
    body_json, send, set_cookie_value, test_app, RequestSpec, TestApp,
};

const EMAIL_COOKIE: &str = "_almond_email_";
const COUNTRY_CODE_COOKIE: &str = "_almond_country_code_";
const PHONE_NUMBER_COOKIE: &str = "_almond_phone_number_";
const REFRESH_COOKIE: &str = "_almond_key_";

async fn signup_email(app: &TestApp, email: &str) -> (Uuid, i32) {
    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/signup/email").json(json!({
            "email": email,
            "first_name": "Anvar",
            "password": "password1",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let user = app
        .deps
        .identities
        .find_by_email(email)
        .await
        .unwrap()
        .expect("signup should create the user");
    let code = app
        .notifier
        .last_message()
        .expect("signup should send a message")
        .verification_code()
        .expect("message should end with the code");
    (user.id, code)
}

async fn verify_email(app: &TestApp, email: &str, code: i32) -> axum::response::Response {
    send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/verify")
            .cookie(EMAIL_COOKIE, email)
            .json(json!({ "verification_code": code.to_string() })),
    )
    .await
}

#[tokio::test]
async fn email_signup_creates_pending_user_and_sets_binding_cookie() {
    let app = test_app();

    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/signup/email")
            .cookie("user_locale", "en")
            .json(json!({
                "email": "anvar@example.com",
                "first_name": "Anvar",
                "password": "password1",
            })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        set_cookie_value(&response, EMAIL_COOKIE).as_deref(),
        Some("anvar@example.com")
    );

    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["message"],
        "Verification code has been sent to your email."
    );

    let user = app
        .deps
        .identities
        .find_by_email("anvar@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.account_status, "pending");
    assert!(user.verification_code.is_some());
    assert!((10_000..=99_999).contains(&user.verification_code.unwrap()));
}

#[tokio::test]
async fn verify_activates_and_logs_in() {
    let app = test_app();
    let (user_id, code) = signup_email(&app, "anvar@example.com").await;

    let response = verify_email(&app, "anvar@example.com", code).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie_value(&response, REFRESH_COOKIE).is_some());

    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert!(body["access_token"].is_string());
    assert_eq!(body["data"]["email"], "anvar@example.com");
    // The hash must never serialize.
    assert!(body["data"].get("password").is_none());

    let user = app.auth.user_by_id(user_id).unwrap();
    assert_eq!(user.account_status, "active");
    assert!(user.verification_code.is_none());
    assert_eq!(app.auth.session_count(), 1);
}

#[tokio::test]
async fn verification_code_is_one_shot() {
    let app = test_app();
    let (_, code) = signup_email(&app, "anvar@example.com").await;

    let first = verify_email(&app, "anvar@example.com", code).await;
    assert_eq!(first.status(), StatusCode::OK);

    // The code was cleared on activation; replaying it no longer
    // resolves to any pending user.
    let second = verify_email(&app, "anvar@example.com", code).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let app = test_app();
    let (user_id, code) = signup_email(&app, "anvar@example.com").await;

    app.auth
        .set_verification_expiry(user_id, Utc::now() - Duration::seconds(1));

    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/verify")
            .cookie("user_locale", "en")
            .cookie(EMAIL_COOKIE, "anvar@example.com")
            .json(json!({ "verification_code": code.to_string() })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(
        body["error"]["message"],
        "The verification code has expired. Please get a new code."
    );
}

#[tokio::test]
async fn outstanding_codes_are_pairwise_distinct() {
    let app = test_app();

    let mut codes = Vec::new();
    for i in 0..25 {
        let (_, code) = signup_email(&app, &format!("user{}@example.com", i)).await;
        codes.push(code);
    }

    let mut deduped = codes.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(deduped.len(), codes.len());
}

#[tokio::test]
async fn code_is_valid_until_the_last_second() {
    let app = test_app();
    let (user_id, code) = signup_email(&app, "anvar@example.com").await;

    // Still (barely) inside the window.
    app.auth
        .set_verification_expiry(user_id, Utc::now() + Duration::seconds(1));

    let response = verify_email(&app, "anvar@example.com", code).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn repeat_signup_rotates_the_code() {
    let app = test_app();
    let (user_id, first_code) = signup_email(&app, "anvar@example.com").await;
    let (same_id, second_code) = signup_email(&app, "anvar@example.com").await;

    assert_eq!(user_id, same_id);
    assert_eq!(app.notifier.sent.lock().unwrap().len(), 2);

    // The stored code must be the last one sent; the first is dead
    // even within its TTL.
    let user = app.auth.user_by_id(user_id).unwrap();
    assert_eq!(user.verification_code, Some(second_code));
    assert_eq!(user.account_status, "pending");
    if first_code != second_code {
        let response = verify_email(&app, "anvar@example.com", first_code).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn signup_conflicts_with_active_account() {
    let app = test_app();
    let (_, code) = signup_email(&app, "anvar@example.com").await;
    verify_email(&app, "anvar@example.com", code).await;

    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/signup/email")
            .cookie("user_locale", "en")
            .json(json!({
                "email": "anvar@example.com",
                "first_name": "Anvar",
                "password": "password1",
            })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "failure");
    assert_eq!(
        body["error"]["message"],
        "This user already exists. Try a new email."
    );
}

#[tokio::test]
async fn validation_errors_are_collected_per_field() {
    let app = test_app();

    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/signup/email")
            .cookie("user_locale", "en")
            .json(json!({ "email": "", "first_name": "A", "password": "short" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "failure");
    assert_eq!(body["error"]["email"], "Enter your email.");
    assert_eq!(body["error"]["first_name"], "Please enter a valid name.");
    assert_eq!(
        body["error"]["password"],
        "Password must contain at least 8 characters."
    );
}

#[tokio::test]
async fn tampered_binding_cookie_is_rejected() {
    let app = test_app();
    let (_, code) = signup_email(&app, "anvar@example.com").await;

    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/verify")
            .cookie("user_locale", "en")
            .cookie(EMAIL_COOKIE, "other@example.com")
            .json(json!({ "verification_code": code.to_string() })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["error"]["message"],
        "Unauthorized changes detected. Please try to sign up again."
    );
}

#[tokio::test]
async fn non_numeric_code_is_rejected_before_lookup() {
    let app = test_app();
    signup_email(&app, "anvar@example.com").await;

    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/verify")
            .cookie("user_locale", "en")
            .cookie(EMAIL_COOKIE, "anvar@example.com")
            .json(json!({ "verification_code": "12a45" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["error"]["message"],
        "The verification code should consists of only numbers."
    );
}

#[tokio::test]
async fn phone_signup_and_verify_marks_phone_verified() {
    let app = test_app();

    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/signup/phone-number").json(json!({
            "first_name": "Anvar",
            "password": "password1",
            "country_code": "uz",
            "phone_number": "901234567",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        set_cookie_value(&response, PHONE_NUMBER_COOKIE).as_deref(),
        Some("901234567")
    );

    let code = app.notifier.last_message().unwrap().verification_code().unwrap();
    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/verify")
            .cookie(COUNTRY_CODE_COOKIE, "uz")
            .cookie(PHONE_NUMBER_COOKIE, "901234567")
            .json(json!({ "verification_code": code.to_string() })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["is_phone_number_verified"], true);
    assert_eq!(body["data"]["is_verified_user"], true);
}

#[tokio::test]
async fn failed_send_reports_a_dependency_error() {
    let app = test_app();
    app.notifier.fail_next("gateway down");

    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/signup/email")
            .cookie("user_locale", "en")
            .json(json!({
                "email": "anvar@example.com",
                "first_name": "Anvar",
                "password": "password1",
            })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["error"]["message"],
        "An error occurred while sending the verification code. Please try again later."
    );

    // The pending row survives; a retry rotates the code and resends.
    assert!(app
        .deps
        .identities
        .find_by_email("anvar@example.com")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn login_succeeds_with_email_credentials() {
    let app = test_app();
    let (_, code) = signup_email(&app, "anvar@example.com").await;
    verify_email(&app, "anvar@example.com", code).await;

    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/login")
            .json(json!({ "email": "anvar@example.com", "password": "password1" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie_value(&response, REFRESH_COOKIE).is_some());
    let body = body_json(response).await;
    assert!(body["access_token"].is_string());
    assert_eq!(app.auth.session_count(), 2);
}

#[tokio::test]
async fn login_rejects_wrong_password_and_pending_accounts() {
    let app = test_app();
    let (_, code) = signup_email(&app, "active@example.com").await;
    verify_email(&app, "active@example.com", code).await;
    signup_email(&app, "pending@example.com").await;

    let wrong_password = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/login")
            .cookie("user_locale", "en")
            .json(json!({ "email": "active@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(wrong_password).await;
    assert_eq!(body["error"]["message"], "Password or email is not correct.");

    // Pending accounts cannot log in even with the right password.
    let pending = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/login")
            .json(json!({ "email": "pending@example.com", "password": "password1" })),
    )
    .await;
    assert_eq!(pending.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_without_credentials_is_a_bad_request() {
    let app = test_app();

    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/login")
            .cookie("user_locale", "en")
            .json(json!({ "password": "password1" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Please enter required data.");
}

#[tokio::test]
async fn locale_cookie_switches_messages() {
    let app = test_app();

    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/signup/email")
            .cookie("user_locale", "ru")
            .json(json!({
                "email": "anvar@example.com",
                "first_name": "Anvar",
                "password": "password1",
            })),
    )
    .await;

    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "Код подтверждения был отправлен на вашу электронную почту."
    );
}
