//! Route guard and role restriction, exercised through /logout and the
//! admin category endpoints.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

use almond_core::domains::auth::jwt::Claims;
use almond_core::domains::auth::models::NewSession;

use common::{
    body_bytes, body_json, clears_cookie, send, set_cookie_value, test_app, RequestSpec, TestApp,
    ACCESS_SECRET, REFRESH_SECRET,
};

const EMAIL_COOKIE: &str = "_almond_email_";
const REFRESH_COOKIE: &str = "_almond_key_";

/// Signup, verify and return (user_id, access_token, refresh_token).
async fn logged_in_user(app: &TestApp, email: &str) -> (Uuid, String, String) {
    send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/signup/email").json(json!({
            "email": email,
            "first_name": "Anvar",
            "password": "password1",
        })),
    )
    .await;
    let code = app.notifier.last_message().unwrap().verification_code().unwrap();

    let response = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/users/verify")
            .cookie(EMAIL_COOKIE, email)
            .json(json!({ "verification_code": code.to_string() })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let refresh_token = set_cookie_value(&response, REFRESH_COOKIE).unwrap();
    let body = body_json(response).await;
    let access_token = body["access_token"].as_str().unwrap().to_string();
    let user_id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();
    (user_id, access_token, refresh_token)
}

fn stale_token(user_id: Uuid, secret: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        id: user_id,
        jti: Uuid::new_v4(),
        iat: now - 7200,
        exp: now - 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn missing_access_token_is_unauthorized() {
    let app = test_app();

    let response = send(&app.app, RequestSpec::new("GET", "/api/v1/users/logout")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["is_token_error"], true);
    assert_eq!(body["error"]["message"], "Invalid token. New log in required.");
}

#[tokio::test]
async fn garbage_access_token_is_unauthorized() {
    let app = test_app();

    let response = send(
        &app.app,
        RequestSpec::new("GET", "/api/v1/users/logout").bearer("not.a.token"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_access_token_is_a_bare_403() {
    let app = test_app();
    let (user_id, _, refresh_token) = logged_in_user(&app, "anvar@example.com").await;

    let response = send(
        &app.app,
        RequestSpec::new("GET", "/api/v1/users/logout")
            .bearer(stale_token(user_id, ACCESS_SECRET))
            .cookie(REFRESH_COOKIE, refresh_token),
    )
    .await;

    // No body and no cookie changes: the client renews and retries.
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(!clears_cookie(&response, REFRESH_COOKIE));
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(app.auth.session_count(), 1);
}

#[tokio::test]
async fn missing_refresh_cookie_is_unauthorized() {
    let app = test_app();
    let (_, access_token, _) = logged_in_user(&app, "anvar@example.com").await;

    let response = send(
        &app.app,
        RequestSpec::new("GET", "/api/v1/users/logout").bearer(access_token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_refresh_token_ends_the_session() {
    let app = test_app();
    let (user_id, access_token, _) = logged_in_user(&app, "anvar@example.com").await;

    // A session backed by an already-expired refresh token.
    let expired_refresh = stale_token(user_id, REFRESH_SECRET);
    app.deps
        .sessions
        .insert(NewSession {
            user_id,
            refresh_token: expired_refresh.clone(),
            ip_address: "127.0.0.1".to_string(),
            address: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(app.auth.session_count(), 2);

    let response = send(
        &app.app,
        RequestSpec::new("GET", "/api/v1/users/logout")
            .bearer(access_token)
            .cookie(REFRESH_COOKIE, expired_refresh),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(clears_cookie(&response, REFRESH_COOKIE));
    let body = body_json(response).await;
    assert_eq!(body["error"]["is_token_error"], true);
    assert_eq!(body["error"]["message"], "Expired token. New log in required.");
    // The dead session is gone server-side too.
    assert_eq!(app.auth.session_count(), 1);
}

#[tokio::test]
async fn valid_refresh_token_without_a_session_is_unauthorized() {
    let app = test_app();
    let (_, access_token, refresh_token) = logged_in_user(&app, "anvar@example.com").await;

    app.deps
        .sessions
        .delete_by_refresh_token(&refresh_token)
        .await
        .unwrap();

    let response = send(
        &app.app,
        RequestSpec::new("GET", "/api/v1/users/logout")
            .bearer(access_token)
            .cookie(REFRESH_COOKIE, refresh_token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(clears_cookie(&response, REFRESH_COOKIE));
}

#[tokio::test]
async fn tokens_minted_before_a_password_change_are_rejected() {
    let app = test_app();
    let (user_id, access_token, refresh_token) = logged_in_user(&app, "anvar@example.com").await;

    app.deps
        .identities
        .set_password_changed_at(user_id, Utc::now() + Duration::seconds(10))
        .await
        .unwrap();

    let response = send(
        &app.app,
        RequestSpec::new("GET", "/api/v1/users/logout")
            .bearer(access_token)
            .cookie(REFRESH_COOKIE, refresh_token)
            .cookie("user_locale", "en"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["is_token_error"], true);
    assert_eq!(
        body["error"]["message"],
        "VerifiedUser has changed their password recently. Please log in again."
    );
}

#[tokio::test]
async fn a_foreign_refresh_cookie_does_not_authenticate() {
    let app = test_app();
    let (victim_id, victim_access, _) = logged_in_user(&app, "anvar@example.com").await;

    // The victim changes their password, staling their tokens.
    app.deps
        .identities
        .set_password_changed_at(victim_id, Utc::now() + Duration::seconds(10))
        .await
        .unwrap();

    // A second account logs in afterwards, so its refresh token is
    // fresher than the victim's password change. Pairing the victim's
    // bearer with that cookie must not revive the stale access token.
    let (_, _, other_refresh) = logged_in_user(&app, "other@example.com").await;

    let response = send(
        &app.app,
        RequestSpec::new("GET", "/api/v1/users/logout")
            .bearer(victim_access)
            .cookie(REFRESH_COOKIE, other_refresh),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["is_token_error"], true);
    assert_eq!(body["error"]["message"], "Invalid token. New log in required.");
    // Neither account's session was touched.
    assert_eq!(app.auth.session_count(), 2);
}

#[tokio::test]
async fn logout_removes_the_session_and_the_cookie() {
    let app = test_app();
    let (_, access_token, refresh_token) = logged_in_user(&app, "anvar@example.com").await;
    assert_eq!(app.auth.session_count(), 1);

    let response = send(
        &app.app,
        RequestSpec::new("GET", "/api/v1/users/logout")
            .bearer(access_token)
            .cookie(REFRESH_COOKIE, refresh_token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(clears_cookie(&response, REFRESH_COOKIE));
    assert_eq!(app.auth.session_count(), 0);
}

#[tokio::test]
async fn category_writes_require_the_admin_role() {
    let app = test_app();
    let (user_id, access_token, refresh_token) = logged_in_user(&app, "anvar@example.com").await;

    let body = json!({
        "translations": [{ "lang": "en", "name": "Electronics" }],
    });

    let as_user = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/categories")
            .bearer(access_token.clone())
            .cookie(REFRESH_COOKIE, refresh_token.clone())
            .cookie("user_locale", "en")
            .json(body.clone()),
    )
    .await;
    assert_eq!(as_user.status(), StatusCode::FORBIDDEN);
    let response_body = body_json(as_user).await;
    assert_eq!(
        response_body["error"]["message"],
        "You do not have permission to do this action."
    );

    app.auth.set_role(user_id, "admin");

    let as_admin = send(
        &app.app,
        RequestSpec::new("POST", "/api/v1/categories")
            .bearer(access_token)
            .cookie(REFRESH_COOKIE, refresh_token)
            .json(body),
    )
    .await;
    assert_eq!(as_admin.status(), StatusCode::CREATED);
    let response_body = body_json(as_admin).await;
    assert_eq!(response_body["data"]["category"]["slug"], "electronics");
}

#[tokio::test]
async fn public_category_reads_need_no_token() {
    let app = test_app();

    let response = send(&app.app, RequestSpec::new("GET", "/api/v1/categories")).await;
    assert_eq!(response.status(), StatusCode::OK);
}
