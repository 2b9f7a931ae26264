//! Auth endpoints: signup, verify, login, logout.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::common::AppError;
use crate::domains::auth::actions::{
    issue_tokens, login, logout, signup_with_email, signup_with_phone, verify, LoginRequest,
    SignupBinding, SignupReceipt, SignupWithEmailRequest, SignupWithPhoneRequest, VerifyBindings,
    VerifyRequest,
};
use crate::domains::auth::models::User;
use crate::domains::auth::UserData;
use crate::server::app::AxumAppState;
use crate::server::cookies::{
    binding_cookie, clear_binding_cookies, locale_from_jar, refresh_cookie, removal_cookie,
    COUNTRY_CODE_COOKIE, EMAIL_COOKIE, PHONE_NUMBER_COOKIE, REFRESH_COOKIE,
};

// Dev fallback so local requests without a proxy header still resolve
// to some address.
const DEFAULT_CLIENT_IP: &str = "124.5.74.47";

fn client_ip(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CLIENT_IP.to_string())
}

fn signup_response(jar: CookieJar, receipt: SignupReceipt) -> Response {
    let jar = match receipt.binding {
        SignupBinding::Email(email) => jar.add(binding_cookie(EMAIL_COOKIE, email)),
        SignupBinding::Phone {
            country_code,
            phone_number,
        } => jar
            .add(binding_cookie(COUNTRY_CODE_COOKIE, country_code))
            .add(binding_cookie(PHONE_NUMBER_COOKIE, phone_number)),
    };

    (
        StatusCode::CREATED,
        jar,
        Json(json!({ "status": "success", "message": receipt.message })),
    )
        .into_response()
}

pub async fn signup_with_email_handler(
    State(state): State<AxumAppState>,
    jar: CookieJar,
    Json(body): Json<SignupWithEmailRequest>,
) -> Result<Response, AppError> {
    let locale = locale_from_jar(&jar);
    let receipt = signup_with_email(body, locale, &state.deps).await?;
    Ok(signup_response(jar, receipt))
}

pub async fn signup_with_phone_handler(
    State(state): State<AxumAppState>,
    jar: CookieJar,
    Json(body): Json<SignupWithPhoneRequest>,
) -> Result<Response, AppError> {
    let locale = locale_from_jar(&jar);
    let receipt = signup_with_phone(body, locale, &state.deps).await?;
    Ok(signup_response(jar, receipt))
}

/// Logged-in response shared by verify and login: set the refresh
/// cookie, drop any leftover binding cookies, return the access token
/// with the user payload.
async fn logged_in_response(
    state: &AxumAppState,
    jar: CookieJar,
    user: User,
    ip_address: &str,
) -> Result<Response, AppError> {
    let pair = issue_tokens(&user, ip_address, &state.deps).await?;

    let jar = clear_binding_cookies(jar).add(refresh_cookie(
        pair.refresh_token,
        state.deps.jwt_cookie_expires_in,
    ));

    Ok((
        StatusCode::OK,
        jar,
        Json(json!({
            "status": "success",
            "access_token": pair.access_token,
            "data": UserData::from(user),
        })),
    )
        .into_response())
}

pub async fn verify_handler(
    State(state): State<AxumAppState>,
    jar: CookieJar,
    request: Request,
) -> Result<Response, AppError> {
    let ip = client_ip(&request);
    let locale = locale_from_jar(&jar);
    let body: VerifyRequest = parse_json_body(request).await?;

    let bindings = VerifyBindings {
        email: jar.get(EMAIL_COOKIE).map(|c| c.value().to_string()),
        country_code: jar.get(COUNTRY_CODE_COOKIE).map(|c| c.value().to_string()),
        phone_number: jar.get(PHONE_NUMBER_COOKIE).map(|c| c.value().to_string()),
    };

    let user = verify(body, bindings, locale, &state.deps).await?;
    logged_in_response(&state, jar, user, &ip).await
}

pub async fn login_handler(
    State(state): State<AxumAppState>,
    jar: CookieJar,
    request: Request,
) -> Result<Response, AppError> {
    let ip = client_ip(&request);
    let locale = locale_from_jar(&jar);
    let body: LoginRequest = parse_json_body(request).await?;

    let user = login(body, locale, &state.deps).await?;
    logged_in_response(&state, jar, user, &ip).await
}

pub async fn logout_handler(
    State(state): State<AxumAppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if let Some(refresh_token) = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()) {
        logout(&refresh_token, &state.deps).await?;
    }
    let jar = jar.add(removal_cookie(REFRESH_COOKIE));
    Ok((StatusCode::OK, jar, Json(json!({ "status": "success" }))).into_response())
}

/// Extract a JSON body from a raw request. Handlers that also need
/// the headers take `Request` whole and parse here.
async fn parse_json_body<T: serde::de::DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let body = axum::body::to_bytes(request.into_body(), 1024 * 1024)
        .await
        .map_err(|e| AppError::BadRequest(format!("unreadable body: {}", e)))?;
    serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(format!("invalid JSON: {}", e)))
}
