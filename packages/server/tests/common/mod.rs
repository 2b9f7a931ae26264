//! Shared test harness: a real router wired to in-memory adapters.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use axum_extra::extract::cookie::Cookie;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use almond_core::domains::auth::jwt::TokenService;
use almond_core::kernel::deps::ServerDeps;
use almond_core::kernel::test_dependencies::{
    MemoryAuthStore, MemoryCategoryStore, NullGeoLocator, PlainPasswordVerifier, RecordingNotifier,
};
use almond_core::server::{build_app, AxumAppState};

pub const ACCESS_SECRET: &str = "test_access_secret";
pub const REFRESH_SECRET: &str = "test_refresh_secret";

pub struct TestApp {
    pub app: Router,
    pub auth: Arc<MemoryAuthStore>,
    pub categories: Arc<MemoryCategoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub deps: Arc<ServerDeps>,
}

pub fn test_app() -> TestApp {
    let auth = Arc::new(MemoryAuthStore::new());
    let categories = Arc::new(MemoryCategoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let deps = Arc::new(ServerDeps {
        identities: auth.clone(),
        sessions: auth.clone(),
        categories: categories.clone(),
        notifier: notifier.clone(),
        geolocator: Arc::new(NullGeoLocator),
        passwords: Arc::new(PlainPasswordVerifier),
        tokens: Arc::new(TokenService::new(ACCESS_SECRET, REFRESH_SECRET)),
        notifier_timeout: Duration::from_secs(2),
        jwt_cookie_expires_in: 60,
    });

    let app = build_app(AxumAppState {
        deps: deps.clone(),
        db_pool: None,
    });

    TestApp {
        app,
        auth,
        categories,
        notifier,
        deps,
    }
}

pub struct RequestSpec<'a> {
    pub method: &'a str,
    pub uri: &'a str,
    pub body: Option<Value>,
    pub cookies: Vec<(&'a str, String)>,
    pub bearer: Option<String>,
}

impl<'a> RequestSpec<'a> {
    pub fn new(method: &'a str, uri: &'a str) -> Self {
        Self {
            method,
            uri,
            body: None,
            cookies: Vec::new(),
            bearer: None,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn cookie(mut self, name: &'a str, value: impl Into<String>) -> Self {
        self.cookies.push((name, value.into()));
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

pub async fn send(app: &Router, spec: RequestSpec<'_>) -> Response<Body> {
    let mut builder = Request::builder().method(spec.method).uri(spec.uri);

    if !spec.cookies.is_empty() {
        let header_value = spec
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        builder = builder.header(header::COOKIE, header_value);
    }
    if let Some(token) = &spec.bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match spec.body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// The percent-decoded value of a set-cookie header for `name`, if the
/// response sets it to a non-empty value. Outgoing cookies are written
/// percent-encoded, so `@` arrives as `%40`.
pub fn set_cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| Cookie::parse_encoded(raw).ok())
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// True when the response sets `name` to an empty, immediately-expiring
/// value.
pub fn clears_cookie(response: &Response<Body>, name: &str) -> bool {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|raw| {
            raw.starts_with(&format!("{}=;", name)) || raw.starts_with(&format!("{}=; ", name))
        })
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
