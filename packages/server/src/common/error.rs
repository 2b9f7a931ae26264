use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Field-level validation errors, collected so the client can fix
/// every field in one round-trip.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Distinguishes token failures so clients know whether to attempt
/// renewal or a full re-login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenErrorKind {
    /// Bad signature or malformed token - full re-login required (401).
    Invalid,
    /// Refresh token past its expiry - full re-login required (403).
    Expired,
    /// Token predates a password change (401).
    PasswordChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    NotifierFailure,
    NotifierTimeout,
    Geolocation,
}

/// Application error taxonomy.
///
/// Every variant maps to the response envelope
/// `{status: "failure"|"error", error: {message} | {field: message}}`,
/// with `"failure"` for 4xx and `"error"` for 5xx.
#[derive(Debug, Error)]
pub enum AppError {
    /// Per-field validation errors (400).
    #[error("validation failed")]
    Validation(FieldErrors),

    /// Single-message client error (400).
    #[error("{0}")]
    BadRequest(String),

    /// Uniqueness violation (400).
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials (401).
    #[error("{0}")]
    Auth(String),

    /// Invalid/expired/stale token, flagged `is_token_error` in the body.
    #[error("{message}")]
    Token {
        kind: TokenErrorKind,
        message: String,
    },

    /// Access token expired: bare 403, client must use the renewal flow.
    #[error("access token expired")]
    AccessTokenExpired,

    /// Role not allowed (403).
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// External collaborator failed (500). The message is already safe
    /// for the client; details go to the log at the point of failure.
    #[error("{message}")]
    Dependency {
        kind: DependencyKind,
        message: String,
    },

    /// Unexpected error (500) - never leaks details outside debug builds.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Token { kind, .. } => match kind {
                TokenErrorKind::Expired => StatusCode::FORBIDDEN,
                TokenErrorKind::Invalid | TokenErrorKind::PasswordChanged => {
                    StatusCode::UNAUTHORIZED
                }
            },
            AppError::AccessTokenExpired | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Dependency { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 403 with no body: the client's cue to hit the renewal endpoint.
        if matches!(self, AppError::AccessTokenExpired) {
            return status.into_response();
        }

        let status_label = if status.is_client_error() {
            "failure"
        } else {
            "error"
        };

        let error = match &self {
            AppError::Validation(fields) => json!(fields),
            AppError::BadRequest(message)
            | AppError::Conflict(message)
            | AppError::Auth(message)
            | AppError::Forbidden(message)
            | AppError::NotFound(message) => json!({ "message": message }),
            AppError::Token { message, .. } => {
                json!({ "is_token_error": true, "message": message })
            }
            AppError::Dependency { kind, message } => {
                tracing::error!(?kind, "dependency failure: {}", message);
                json!({ "message": message })
            }
            AppError::Internal(source) => {
                tracing::error!("unexpected error: {:#}", source);
                if cfg!(debug_assertions) {
                    json!({ "message": format!("{:#}", source) })
                } else {
                    json!({ "message": "Something went wrong." })
                }
            }
            AppError::AccessTokenExpired => unreachable!(),
        };

        (status, Json(json!({ "status": status_label, "error": error }))).into_response()
    }
}

/// Storage-layer errors shared by the Postgres and in-memory adapters.
///
/// A unique-constraint violation on write must be reported the same way
/// as a failed pre-check, so check-then-act races degrade to the
/// ordinary conflict error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0}")]
    UniqueViolation(&'static str),

    #[error("record not found")]
    NotFound,

    /// Optimistic check failed: the row changed under us.
    #[error("concurrent modification")]
    Conflict,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Map a sqlx error to `UniqueViolation(field)` when it is a
    /// Postgres 23505, otherwise pass it through.
    pub fn from_sqlx(err: sqlx::Error, unique_field: &'static str) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.code().as_deref() == Some("23505") {
                return StoreError::UniqueViolation(unique_field);
            }
        }
        StoreError::Database(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(field) => {
                AppError::Conflict(format!("Duplicate value for {}.", field))
            }
            StoreError::NotFound => AppError::NotFound("Record not found.".to_string()),
            StoreError::Conflict => AppError::Conflict(
                "The record was modified concurrently. Please retry.".to_string(),
            ),
            StoreError::Database(e) => AppError::Internal(e.into()),
        }
    }
}
