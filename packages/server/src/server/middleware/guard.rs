//! Route guard: validates the access token, falls back to the refresh
//! session, and attaches the authenticated user to the request.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

use crate::common::locale::{
    protect_routes_errors, EXPIRED_TOKEN_MESSAGE, INVALID_TOKEN_MESSAGE,
};
use crate::common::{AppError, TokenErrorKind};
use crate::domains::auth::jwt::TokenVerifyError;
use crate::domains::auth::models::User;
use crate::server::app::AxumAppState;
use crate::server::cookies::{locale_from_jar, removal_cookie, REFRESH_COOKIE};

/// Request extension carrying the authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn invalid_token() -> AppError {
    AppError::Token {
        kind: TokenErrorKind::Invalid,
        message: INVALID_TOKEN_MESSAGE.to_string(),
    }
}

/// 401 plus an expired refresh cookie, forcing the client to drop it.
fn reject_and_clear(jar: CookieJar, error: AppError) -> Response {
    (jar.add(removal_cookie(REFRESH_COOKIE)), error).into_response()
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

pub async fn protect_routes(
    State(state): State<AxumAppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let deps = &state.deps;
    let locale = locale_from_jar(&jar);

    // 1. Both credentials must be presented: the bearer access token
    //    and the refresh cookie backing the session.
    let (Some(access_token), Some(refresh_token)) = (
        bearer_token(&request).map(str::to_string),
        jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()),
    ) else {
        return reject_and_clear(jar, invalid_token());
    };

    // 2. Expired access is a bare 403: the client renews and retries.
    //    The refresh cookie is left alone.
    let claims = match deps.tokens.verify_access(&access_token) {
        Ok(claims) => claims,
        Err(TokenVerifyError::Expired) => return AppError::AccessTokenExpired.into_response(),
        Err(TokenVerifyError::Invalid) => return reject_and_clear(jar, invalid_token()),
    };

    // 3. An expired refresh token ends the session server-side too.
    let refresh_claims = match deps.tokens.verify_refresh(&refresh_token) {
        Ok(refresh_claims) => refresh_claims,
        Err(TokenVerifyError::Expired) => {
            if let Err(e) = deps.sessions.delete_by_refresh_token(&refresh_token).await {
                return AppError::from(e).into_response();
            }
            let error = AppError::Token {
                kind: TokenErrorKind::Expired,
                message: EXPIRED_TOKEN_MESSAGE.to_string(),
            };
            return reject_and_clear(jar, error);
        }
        Err(TokenVerifyError::Invalid) => return reject_and_clear(jar, invalid_token()),
    };

    // 4. The session row and the user must both still exist, and the
    //    two tokens must belong to the same identity. The session
    //    owner is authoritative: a bearer token paired with someone
    //    else's refresh cookie never authenticates.
    let session = match deps.sessions.find_by_refresh_token(&refresh_token).await {
        Ok(Some(session)) => session,
        Ok(None) => return reject_and_clear(jar, invalid_token()),
        Err(e) => return AppError::from(e).into_response(),
    };
    if session.user_id != claims.id {
        return reject_and_clear(jar, invalid_token());
    }
    let user = match deps.identities.find_by_id(session.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            // Deleted account with a live session: clean it up.
            if let Err(e) = deps
                .sessions
                .delete_by_refresh_token(&session.refresh_token)
                .await
            {
                return AppError::from(e).into_response();
            }
            return reject_and_clear(jar, invalid_token());
        }
        Err(e) => return AppError::from(e).into_response(),
    };

    // 5. Tokens minted before the last password change are stale.
    if let Some(changed_at) = user.password_changed_at {
        if changed_at.timestamp() > refresh_claims.iat {
            let error = AppError::Token {
                kind: TokenErrorKind::PasswordChanged,
                message: protect_routes_errors(locale)
                    .user_changed_password
                    .to_string(),
            };
            return error.into_response();
        }
    }

    // 6. Authenticated: hand the user to the handler chain.
    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}
