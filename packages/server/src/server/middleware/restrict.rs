//! Role restriction, applied inside the route guard.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

use crate::common::locale::restrict_to_errors;
use crate::common::AppError;
use crate::server::cookies::locale_from_jar;
use crate::server::middleware::guard::CurrentUser;

/// Rejects non-admin users with a localized 403. Must run after
/// `protect_routes`, which inserts the `CurrentUser` extension.
pub async fn require_admin(jar: CookieJar, request: Request, next: Next) -> Response {
    let locale = locale_from_jar(&jar);

    match request.extensions().get::<CurrentUser>() {
        Some(CurrentUser(user)) if user.is_admin() => next.run(request).await,
        Some(_) => {
            AppError::Forbidden(restrict_to_errors(locale).not_allowed.to_string())
                .into_response()
        }
        // Guard missing: misconfigured router, not a user error.
        None => AppError::Internal(anyhow::anyhow!(
            "require_admin ran without an authenticated user"
        ))
        .into_response(),
    }
}
