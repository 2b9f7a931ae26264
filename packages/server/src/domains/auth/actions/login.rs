//! Login and logout.

use serde::Deserialize;

use crate::common::locale::login_errors;
use crate::common::{AppError, Locale};
use crate::domains::auth::models::User;
use crate::kernel::deps::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub password: String,
}

/// Authenticate by email or phone pair plus password.
///
/// Lookup misses, inactive accounts and bad passwords all collapse to
/// the same credentials error so the response does not reveal which
/// part was wrong.
pub async fn login(
    body: LoginRequest,
    locale: Locale,
    deps: &ServerDeps,
) -> Result<User, AppError> {
    let catalog = login_errors(locale);

    if body.password.is_empty() {
        return Err(AppError::BadRequest(catalog.missing_credentials.to_string()));
    }

    let (user, incorrect_message) = match (&body.email, &body.country_code, &body.phone_number) {
        (Some(email), _, _) if !email.is_empty() => (
            deps.identities.find_by_email(email).await?,
            catalog.incorrect_credentials_email,
        ),
        (_, Some(country_code), Some(phone_number))
            if !country_code.is_empty() && !phone_number.is_empty() =>
        {
            (
                deps.identities
                    .find_by_phone(country_code, phone_number)
                    .await?,
                catalog.incorrect_credentials_phone_number,
            )
        }
        _ => {
            return Err(AppError::BadRequest(catalog.missing_credentials.to_string()));
        }
    };

    let user = match user {
        Some(user) if user.is_active() => user,
        _ => return Err(AppError::Auth(incorrect_message.to_string())),
    };

    if !deps.passwords.verify(&body.password, &user.password)? {
        return Err(AppError::Auth(incorrect_message.to_string()));
    }

    Ok(user)
}

/// Remove the session matching a refresh token. Deleting a token that
/// has no session is not an error.
pub async fn logout(refresh_token: &str, deps: &ServerDeps) -> Result<(), AppError> {
    deps.sessions.delete_by_refresh_token(refresh_token).await?;
    Ok(())
}
