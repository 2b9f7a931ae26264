//! Cookie names and builders.
//!
//! Two families: the long-lived refresh cookie set at login/verify,
//! and the short-lived binding cookies set at signup that tie the
//! verification step to the credential the code was sent to.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::common::Locale;
use crate::domains::auth::verification::VERIFICATION_CODE_TTL_MINUTES;

pub const REFRESH_COOKIE: &str = "_almond_key_";
pub const EMAIL_COOKIE: &str = "_almond_email_";
pub const COUNTRY_CODE_COOKIE: &str = "_almond_country_code_";
pub const PHONE_NUMBER_COOKIE: &str = "_almond_phone_number_";
pub const LOCALE_COOKIE: &str = "user_locale";

pub fn locale_from_jar(jar: &CookieJar) -> Locale {
    Locale::from_cookie(jar.get(LOCALE_COOKIE).map(|c| c.value()))
}

/// Binding cookie: lives exactly as long as the verification code.
pub fn binding_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(VERIFICATION_CODE_TTL_MINUTES))
        .build()
}

pub fn refresh_cookie(refresh_token: String, expires_in_days: i64) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, refresh_token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(expires_in_days))
        .build()
}

/// An expired replacement; adding it to the jar removes the original.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

/// Drop all three binding cookies.
pub fn clear_binding_cookies(jar: CookieJar) -> CookieJar {
    jar.add(removal_cookie(EMAIL_COOKIE))
        .add(removal_cookie(COUNTRY_CODE_COOKIE))
        .add(removal_cookie(PHONE_NUMBER_COOKIE))
}
