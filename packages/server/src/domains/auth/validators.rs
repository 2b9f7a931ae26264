//! Request body validation for the signup endpoints.
//!
//! Errors are collected per-field rather than fail-fast so the client
//! can fix every field in one round-trip.

use crate::common::locale::signup_errors;
use crate::common::{FieldErrors, Locale};
use crate::domains::auth::actions::signup::{SignupWithEmailRequest, SignupWithPhoneRequest};

pub fn validate_name_and_password(
    first_name: &str,
    password: &str,
    locale: Locale,
) -> FieldErrors {
    let catalog = signup_errors(locale);
    let mut errors = FieldErrors::new();

    let name_len = first_name.chars().count();
    if !(2..=25).contains(&name_len) {
        errors.insert("first_name", catalog.invalid_first_name.to_string());
    }

    let password_len = password.chars().count();
    if password_len < 8 {
        errors.insert("password", catalog.short_password.to_string());
    }
    if password_len > 64 {
        errors.insert("password", catalog.long_password.to_string());
    }

    errors
}

pub fn validate_signup_with_email_body(
    body: &SignupWithEmailRequest,
    locale: Locale,
) -> FieldErrors {
    let catalog = signup_errors(locale);
    let mut errors = validate_name_and_password(&body.first_name, &body.password, locale);

    if body.email.is_empty() {
        errors.insert("email", catalog.email_empty.to_string());
    } else if !is_valid_email(&body.email) {
        errors.insert("email", catalog.invalid_email.to_string());
    }

    errors
}

pub fn validate_signup_with_phone_body(
    body: &SignupWithPhoneRequest,
    locale: Locale,
) -> FieldErrors {
    let catalog = signup_errors(locale);
    let mut errors = validate_name_and_password(&body.first_name, &body.password, locale);

    // Local numbers are 9 digits (without the 2-letter country code).
    if body.phone_number.len() != 9 || !body.phone_number.chars().all(|c| c.is_ascii_digit()) {
        errors.insert("phone_number", catalog.invalid_phone_number.to_string());
    }
    if body.country_code.len() != 2 {
        errors.insert("country_code", catalog.invalid_phone_number.to_string());
    }

    errors
}

fn is_valid_email(email: &str) -> bool {
    if !(7..=64).contains(&email.len()) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}
