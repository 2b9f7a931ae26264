//! Signup: create (or refresh) a pending identity and send out a
//! verification code over the chosen channel.

use serde::Deserialize;

use crate::common::locale::{signup_errors, signup_responses, verification_message};
use crate::common::{AppError, DependencyKind, Locale, StoreError};
use crate::domains::auth::models::NewUser;
use crate::domains::auth::validators::{
    validate_signup_with_email_body, validate_signup_with_phone_body,
};
use crate::domains::auth::verification::{
    create_unique_username, generate_unique_verification_code, verification_code_expiry,
};
use crate::kernel::deps::ServerDeps;
use crate::kernel::traits::NotifierError;

// Missing fields deserialize as empty strings and fail validation with
// the field-specific message instead of a serde rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupWithEmailRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupWithPhoneRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub phone_number: String,
}

/// Which credential the pending signup is bound to. The handler turns
/// this into the short-lived binding cookies the verify step checks.
#[derive(Debug, Clone)]
pub enum SignupBinding {
    Email(String),
    Phone {
        country_code: String,
        phone_number: String,
    },
}

#[derive(Debug, Clone)]
pub struct SignupReceipt {
    pub message: String,
    pub binding: SignupBinding,
}

pub async fn signup_with_email(
    body: SignupWithEmailRequest,
    locale: Locale,
    deps: &ServerDeps,
) -> Result<SignupReceipt, AppError> {
    let errors = validate_signup_with_email_body(&body, locale);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let catalog = signup_errors(locale);

    let code = match deps.identities.find_by_email(&body.email).await? {
        Some(existing) if existing.is_active() => {
            return Err(AppError::Conflict(catalog.email_already_exists.to_string()));
        }
        // Pending identity signing up again: issue a fresh code, keep
        // the row.
        Some(existing) => {
            let code = generate_unique_verification_code(deps.identities.as_ref()).await?;
            deps.identities
                .rotate_verification_code(existing.id, code, verification_code_expiry())
                .await?;
            code
        }
        None => {
            let code = generate_unique_verification_code(deps.identities.as_ref()).await?;
            let username =
                create_unique_username(deps.identities.as_ref(), &body.first_name).await?;
            let password = deps.passwords.hash(&body.password)?;
            let insert = deps.identities.insert(NewUser {
                first_name: body.first_name.clone(),
                email: Some(body.email.clone()),
                country_code: None,
                phone_number: None,
                username,
                password,
                verification_code: code,
                verification_code_expires_at: verification_code_expiry(),
            });
            match insert.await {
                Ok(_) => code,
                Err(StoreError::UniqueViolation("email")) => {
                    return Err(AppError::Conflict(catalog.email_already_exists.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        }
    };

    let message = verification_message(locale);
    let text = format!("{}{}", message.text, code);
    deps.send_email_with_timeout(&body.email, message.subject, &text)
        .await
        .map_err(|e| notifier_error(e, locale))?;

    Ok(SignupReceipt {
        message: signup_responses(locale).sent_to_email.to_string(),
        binding: SignupBinding::Email(body.email),
    })
}

pub async fn signup_with_phone(
    body: SignupWithPhoneRequest,
    locale: Locale,
    deps: &ServerDeps,
) -> Result<SignupReceipt, AppError> {
    let errors = validate_signup_with_phone_body(&body, locale);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let catalog = signup_errors(locale);

    let existing = deps
        .identities
        .find_by_phone(&body.country_code, &body.phone_number)
        .await?;

    let code = match existing {
        Some(existing) if existing.is_active() => {
            return Err(AppError::Conflict(
                catalog.phone_number_already_exists.to_string(),
            ));
        }
        Some(existing) => {
            let code = generate_unique_verification_code(deps.identities.as_ref()).await?;
            deps.identities
                .rotate_verification_code(existing.id, code, verification_code_expiry())
                .await?;
            code
        }
        None => {
            let code = generate_unique_verification_code(deps.identities.as_ref()).await?;
            let username =
                create_unique_username(deps.identities.as_ref(), &body.first_name).await?;
            let password = deps.passwords.hash(&body.password)?;
            let insert = deps.identities.insert(NewUser {
                first_name: body.first_name.clone(),
                email: None,
                country_code: Some(body.country_code.clone()),
                phone_number: Some(body.phone_number.clone()),
                username,
                password,
                verification_code: code,
                verification_code_expires_at: verification_code_expiry(),
            });
            match insert.await {
                Ok(_) => code,
                Err(StoreError::UniqueViolation("phone_number")) => {
                    return Err(AppError::Conflict(
                        catalog.phone_number_already_exists.to_string(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        }
    };

    let message = verification_message(locale);
    let text = format!("{}{}", message.text, code);
    deps.send_sms_with_timeout(&body.country_code, &body.phone_number, &text)
        .await
        .map_err(|e| notifier_error(e, locale))?;

    Ok(SignupReceipt {
        message: signup_responses(locale).sent_to_phone_number.to_string(),
        binding: SignupBinding::Phone {
            country_code: body.country_code,
            phone_number: body.phone_number,
        },
    })
}

/// The identity row is committed by this point, so a failed send is
/// reported but nothing is rolled back: retrying the signup rotates
/// the code and tries the send again.
fn notifier_error(err: NotifierError, locale: Locale) -> AppError {
    let kind = match err {
        NotifierError::Timeout => DependencyKind::NotifierTimeout,
        NotifierError::Failed(ref detail) => {
            tracing::error!("verification send failed: {}", detail);
            DependencyKind::NotifierFailure
        }
    };
    AppError::Dependency {
        kind,
        message: signup_errors(locale).sending_verification_code.to_string(),
    }
}
