//! Verification: confirm the code from the signup channel and activate
//! the pending identity.

use chrono::Utc;
use serde::Deserialize;

use crate::common::locale::verify_errors;
use crate::common::{AppError, Locale};
use crate::domains::auth::models::User;
use crate::kernel::deps::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub verification_code: String,
}

/// The binding cookies set at signup. Whichever credential the code
/// was issued against must still match the pending identity.
#[derive(Debug, Clone, Default)]
pub struct VerifyBindings {
    pub email: Option<String>,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
}

impl VerifyBindings {
    fn is_phone(&self) -> bool {
        self.country_code.is_some() && self.phone_number.is_some()
    }
}

pub async fn verify(
    body: VerifyRequest,
    bindings: VerifyBindings,
    locale: Locale,
    deps: &ServerDeps,
) -> Result<User, AppError> {
    let catalog = verify_errors(locale);

    let raw = body.verification_code.trim();
    if raw.is_empty() {
        return Err(AppError::BadRequest(catalog.code_absent.to_string()));
    }
    let code: i32 = raw
        .parse()
        .map_err(|_| AppError::BadRequest(catalog.code_not_numeric.to_string()))?;

    let user = deps.identities.find_pending_by_code(code).await?;

    // Binding check comes before the existence check: a present cookie
    // pointing at a different (or no) identity means the cookies were
    // tampered with, not that the code is merely wrong.
    if let Some(email) = bindings.email.as_deref() {
        let bound = user.as_ref().and_then(|u| u.email.as_deref());
        if bound != Some(email) {
            return Err(AppError::BadRequest(catalog.cookies_modified.to_string()));
        }
    } else if bindings.is_phone() {
        let bound_cc = user.as_ref().and_then(|u| u.country_code.as_deref());
        let bound_pn = user.as_ref().and_then(|u| u.phone_number.as_deref());
        if bound_cc != bindings.country_code.as_deref()
            || bound_pn != bindings.phone_number.as_deref()
        {
            return Err(AppError::BadRequest(catalog.cookies_modified.to_string()));
        }
    }

    let user = user.ok_or_else(|| AppError::BadRequest(catalog.code_invalid.to_string()))?;

    match user.verification_code_expires_at {
        Some(expires_at) if expires_at > Utc::now() => {}
        _ => return Err(AppError::BadRequest(catalog.code_expired.to_string())),
    }

    let activated = deps.identities.activate(user.id, bindings.is_phone()).await?;
    Ok(activated)
}
