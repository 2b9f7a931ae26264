//! Token issuance: sign the access/refresh pair and record the session.

use crate::common::AppError;
use crate::domains::auth::models::{NewSession, User};
use crate::kernel::deps::ServerDeps;

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign both tokens and record a session row keyed by the refresh
/// token. Geolocation is best-effort: a lookup failure logs a warning
/// and the session is stored with an empty address.
pub async fn issue_tokens(
    user: &User,
    ip_address: &str,
    deps: &ServerDeps,
) -> Result<TokenPair, AppError> {
    let access_token = deps.tokens.sign_access(user.id)?;
    let refresh_token = deps.tokens.sign_refresh(user.id)?;

    let address = match deps.geolocator.locate(ip_address).await {
        Ok(address) => address,
        Err(e) => {
            tracing::warn!(ip = %ip_address, "geolocation failed: {:#}", e);
            String::new()
        }
    };

    deps.sessions
        .insert(NewSession {
            user_id: user.id,
            refresh_token: refresh_token.clone(),
            ip_address: ip_address.to_string(),
            address,
        })
        .await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}
