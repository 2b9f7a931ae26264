//! Verification code and username generation.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::common::StoreError;
use crate::domains::auth::store::IdentityStore;

pub const VERIFICATION_CODE_MIN: i32 = 10_000;
pub const VERIFICATION_CODE_MAX: i32 = 99_999;
pub const VERIFICATION_CODE_TTL_MINUTES: i64 = 10;

/// Expiry for a code issued right now.
pub fn verification_code_expiry() -> DateTime<Utc> {
    Utc::now() + Duration::minutes(VERIFICATION_CODE_TTL_MINUTES)
}

/// Generate a 5-digit verification code not currently held by any
/// other pending identity.
///
/// Uniqueness is only required among outstanding codes: once an
/// identity activates (or its code expires and the row is reused) the
/// number goes back into the pool. With 90k candidates collisions are
/// rare, so draw-and-retry terminates quickly in practice.
pub async fn generate_unique_verification_code(
    identities: &dyn IdentityStore,
) -> Result<i32, StoreError> {
    loop {
        let candidate = rand::thread_rng().gen_range(VERIFICATION_CODE_MIN..=VERIFICATION_CODE_MAX);
        if identities.find_pending_by_code(candidate).await?.is_none() {
            return Ok(candidate);
        }
    }
}

/// Derive a unique username from a first name: the lowercased name,
/// with a random 4-digit suffix appended while taken.
pub async fn create_unique_username(
    identities: &dyn IdentityStore,
    first_name: &str,
) -> Result<String, StoreError> {
    let base = first_name.to_lowercase();
    let mut username = base.clone();

    loop {
        if identities.find_by_username(&username).await?.is_none() {
            return Ok(username);
        }
        let suffix = rand::thread_rng().gen_range(1000..=9999);
        username = format!("{}-{}", base, suffix);
    }
}
