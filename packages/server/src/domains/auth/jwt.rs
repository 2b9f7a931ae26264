use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by both token kinds: the identity id, the standard
/// timestamps, and a per-issuance nonce.
///
/// Timestamps are second-resolution, so without `jti` two tokens
/// minted for the same identity within one second would be
/// byte-identical - and the refresh token doubles as the unique
/// session key.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub id: Uuid,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Verification failures, split so the guard can distinguish "ask for
/// renewal" from "full re-login".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenVerifyError {
    Expired,
    Invalid,
}

pub const ACCESS_TOKEN_TTL_SECONDS: i64 = 86_400;
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

/// Signs and verifies the access/refresh token pair.
///
/// The two kinds use separate signing secrets, so an access token can
/// never be replayed as a refresh token or vice versa.
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenService {
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }

    /// Sign a short-lived (24 hour) access token.
    pub fn sign_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: user_id,
            jti: Uuid::new_v4(),
            iat: now,
            exp: now + ACCESS_TOKEN_TTL_SECONDS,
        };
        encode(&Header::default(), &claims, &self.access_encoding).map_err(Into::into)
    }

    /// Sign a long-lived (60 day) refresh token.
    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + Duration::days(REFRESH_TOKEN_TTL_DAYS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.refresh_encoding).map_err(Into::into)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenVerifyError> {
        verify(token, &self.access_decoding)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenVerifyError> {
        verify(token, &self.refresh_decoding)
    }
}

fn verify(token: &str, key: &DecodingKey) -> Result<Claims, TokenVerifyError> {
    decode::<Claims>(token, key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenVerifyError::Expired,
            _ => TokenVerifyError::Invalid,
        })
}
