use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::StoreError;

/// Session - one row per successful login.
///
/// The refresh token string is stored verbatim and is the only lookup
/// key the client ever presents; no separate session id is exchanged.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token: String,
    pub logged_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub ip_address: String,
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: Uuid,
    pub refresh_token: String,
    pub ip_address: String,
    /// Derived geo string ("City Region Country"), may be empty.
    pub address: String,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Session {
    pub async fn insert(new_session: NewSession, pool: &PgPool) -> Result<Self, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, refresh_token, ip_address, address)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(new_session.user_id)
        .bind(&new_session.refresh_token)
        .bind(&new_session.ip_address)
        .bind(&new_session.address)
        .fetch_one(pool)
        .await?;
        Ok(session)
    }

    pub async fn find_by_refresh_token(
        refresh_token: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let session =
            sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE refresh_token = $1")
                .bind(refresh_token)
                .fetch_optional(pool)
                .await?;
        Ok(session)
    }

    /// Delete the session matching a refresh token. Returns the number
    /// of rows removed (0 or 1 - the token column is unique).
    pub async fn delete_by_refresh_token(
        refresh_token: &str,
        pool: &PgPool,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE refresh_token = $1")
            .bind(refresh_token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
