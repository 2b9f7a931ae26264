use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::StoreError;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_PENDING_DELETION: &str = "pending_deletion";

/// User - an identity record, pending until verified.
///
/// The primary login credential is either `email` or the
/// `(country_code, phone_number)` pair, depending on the signup path.
/// The password hash and verification columns never reach a response
/// payload (see [`crate::domains::auth::UserData`]).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub email: Option<String>,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub account_status: String,
    pub language: String,
    pub average_rating: f64,
    pub ratings_quantity: i32,
    pub is_account_suspended: bool,
    pub is_verified_user: bool,
    pub is_phone_number_verified: bool,
    #[serde(skip_serializing)]
    pub verification_code: Option<i32>,
    #[serde(skip_serializing)]
    pub verification_code_expires_at: Option<DateTime<Utc>>,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_pending(&self) -> bool {
        self.account_status == STATUS_PENDING
    }

    pub fn is_active(&self) -> bool {
        self.account_status == STATUS_ACTIVE
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Data required to create a pending identity.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub email: Option<String>,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
    pub username: String,
    /// Already-hashed password.
    pub password: String,
    pub verification_code: i32,
    pub verification_code_expires_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl User {
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(email: &str, pool: &PgPool) -> Result<Option<Self>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_phone(
        country_code: &str,
        phone_number: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE country_code = $1 AND phone_number = $2",
        )
        .bind(country_code)
        .bind(phone_number)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(
        username: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Find the pending identity currently holding a verification code.
    ///
    /// Only pending identities count: once an identity activates its
    /// code is cleared and the number may be reused.
    pub async fn find_pending_by_code(
        code: i32,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE verification_code = $1 AND account_status = 'pending'",
        )
        .bind(code)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    pub async fn insert(new_user: NewUser, pool: &PgPool) -> Result<Self, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, email, country_code, phone_number, username,
                               password, verification_code, verification_code_expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&new_user.first_name)
        .bind(&new_user.email)
        .bind(&new_user.country_code)
        .bind(&new_user.phone_number)
        .bind(&new_user.username)
        .bind(&new_user.password)
        .bind(new_user.verification_code)
        .bind(new_user.verification_code_expires_at)
        .fetch_one(pool)
        .await
        .map_err(|e| map_unique_violation(e))?;
        Ok(user)
    }

    /// Overwrite the pending identity's code and expiry (re-signup).
    pub async fn rotate_verification_code(
        id: Uuid,
        code: i32,
        expires_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Self, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET verification_code = $2, verification_code_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(expires_at)
        .fetch_optional(pool)
        .await?;
        user.ok_or(StoreError::NotFound)
    }

    /// Activate a pending identity: clear the code and expiry, flip the
    /// status, and for the phone channel mark the number verified.
    /// Single UPDATE so no intermediate state is observable.
    pub async fn activate(id: Uuid, via_phone: bool, pool: &PgPool) -> Result<Self, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET verification_code = NULL,
                verification_code_expires_at = NULL,
                account_status = 'active',
                is_phone_number_verified = is_phone_number_verified OR $2,
                is_verified_user = is_verified_user OR $2,
                updated_at = NOW()
            WHERE id = $1 AND account_status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(via_phone)
        .fetch_optional(pool)
        .await?;
        user.ok_or(StoreError::NotFound)
    }

    pub async fn set_password_changed_at(
        id: Uuid,
        at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET password_changed_at = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(pool)
            .await?;
        Ok(())
    }
}

/// Map Postgres 23505 errors to the field whose constraint fired, so a
/// lost check-then-act race reports the same conflict as the pre-check.
fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.code().as_deref() == Some("23505") {
            let field = match db_err.constraint() {
                Some("users_email_key") => "email",
                Some("users_phone_unique") => "phone_number",
                Some("users_username_key") => "username",
                _ => "user",
            };
            return StoreError::UniqueViolation(field);
        }
    }
    StoreError::Database(err)
}
