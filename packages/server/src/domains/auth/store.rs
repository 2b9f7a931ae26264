//! Storage capability interface for the auth domain.
//!
//! The same engine logic runs against either backing store: Postgres
//! in production (`PgAuthStore`) or the in-memory adapter in tests
//! (`kernel::test_dependencies::MemoryAuthStore`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::StoreError;
use crate::domains::auth::models::{NewSession, NewUser, Session, User};

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_phone(
        &self,
        country_code: &str,
        phone_number: &str,
    ) -> Result<Option<User>, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_pending_by_code(&self, code: i32) -> Result<Option<User>, StoreError>;

    /// Insert a pending identity. A unique violation on write must
    /// surface as `StoreError::UniqueViolation` with the field name.
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;

    async fn rotate_verification_code(
        &self,
        id: Uuid,
        code: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<User, StoreError>;

    /// Atomically clear the code/expiry and flip `pending` -> `active`.
    async fn activate(&self, id: Uuid, via_phone: bool) -> Result<User, StoreError>;

    async fn set_password_changed_at(&self, id: Uuid, at: DateTime<Utc>)
        -> Result<(), StoreError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, new_session: NewSession) -> Result<Session, StoreError>;
    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<Session>, StoreError>;
    async fn delete_by_refresh_token(&self, token: &str) -> Result<u64, StoreError>;
}

/// Postgres adapter for both auth stores.
#[derive(Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgAuthStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        User::find_by_id(id, &self.pool).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        User::find_by_email(email, &self.pool).await
    }

    async fn find_by_phone(
        &self,
        country_code: &str,
        phone_number: &str,
    ) -> Result<Option<User>, StoreError> {
        User::find_by_phone(country_code, phone_number, &self.pool).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        User::find_by_username(username, &self.pool).await
    }

    async fn find_pending_by_code(&self, code: i32) -> Result<Option<User>, StoreError> {
        User::find_pending_by_code(code, &self.pool).await
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        User::insert(new_user, &self.pool).await
    }

    async fn rotate_verification_code(
        &self,
        id: Uuid,
        code: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        User::rotate_verification_code(id, code, expires_at, &self.pool).await
    }

    async fn activate(&self, id: Uuid, via_phone: bool) -> Result<User, StoreError> {
        User::activate(id, via_phone, &self.pool).await
    }

    async fn set_password_changed_at(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        User::set_password_changed_at(id, at, &self.pool).await
    }
}

#[async_trait]
impl SessionStore for PgAuthStore {
    async fn insert(&self, new_session: NewSession) -> Result<Session, StoreError> {
        Session::insert(new_session, &self.pool).await
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        Session::find_by_refresh_token(token, &self.pool).await
    }

    async fn delete_by_refresh_token(&self, token: &str) -> Result<u64, StoreError> {
        Session::delete_by_refresh_token(token, &self.pool).await
    }
}
