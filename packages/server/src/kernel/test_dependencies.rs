//! In-memory adapters for tests.
//!
//! These mirror the Postgres adapters' observable behavior, including
//! unique-violation reporting, so actions and handlers run unchanged
//! against them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::common::StoreError;
use crate::domains::auth::models::user::{ROLE_USER, STATUS_ACTIVE, STATUS_PENDING};
use crate::domains::auth::models::{NewSession, NewUser, Session, User};
use crate::domains::auth::store::{IdentityStore, SessionStore};
use crate::domains::categories::models::{Category, NewCategory};
use crate::domains::categories::store::{CategoryPatch, CategoryStore};
use crate::kernel::traits::{BaseGeoLocator, BaseNotifier, BasePasswordVerifier, NotifierError};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryAuthStore {
    users: RwLock<HashMap<Uuid, User>>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct snapshot for assertions.
    pub fn user_by_id(&self, id: Uuid) -> Option<User> {
        self.users.read().unwrap().get(&id).cloned()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    /// Back-date a user's verification expiry, for expiry tests.
    pub fn set_verification_expiry(&self, id: Uuid, at: DateTime<Utc>) {
        if let Some(user) = self.users.write().unwrap().get_mut(&id) {
            user.verification_code_expires_at = Some(at);
        }
    }

    pub fn set_role(&self, id: Uuid, role: &str) {
        if let Some(user) = self.users.write().unwrap().get_mut(&id) {
            user.role = role.to_string();
        }
    }

    /// Insert a fully-formed user row, bypassing the signup flow.
    pub fn seed_user(&self, user: User) {
        self.users.write().unwrap().insert(user.id, user);
    }
}

#[async_trait]
impl IdentityStore for MemoryAuthStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_by_phone(
        &self,
        country_code: &str,
        phone_number: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| {
                u.country_code.as_deref() == Some(country_code)
                    && u.phone_number.as_deref() == Some(phone_number)
            })
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_pending_by_code(&self, code: i32) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.verification_code == Some(code) && u.account_status == STATUS_PENDING)
            .cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().unwrap();

        if let Some(email) = &new_user.email {
            if users.values().any(|u| u.email.as_ref() == Some(email)) {
                return Err(StoreError::UniqueViolation("email"));
            }
        }
        if let Some(phone_number) = &new_user.phone_number {
            if users.values().any(|u| {
                u.country_code == new_user.country_code
                    && u.phone_number.as_ref() == Some(phone_number)
            }) {
                return Err(StoreError::UniqueViolation("phone_number"));
            }
        }
        if users.values().any(|u| u.username == new_user.username) {
            return Err(StoreError::UniqueViolation("username"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: new_user.first_name,
            family_name: String::new(),
            email: new_user.email,
            country_code: new_user.country_code,
            phone_number: new_user.phone_number,
            username: new_user.username,
            password: new_user.password,
            role: ROLE_USER.to_string(),
            account_status: STATUS_PENDING.to_string(),
            language: "uz".to_string(),
            average_rating: 0.0,
            ratings_quantity: 0,
            is_account_suspended: false,
            is_verified_user: false,
            is_phone_number_verified: false,
            verification_code: Some(new_user.verification_code),
            verification_code_expires_at: Some(new_user.verification_code_expires_at),
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn rotate_verification_code(
        &self,
        id: Uuid,
        code: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.verification_code = Some(code);
        user.verification_code_expires_at = Some(expires_at);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn activate(&self, id: Uuid, via_phone: bool) -> Result<User, StoreError> {
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        if user.account_status != STATUS_PENDING {
            return Err(StoreError::NotFound);
        }
        user.verification_code = None;
        user.verification_code_expires_at = None;
        user.account_status = STATUS_ACTIVE.to_string();
        if via_phone {
            user.is_phone_number_verified = true;
            user.is_verified_user = true;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_password_changed_at(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.password_changed_at = Some(at);
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryAuthStore {
    async fn insert(&self, new_session: NewSession) -> Result<Session, StoreError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: new_session.user_id,
            refresh_token: new_session.refresh_token.clone(),
            logged_at: now,
            last_seen: now,
            ip_address: new_session.ip_address,
            address: new_session.address,
        };
        self.sessions
            .write()
            .unwrap()
            .insert(new_session.refresh_token, session.clone());
        Ok(session)
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().unwrap().get(token).cloned())
    }

    async fn delete_by_refresh_token(&self, token: &str) -> Result<u64, StoreError> {
        Ok(self.sessions.write().unwrap().remove(token).map_or(0, |_| 1))
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryCategoryStore {
    categories: RwLock<HashMap<Uuid, Category>>,
    next_legacy_id: AtomicI32,
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self {
            categories: RwLock::new(HashMap::new()),
            next_legacy_id: AtomicI32::new(1),
        }
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn insert(&self, new_category: NewCategory) -> Result<Category, StoreError> {
        let mut categories = self.categories.write().unwrap();
        if categories.values().any(|c| c.slug == new_category.slug) {
            return Err(StoreError::UniqueViolation("slug"));
        }
        if categories
            .values()
            .any(|c| c.full_slug == new_category.full_slug)
        {
            return Err(StoreError::UniqueViolation("full_slug"));
        }

        let category = Category {
            id: Uuid::new_v4(),
            legacy_id: self.next_legacy_id.fetch_add(1, Ordering::SeqCst),
            slug: new_category.slug,
            full_slug: new_category.full_slug,
            translations: Json(new_category.translations),
            parent_category_id: new_category.parent_category_id,
        };
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        Ok(self.categories.read().unwrap().get(&id).cloned())
    }

    async fn find_by_full_slug(&self, full_slug: &str) -> Result<Option<Category>, StoreError> {
        Ok(self
            .categories
            .read()
            .unwrap()
            .values()
            .find(|c| c.full_slug == full_slug)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Category>, StoreError> {
        let mut all: Vec<Category> = self.categories.read().unwrap().values().cloned().collect();
        all.sort_by_key(|c| c.legacy_id);
        Ok(all)
    }

    async fn list_roots(&self) -> Result<Vec<Category>, StoreError> {
        let mut roots: Vec<Category> = self
            .categories
            .read()
            .unwrap()
            .values()
            .filter(|c| c.parent_category_id.is_none())
            .cloned()
            .collect();
        roots.sort_by_key(|c| c.legacy_id);
        Ok(roots)
    }

    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Category>, StoreError> {
        let mut children: Vec<Category> = self
            .categories
            .read()
            .unwrap()
            .values()
            .filter(|c| c.parent_category_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by_key(|c| c.legacy_id);
        Ok(children)
    }

    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, StoreError> {
        let mut categories = self.categories.write().unwrap();

        if let Some(slug) = &patch.slug {
            if categories.values().any(|c| c.id != id && c.slug == *slug) {
                return Err(StoreError::UniqueViolation("slug"));
            }
        }
        if let Some(full_slug) = &patch.full_slug {
            if categories
                .values()
                .any(|c| c.id != id && c.full_slug == *full_slug)
            {
                return Err(StoreError::UniqueViolation("full_slug"));
            }
        }

        let category = categories.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(translations) = patch.translations {
            category.translations = Json(translations);
        }
        if let Some(slug) = patch.slug {
            category.slug = slug;
        }
        if let Some(full_slug) = patch.full_slug {
            category.full_slug = full_slug;
        }
        Ok(category.clone())
    }

    async fn update_parent(
        &self,
        id: Uuid,
        expected_full_slug: &str,
        parent_id: Option<Uuid>,
        new_full_slug: &str,
    ) -> Result<Category, StoreError> {
        let mut categories = self.categories.write().unwrap();
        if categories
            .values()
            .any(|c| c.id != id && c.full_slug == new_full_slug)
        {
            return Err(StoreError::UniqueViolation("full_slug"));
        }
        let category = categories.get_mut(&id).ok_or(StoreError::Conflict)?;
        if category.full_slug != expected_full_slug {
            return Err(StoreError::Conflict);
        }
        category.parent_category_id = parent_id;
        category.full_slug = new_full_slug.to_string();
        Ok(category.clone())
    }

    async fn update_full_slug(&self, id: Uuid, full_slug: &str) -> Result<(), StoreError> {
        let mut categories = self.categories.write().unwrap();
        let category = categories.get_mut(&id).ok_or(StoreError::NotFound)?;
        category.full_slug = full_slug.to_string();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut categories = self.categories.write().unwrap();
        if categories.remove(&id).is_none() {
            return Ok(0);
        }
        // FK cascade: drop the whole subtree.
        loop {
            let orphans: Vec<Uuid> = categories
                .values()
                .filter(|c| {
                    c.parent_category_id
                        .is_some_and(|p| !categories.contains_key(&p))
                })
                .map(|c| c.id)
                .collect();
            if orphans.is_empty() {
                break;
            }
            for orphan in orphans {
                categories.remove(&orphan);
            }
        }
        Ok(1)
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Email {
        to: String,
        subject: String,
        text: String,
    },
    Sms {
        country_code: String,
        phone_number: String,
        text: String,
    },
}

impl SentMessage {
    /// The trailing numeric verification code, if the text carries one.
    pub fn verification_code(&self) -> Option<i32> {
        let text = match self {
            SentMessage::Email { text, .. } | SentMessage::Sms { text, .. } => text,
        };
        text.rsplit(' ').next()?.parse().ok()
    }
}

/// Records every message instead of sending; can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentMessage>>,
    pub fail_with: Mutex<Option<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, detail: &str) {
        *self.fail_with.lock().unwrap() = Some(detail.to_string());
    }

    pub fn last_message(&self) -> Option<SentMessage> {
        self.sent.lock().unwrap().last().cloned()
    }

    fn record(&self, message: SentMessage) -> Result<(), NotifierError> {
        if let Some(detail) = self.fail_with.lock().unwrap().take() {
            return Err(NotifierError::Failed(detail));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

#[async_trait]
impl BaseNotifier for RecordingNotifier {
    async fn send_email(&self, to: &str, subject: &str, text: &str) -> Result<(), NotifierError> {
        self.record(SentMessage::Email {
            to: to.to_string(),
            subject: subject.to_string(),
            text: text.to_string(),
        })
    }

    async fn send_sms(
        &self,
        country_code: &str,
        phone_number: &str,
        text: &str,
    ) -> Result<(), NotifierError> {
        self.record(SentMessage::Sms {
            country_code: country_code.to_string(),
            phone_number: phone_number.to_string(),
            text: text.to_string(),
        })
    }
}

/// Always resolves to an empty address.
#[derive(Debug, Clone, Default)]
pub struct NullGeoLocator;

#[async_trait]
impl BaseGeoLocator for NullGeoLocator {
    async fn locate(&self, _ip_address: &str) -> anyhow::Result<String> {
        Ok(String::new())
    }
}

/// Reversible "hash" so tests skip the argon2 cost.
#[derive(Debug, Clone, Default)]
pub struct PlainPasswordVerifier;

impl BasePasswordVerifier for PlainPasswordVerifier {
    fn hash(&self, password: &str) -> anyhow::Result<String> {
        Ok(format!("plain:{}", password))
    }

    fn verify(&self, password: &str, hash: &str) -> anyhow::Result<bool> {
        Ok(hash == format!("plain:{}", password))
    }
}
