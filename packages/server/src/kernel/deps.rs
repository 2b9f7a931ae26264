//! Dependency container threaded through every action and handler.
//!
//! Actions receive `&ServerDeps` and talk only to the capability
//! traits, so tests swap in the in-memory adapters without touching
//! the HTTP layer.

use std::sync::Arc;
use std::time::Duration;

use crate::domains::auth::jwt::TokenService;
use crate::domains::auth::store::{IdentityStore, SessionStore};
use crate::domains::categories::store::CategoryStore;
use crate::kernel::traits::{BaseGeoLocator, BaseNotifier, BasePasswordVerifier, NotifierError};

pub struct ServerDeps {
    pub identities: Arc<dyn IdentityStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub notifier: Arc<dyn BaseNotifier>,
    pub geolocator: Arc<dyn BaseGeoLocator>,
    pub passwords: Arc<dyn BasePasswordVerifier>,
    pub tokens: Arc<TokenService>,
    /// Deadline for a single notifier call.
    pub notifier_timeout: Duration,
    /// Refresh cookie lifetime, in days.
    pub jwt_cookie_expires_in: i64,
}

impl ServerDeps {
    pub async fn send_email_with_timeout(
        &self,
        to: &str,
        subject: &str,
        text: &str,
    ) -> Result<(), NotifierError> {
        tokio::time::timeout(self.notifier_timeout, self.notifier.send_email(to, subject, text))
            .await
            .map_err(|_| NotifierError::Timeout)?
    }

    pub async fn send_sms_with_timeout(
        &self,
        country_code: &str,
        phone_number: &str,
        text: &str,
    ) -> Result<(), NotifierError> {
        tokio::time::timeout(
            self.notifier_timeout,
            self.notifier.send_sms(country_code, phone_number, text),
        )
        .await
        .map_err(|_| NotifierError::Timeout)?
    }
}
