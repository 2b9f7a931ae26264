//! Capability traits for the external collaborators. Production
//! adapters live next door; test fakes in `test_dependencies`.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifierError {
    /// The send did not complete within the configured deadline.
    #[error("notifier call timed out")]
    Timeout,

    #[error("{0}")]
    Failed(String),
}

/// Delivers verification messages over email or SMS.
#[async_trait]
pub trait BaseNotifier: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, text: &str) -> Result<(), NotifierError>;

    async fn send_sms(
        &self,
        country_code: &str,
        phone_number: &str,
        text: &str,
    ) -> Result<(), NotifierError>;
}

/// Resolves an IP address to a human-readable location string.
#[async_trait]
pub trait BaseGeoLocator: Send + Sync {
    async fn locate(&self, ip_address: &str) -> anyhow::Result<String>;
}

/// Hashes and verifies passwords. Sync: the work is CPU-bound and
/// short enough not to warrant a blocking-pool hop at this volume.
pub trait BasePasswordVerifier: Send + Sync {
    fn hash(&self, password: &str) -> anyhow::Result<String>;
    fn verify(&self, password: &str, hash: &str) -> anyhow::Result<bool>;
}
