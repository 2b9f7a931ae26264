//! Argon2 password hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::kernel::traits::BasePasswordVerifier;

#[derive(Debug, Clone, Default)]
pub struct Argon2Verifier;

impl BasePasswordVerifier for Argon2Verifier {
    fn hash(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| anyhow::anyhow!("stored password hash is malformed: {}", e))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trip() {
        let verifier = Argon2Verifier;
        let hash = verifier.hash("correct horse").unwrap();

        assert!(verifier.verify("correct horse", &hash).unwrap());
        assert!(!verifier.verify("wrong horse", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let verifier = Argon2Verifier;
        assert!(verifier.verify("anything", "not-a-phc-string").is_err());
    }
}
