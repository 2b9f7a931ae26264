//! Auth domain - identity lifecycle, verification codes and sessions.
//!
//! Responsibilities:
//! - Signup by email or phone; identities start `pending`
//! - Collision-checked verification codes with a 10-minute TTL
//! - Activation (`pending` -> `active`) as one atomic transition
//! - JWT access/refresh token issuance and session tracking

pub mod actions;
pub mod data;
pub mod jwt;
pub mod models;
pub mod store;
pub mod validators;
pub mod verification;

pub use data::UserData;
pub use jwt::{Claims, TokenService, TokenVerifyError};
pub use store::{IdentityStore, PgAuthStore, SessionStore};
