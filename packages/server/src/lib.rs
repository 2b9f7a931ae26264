// Almond classifieds backend - auth and category hierarchy core
//
// This crate provides signup/verification, JWT session management and
// the category tree for the Almond marketplace. Storage is a capability
// interface with Postgres and in-memory adapters; external services
// (SMS/email delivery, geolocation, password hashing) sit behind traits
// in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
