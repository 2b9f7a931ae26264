use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::auth::models::User;

/// Public API representation of a user.
///
/// The password hash, verification code/expiry and password-change
/// timestamp never appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub email: Option<String>,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
    pub username: String,
    pub role: String,
    pub account_status: String,
    pub language: String,
    pub average_rating: f64,
    pub ratings_quantity: i32,
    pub is_account_suspended: bool,
    pub is_verified_user: bool,
    pub is_phone_number_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            family_name: user.family_name,
            email: user.email,
            country_code: user.country_code,
            phone_number: user.phone_number,
            username: user.username,
            role: user.role,
            account_status: user.account_status,
            language: user.language,
            average_rating: user.average_rating,
            ratings_quantity: user.ratings_quantity,
            is_account_suspended: user.is_account_suspended,
            is_verified_user: user.is_verified_user,
            is_phone_number_verified: user.is_phone_number_verified,
            created_at: user.created_at,
        }
    }
}
