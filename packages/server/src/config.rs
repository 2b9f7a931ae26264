use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    /// Lifetime of the refresh cookie, in days.
    pub jwt_cookie_expires_in: i64,
    pub eskiz_email: String,
    pub eskiz_password: String,
    pub email_api_token: String,
    pub email_from: String,
    /// Upper bound on a single notifier call, in seconds.
    pub notifier_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            access_token_secret: env::var("ACCESS_TOKEN_SECRET")
                .context("ACCESS_TOKEN_SECRET must be set")?,
            refresh_token_secret: env::var("REFRESH_TOKEN_SECRET")
                .context("REFRESH_TOKEN_SECRET must be set")?,
            jwt_cookie_expires_in: env::var("JWT_COOKIE_EXPIRES_IN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("JWT_COOKIE_EXPIRES_IN must be a valid number of days")?,
            eskiz_email: env::var("ESKIZ_EMAIL").context("ESKIZ_EMAIL must be set")?,
            eskiz_password: env::var("ESKIZ_PASSWORD").context("ESKIZ_PASSWORD must be set")?,
            email_api_token: env::var("EMAIL_API_TOKEN").context("EMAIL_API_TOKEN must be set")?,
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Almond <mailtrap@almond.uz>".to_string()),
            notifier_timeout_secs: env::var("NOTIFIER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("NOTIFIER_TIMEOUT_SECS must be a valid number")?,
        })
    }
}
