use std::sync::Arc;
use std::time::Duration;

use almond_core::domains::auth::jwt::TokenService;
use almond_core::domains::auth::store::PgAuthStore;
use almond_core::domains::categories::store::PgCategoryStore;
use almond_core::kernel::deps::ServerDeps;
use almond_core::kernel::geolocate::IpApiLocator;
use almond_core::kernel::notifier::HttpNotifier;
use almond_core::kernel::password::Argon2Verifier;
use almond_core::server::{build_app, AxumAppState};
use almond_core::Config;
use anyhow::Context;
use eskiz::{EskizOptions, EskizService};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "almond_server=debug,almond_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let auth_store = Arc::new(PgAuthStore::new(pool.clone()));
    let sms = EskizService::new(EskizOptions {
        email: config.eskiz_email.clone(),
        password: config.eskiz_password.clone(),
        from: "4546".to_string(),
    });

    let deps = Arc::new(ServerDeps {
        identities: auth_store.clone(),
        sessions: auth_store,
        categories: Arc::new(PgCategoryStore::new(pool.clone())),
        notifier: Arc::new(HttpNotifier::new(
            config.email_api_token.clone(),
            &config.email_from,
            sms,
        )),
        geolocator: Arc::new(IpApiLocator::new()),
        passwords: Arc::new(Argon2Verifier),
        tokens: Arc::new(TokenService::new(
            &config.access_token_secret,
            &config.refresh_token_secret,
        )),
        notifier_timeout: Duration::from_secs(config.notifier_timeout_secs),
        jwt_cookie_expires_in: config.jwt_cookie_expires_in,
    });

    let app = build_app(AxumAppState {
        deps,
        db_pool: Some(pool),
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
