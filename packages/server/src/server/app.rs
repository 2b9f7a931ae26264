//! Router assembly.

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::deps::ServerDeps;
use crate::server::middleware::{protect_routes, require_admin};
use crate::server::routes::{auth, categories, health};

#[derive(Clone)]
pub struct AxumAppState {
    pub deps: Arc<ServerDeps>,
    /// Only used by the health check; tests run without one.
    pub db_pool: Option<PgPool>,
}

pub fn build_app(state: AxumAppState) -> Router {
    let public = Router::new()
        .route("/api/health", get(health::health_handler))
        .route(
            "/api/v1/users/signup/email",
            post(auth::signup_with_email_handler),
        )
        .route(
            "/api/v1/users/signup/phone-number",
            post(auth::signup_with_phone_handler),
        )
        .route("/api/v1/users/verify", post(auth::verify_handler))
        .route("/api/v1/users/login", post(auth::login_handler))
        .route("/api/v1/categories", get(categories::list_handler))
        .route("/api/v1/categories/tree", get(categories::tree_handler))
        .route("/api/v1/categories/:id", get(categories::get_handler))
        .route(
            "/api/v1/categories/:id/hierarchy",
            get(categories::hierarchy_handler),
        );

    let authed = Router::new()
        .route("/api/v1/users/logout", get(auth::logout_handler))
        .route_layer(from_fn_with_state(state.clone(), protect_routes));

    // Admin routes run the guard first, then the role check:
    // route_layer wraps outside-in, so the restriction is added first.
    let admin = Router::new()
        .route("/api/v1/categories", post(categories::create_handler))
        .route("/api/v1/categories/:id", patch(categories::update_handler))
        .route(
            "/api/v1/categories/:id/parent",
            patch(categories::move_handler),
        )
        .route(
            "/api/v1/categories/:id",
            delete(categories::delete_handler),
        )
        .route_layer(axum::middleware::from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), protect_routes));

    Router::new()
        .merge(public)
        .merge(authed)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
