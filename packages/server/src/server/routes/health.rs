//! Health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::server::app::AxumAppState;

/// Liveness plus a database ping when a pool is attached. Test
/// routers run without a pool and report `"skipped"`.
pub async fn health_handler(State(state): State<AxumAppState>) -> Response {
    let database = match &state.db_pool {
        Some(pool) => match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => json!({
                "status": "ok",
                "pool_size": pool.size(),
                "pool_idle": pool.num_idle(),
            }),
            Err(e) => {
                tracing::error!("health check database ping failed: {}", e);
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "status": "error", "database": { "status": "unreachable" } })),
                )
                    .into_response();
            }
        },
        None => json!({ "status": "skipped" }),
    };

    Json(json!({ "status": "ok", "database": database })).into_response()
}
