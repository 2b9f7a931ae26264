//! Category endpoints. Reads are public and localized; writes sit
//! behind the route guard plus the admin restriction.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use serde_json::json;
use uuid::Uuid;

use crate::common::AppError;
use crate::domains::categories::actions::{
    create_category, delete_category, get_category, list_categories, list_tree, move_category,
    resolve_full_path, update_category, CreateCategoryRequest, MoveCategoryRequest,
    UpdateCategoryRequest,
};
use crate::server::app::AxumAppState;
use crate::server::cookies::locale_from_jar;

pub async fn list_handler(
    State(state): State<AxumAppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let locale = locale_from_jar(&jar);
    let categories = list_categories(locale, &state.deps).await?;
    Ok(success(json!({ "categories": categories })))
}

pub async fn tree_handler(
    State(state): State<AxumAppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let locale = locale_from_jar(&jar);
    let tree = list_tree(locale, &state.deps).await?;
    Ok(success(json!({ "categories": tree })))
}

pub async fn get_handler(
    State(state): State<AxumAppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let locale = locale_from_jar(&jar);
    let category = get_category(id, locale, &state.deps).await?;
    Ok(success(json!({ "category": category })))
}

pub async fn hierarchy_handler(
    State(state): State<AxumAppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let locale = locale_from_jar(&jar);
    let path = resolve_full_path(id, locale, &state.deps).await?;
    Ok(success(json!({ "hierarchy": path })))
}

pub async fn create_handler(
    State(state): State<AxumAppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<Response, AppError> {
    let category = create_category(body, &state.deps).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": { "category": category } })),
    )
        .into_response())
}

pub async fn update_handler(
    State(state): State<AxumAppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Response, AppError> {
    let category = update_category(id, body, &state.deps).await?;
    Ok(success(json!({ "category": category })))
}

pub async fn move_handler(
    State(state): State<AxumAppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<MoveCategoryRequest>,
) -> Result<Response, AppError> {
    let category = move_category(id, body, &state.deps).await?;
    Ok(success(json!({ "category": category })))
}

pub async fn delete_handler(
    State(state): State<AxumAppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    delete_category(id, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

fn success(data: serde_json::Value) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "status": "success", "data": data })),
    )
        .into_response()
}
