//! Category API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::ApiError;
use crate::db::{CategoryRequest, CategoryResponse, Page, PageQuery};
use crate::services::categories;
use crate::AppState;

/// List categories with pagination
///
/// GET /api/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<CategoryResponse>>, ApiError> {
    let page = categories::find_all_paged(&state.db, &query.into()).await?;
    Ok(Json(page))
}

/// Get a single category
///
/// GET /api/categories/:id
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = categories::find_by_id(&state.db, id).await?;
    Ok(Json(category))
}

/// Create a category
///
/// POST /api/categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let created = categories::insert(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a category
///
/// PUT /api/categories/:id
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let updated = categories::update(&state.db, id, &req).await?;
    Ok(Json(updated))
}

/// Delete a category. Fails with 409 while products still reference it.
///
/// DELETE /api/categories/:id
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    categories::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
