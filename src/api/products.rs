//! Product API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::ApiError;
use crate::db::{Page, PageQuery, ProductRequest, ProductResponse};
use crate::services::products;
use crate::AppState;

/// List products with pagination and optional sort
///
/// GET /api/products?page=0&size=12&sort=name,asc
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ProductResponse>>, ApiError> {
    let page = products::find_all_paged(&state.db, &query.into()).await?;
    Ok(Json(page))
}

/// Get a single product
///
/// GET /api/products/:id
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = products::find_by_id(&state.db, id).await?;
    Ok(Json(product))
}

/// Create a product
///
/// POST /api/products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let created = products::insert(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a product
///
/// PUT /api/products/:id
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let updated = products::update(&state.db, id, &req).await?;
    Ok(Json(updated))
}

/// Delete a product
///
/// DELETE /api/products/:id
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    products::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
