//! User API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::ApiError;
use crate::db::{CreateUserRequest, Page, PageQuery, UpdateUserRequest, UserResponse};
use crate::services::users;
use crate::AppState;

/// List users with pagination
///
/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    let page = users::find_all_paged(&state.db, &query.into()).await?;
    Ok(Json(page))
}

/// Get a single user
///
/// GET /api/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = users::find_by_id(&state.db, id).await?;
    Ok(Json(user))
}

/// Create a user
///
/// POST /api/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let created = users::insert(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a user. The target id comes from the path and is passed to
/// validation explicitly.
///
/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = users::update(&state.db, id, &req).await?;
    Ok(Json(updated))
}

/// Delete a user
///
/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    users::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
