//! CRUD orchestration for categories.

use super::error::{classify_delete_error, ServiceError};
use super::validation;
use crate::db::{Category, CategoryRequest, CategoryResponse, DbPool, Page, PageRequest};

const SORTABLE: &[&str] = &["id", "name"];

pub async fn find_by_id(db: &DbPool, id: i64) -> Result<CategoryResponse, ServiceError> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("category", id))?;
    Ok(category.into())
}

pub async fn find_all_paged(
    db: &DbPool,
    request: &PageRequest,
) -> Result<Page<CategoryResponse>, ServiceError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(db)
        .await?;

    let sql = format!(
        "SELECT * FROM categories {} LIMIT ? OFFSET ?",
        request.order_clause(SORTABLE, "name")
    );
    let rows = sqlx::query_as::<_, Category>(&sql)
        .bind(request.size)
        .bind(request.offset())
        .fetch_all(db)
        .await?;

    let items = rows.into_iter().map(Into::into).collect();
    Ok(Page::new(items, total, request))
}

pub async fn insert(db: &DbPool, req: &CategoryRequest) -> Result<CategoryResponse, ServiceError> {
    validation::validate_category(req)?;

    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query("INSERT INTO categories (name, created_at, updated_at) VALUES (?, ?, ?)")
        .bind(&req.name)
        .bind(&now)
        .bind(&now)
        .execute(db)
        .await?;

    find_by_id(db, result.last_insert_rowid()).await
}

pub async fn update(
    db: &DbPool,
    id: i64,
    req: &CategoryRequest,
) -> Result<CategoryResponse, ServiceError> {
    // Existence check first: a missing id reports NotFound before any write
    find_by_id(db, id).await?;
    validation::validate_category(req)?;

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("UPDATE categories SET name = ?, updated_at = ? WHERE id = ?")
        .bind(&req.name)
        .bind(&now)
        .bind(id)
        .execute(db)
        .await?;

    find_by_id(db, id).await
}

pub async fn delete(db: &DbPool, id: i64) -> Result<(), ServiceError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| classify_delete_error(e, "category"))?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::not_found("category", id));
    }
    Ok(())
}
