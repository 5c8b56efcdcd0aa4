//! CRUD orchestration for products, including category membership.

use super::error::{classify_delete_error, ServiceError};
use super::validation;
use crate::db::{
    Category, CategoryResponse, DbPool, Page, PageRequest, Product, ProductRequest, ProductResponse,
};

const SORTABLE: &[&str] = &["id", "name", "price", "release_date"];

/// Resolve each referenced category id to an existing row. Resolution
/// happens before any write, so a missing reference fails the whole
/// operation without leaving a partially constructed product behind.
async fn resolve_categories(
    db: &DbPool,
    ids: &[i64],
) -> Result<Vec<CategoryResponse>, ServiceError> {
    // Membership is a set: duplicate ids collapse to one reference
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mut categories = Vec::with_capacity(ids.len());
    for category_id in ids {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("category", category_id))?;
        categories.push(category.into());
    }
    Ok(categories)
}

async fn categories_of(db: &DbPool, product_id: i64) -> Result<Vec<CategoryResponse>, sqlx::Error> {
    sqlx::query_as::<_, CategoryResponse>(
        "SELECT c.id, c.name FROM categories c \
         JOIN product_categories pc ON pc.category_id = c.id \
         WHERE pc.product_id = ? ORDER BY c.id",
    )
    .bind(product_id)
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &DbPool, id: i64) -> Result<ProductResponse, ServiceError> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("product", id))?;

    let categories = categories_of(db, id).await?;
    Ok(product.into_response(categories))
}

pub async fn find_all_paged(
    db: &DbPool,
    request: &PageRequest,
) -> Result<Page<ProductResponse>, ServiceError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(db)
        .await?;

    let sql = format!(
        "SELECT * FROM products {} LIMIT ? OFFSET ?",
        request.order_clause(SORTABLE, "name")
    );
    let rows = sqlx::query_as::<_, Product>(&sql)
        .bind(request.size)
        .bind(request.offset())
        .fetch_all(db)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for product in rows {
        let categories = categories_of(db, product.id).await?;
        items.push(product.into_response(categories));
    }

    Ok(Page::new(items, total, request))
}

pub async fn insert(db: &DbPool, req: &ProductRequest) -> Result<ProductResponse, ServiceError> {
    validation::validate_product(req)?;
    let categories = resolve_categories(db, &req.category_ids).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let mut tx = db.begin().await?;

    let result = sqlx::query(
        "INSERT INTO products (name, description, price, image_url, release_date, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.price)
    .bind(&req.image_url)
    .bind(&req.release_date)
    .bind(&now)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    let id = result.last_insert_rowid();
    for category in &categories {
        sqlx::query("INSERT INTO product_categories (product_id, category_id) VALUES (?, ?)")
            .bind(id)
            .bind(category.id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    find_by_id(db, id).await
}

pub async fn update(
    db: &DbPool,
    id: i64,
    req: &ProductRequest,
) -> Result<ProductResponse, ServiceError> {
    // Existence check first: a missing id reports NotFound before any write
    find_by_id(db, id).await?;
    validation::validate_product(req)?;
    let categories = resolve_categories(db, &req.category_ids).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let mut tx = db.begin().await?;

    sqlx::query(
        "UPDATE products SET name = ?, description = ?, price = ?, image_url = ?, \
         release_date = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.price)
    .bind(&req.image_url)
    .bind(&req.release_date)
    .bind(&now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM product_categories WHERE product_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    for category in &categories {
        sqlx::query("INSERT INTO product_categories (product_id, category_id) VALUES (?, ?)")
            .bind(id)
            .bind(category.id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    find_by_id(db, id).await
}

pub async fn delete(db: &DbPool, id: i64) -> Result<(), ServiceError> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| classify_delete_error(e, "product"))?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::not_found("product", id));
    }
    Ok(())
}
