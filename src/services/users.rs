//! CRUD orchestration for users and their role memberships.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};

use super::error::{classify_delete_error, ServiceError};
use super::validation;
use crate::db::{
    CreateUserRequest, DbPool, Page, PageRequest, Role, UpdateUserRequest, User, UserResponse,
};

const SORTABLE: &[&str] = &["id", "name", "email"];

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

async fn resolve_roles(db: &DbPool, ids: &[i64]) -> Result<Vec<Role>, ServiceError> {
    // Role membership is a set: duplicate ids collapse to one reference
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mut roles = Vec::with_capacity(ids.len());
    for role_id in ids {
        let role = sqlx::query_as::<_, Role>("SELECT id, authority FROM roles WHERE id = ?")
            .bind(role_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("role", role_id))?;
        roles.push(role);
    }
    Ok(roles)
}

async fn roles_of(db: &DbPool, user_id: i64) -> Result<Vec<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        "SELECT r.id, r.authority FROM roles r \
         JOIN user_roles ur ON ur.role_id = r.id \
         WHERE ur.user_id = ? ORDER BY r.id",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &DbPool, id: i64) -> Result<UserResponse, ServiceError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user", id))?;

    let roles = roles_of(db, id).await?;
    Ok(user.into_response(roles))
}

pub async fn find_all_paged(
    db: &DbPool,
    request: &PageRequest,
) -> Result<Page<UserResponse>, ServiceError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;

    let sql = format!(
        "SELECT * FROM users {} LIMIT ? OFFSET ?",
        request.order_clause(SORTABLE, "name")
    );
    let rows = sqlx::query_as::<_, User>(&sql)
        .bind(request.size)
        .bind(request.offset())
        .fetch_all(db)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for user in rows {
        let roles = roles_of(db, user.id).await?;
        items.push(user.into_response(roles));
    }

    Ok(Page::new(items, total, request))
}

pub async fn insert(db: &DbPool, req: &CreateUserRequest) -> Result<UserResponse, ServiceError> {
    validation::validate_user_insert(db, req).await?;
    let roles = resolve_roles(db, &req.role_ids).await?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| ServiceError::Internal(format!("password hashing failed: {e}")))?;

    let now = chrono::Utc::now().to_rfc3339();
    let mut tx = db.begin().await?;

    let result = sqlx::query(
        "INSERT INTO users (name, email, password_hash, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&req.name)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(&now)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    let id = result.last_insert_rowid();
    for role in &roles {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(id)
            .bind(role.id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    find_by_id(db, id).await
}

pub async fn update(
    db: &DbPool,
    id: i64,
    req: &UpdateUserRequest,
) -> Result<UserResponse, ServiceError> {
    // Existence check first: a missing id reports NotFound before any write
    find_by_id(db, id).await?;
    validation::validate_user_update(db, id, req).await?;
    let roles = resolve_roles(db, &req.role_ids).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let mut tx = db.begin().await?;

    sqlx::query("UPDATE users SET name = ?, email = ?, updated_at = ? WHERE id = ?")
        .bind(&req.name)
        .bind(&req.email)
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    for role in &roles {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(id)
            .bind(role.id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    find_by_id(db, id).await
}

pub async fn delete(db: &DbPool, id: i64) -> Result<(), ServiceError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| classify_delete_error(e, "user"))?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::not_found("user", id));
    }
    Ok(())
}

/// Create the default admin user on first startup. Does nothing once any
/// user exists.
pub async fn ensure_admin_user(
    db: &DbPool,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), ServiceError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    if existing > 0 {
        return Ok(());
    }

    let admin_role: i64 = sqlx::query_scalar("SELECT id FROM roles WHERE authority = 'ROLE_ADMIN'")
        .fetch_one(db)
        .await?;

    let req = CreateUserRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role_ids: vec![admin_role],
    };
    let user = insert(db, &req).await?;
    tracing::info!(email = %user.email, "Created default admin user");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    fn verify_password(password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    fn create_request(name: &str, email: &str, role_ids: Vec<i64>) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: "correct horse battery staple".to_string(),
            role_ids,
        }
    }

    #[tokio::test]
    async fn test_insert_hashes_password_and_hides_it() {
        let pool = test_pool().await;
        let created = insert(&pool, &create_request("Alex", "alex@example.com", vec![1]))
            .await
            .unwrap();
        assert!(created.id > 0);
        assert_eq!(created.roles.len(), 1);
        assert_eq!(created.roles[0].authority, "ROLE_OPERATOR");

        let stored: String =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
                .bind(created.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_ne!(stored, "correct horse battery staple");
        assert!(verify_password("correct horse battery staple", &stored));
        assert!(!verify_password("wrong password", &stored));
    }

    #[tokio::test]
    async fn test_insert_collapses_duplicate_role_ids() {
        let pool = test_pool().await;
        let created = insert(&pool, &create_request("Alex", "alex@example.com", vec![2, 1, 2]))
            .await
            .unwrap();
        assert_eq!(created.roles.len(), 2);
    }

    #[tokio::test]
    async fn test_insert_with_missing_role_writes_nothing() {
        let pool = test_pool().await;
        let err = insert(&pool, &create_request("Alex", "alex@example.com", vec![1000]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_update_changes_email_and_roles() {
        let pool = test_pool().await;
        let created = insert(&pool, &create_request("Alex", "alex@example.com", vec![1]))
            .await
            .unwrap();

        let updated = update(
            &pool,
            created.id,
            &UpdateUserRequest {
                name: "Alex Green".to_string(),
                email: "alex.green@example.com".to_string(),
                role_ids: vec![1, 2],
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "Alex Green");
        assert_eq!(updated.email, "alex.green@example.com");
        assert_eq!(updated.roles.len(), 2);
    }

    #[tokio::test]
    async fn test_update_to_taken_email_fails_validation() {
        let pool = test_pool().await;
        let alex = insert(&pool, &create_request("Alex", "alex@example.com", vec![1]))
            .await
            .unwrap();
        insert(&pool, &create_request("Maria", "maria@example.com", vec![1]))
            .await
            .unwrap();

        let err = update(
            &pool,
            alex.id,
            &UpdateUserRequest {
                name: "Alex".to_string(),
                email: "maria@example.com".to_string(),
                role_ids: vec![1],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let pool = test_pool().await;
        let err = update(
            &pool,
            1000,
            &UpdateUserRequest {
                name: "Ghost".to_string(),
                email: "ghost@example.com".to_string(),
                role_ids: vec![1],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_user_clears_role_links() {
        let pool = test_pool().await;
        let created = insert(&pool, &create_request("Alex", "alex@example.com", vec![1, 2]))
            .await
            .unwrap();

        delete(&pool, created.id).await.unwrap();

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE user_id = ?")
            .bind(created.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(links, 0);

        let err = delete(&pool, created.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_all_paged_sorted_by_email() {
        let pool = test_pool().await;
        insert(&pool, &create_request("Maria", "maria@example.com", vec![1]))
            .await
            .unwrap();
        insert(&pool, &create_request("Alex", "alex@example.com", vec![1]))
            .await
            .unwrap();

        let request = PageRequest::new(0, 10).with_sort("email", crate::db::SortDirection::Asc);
        let page = find_all_paged(&pool, &request).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].email, "alex@example.com");
        assert_eq!(page.items[1].email, "maria@example.com");
    }

    #[tokio::test]
    async fn test_ensure_admin_user_runs_once() {
        let pool = test_pool().await;
        ensure_admin_user(&pool, "Admin", "admin@example.com", "changeme123")
            .await
            .unwrap();
        ensure_admin_user(&pool, "Admin", "admin@example.com", "changeme123")
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);

        let admin = find_by_id(&pool, 1).await.unwrap();
        assert_eq!(admin.roles.len(), 1);
        assert_eq!(admin.roles[0].authority, "ROLE_ADMIN");
    }
}
