//! Semantic validation for catalog requests.
//!
//! Field-level violations are collected and returned together rather than
//! failing on the first one. Cross-record checks (email uniqueness) run
//! against the database and take the target user id as an explicit
//! parameter, never from ambient request context.

use lazy_static::lazy_static;
use regex::Regex;

use super::error::{FieldMessage, ServiceError};
use crate::db::{CategoryRequest, CreateUserRequest, DbPool, ProductRequest, UpdateUserRequest, User};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
}

/// Collector for field-scoped violations.
#[derive(Debug, Default)]
pub struct Violations {
    list: Vec<FieldMessage>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.list.push(FieldMessage::new(field, message));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn finish(self) -> Result<(), ServiceError> {
        if self.list.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(self.list))
        }
    }
}

fn check_name(violations: &mut Violations, name: &str) {
    if name.trim().is_empty() {
        violations.add("name", "name is required");
    } else if name.len() > 100 {
        violations.add("name", "name is too long (max 100 characters)");
    }
}

fn check_email(violations: &mut Violations, email: &str) {
    if email.is_empty() {
        violations.add("email", "email is required");
    } else if !EMAIL_REGEX.is_match(email) {
        violations.add("email", "invalid email format");
    }
}

pub fn validate_category(req: &CategoryRequest) -> Result<(), ServiceError> {
    let mut violations = Violations::new();
    check_name(&mut violations, &req.name);
    violations.finish()
}

pub fn validate_product(req: &ProductRequest) -> Result<(), ServiceError> {
    let mut violations = Violations::new();
    check_name(&mut violations, &req.name);
    if req.price < 0.0 {
        violations.add("price", "price must not be negative");
    }
    violations.finish()
}

async fn find_by_email(db: &DbPool, email: &str) -> Result<Option<User>, ServiceError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn validate_user_insert(db: &DbPool, req: &CreateUserRequest) -> Result<(), ServiceError> {
    let mut violations = Violations::new();
    check_name(&mut violations, &req.name);
    check_email(&mut violations, &req.email);
    if req.password.len() < 8 {
        violations.add("password", "password must be at least 8 characters");
    }

    if violations.is_empty() && find_by_email(db, &req.email).await?.is_some() {
        violations.add("email", "this email is already registered");
    }

    violations.finish()
}

/// Validate a user update against the rest of the population. The email
/// may stay the same for the user being updated, but must not match any
/// other user's email.
pub async fn validate_user_update(
    db: &DbPool,
    user_id: i64,
    req: &UpdateUserRequest,
) -> Result<(), ServiceError> {
    let mut violations = Violations::new();
    check_name(&mut violations, &req.name);
    check_email(&mut violations, &req.email);

    if violations.is_empty() {
        if let Some(owner) = find_by_email(db, &req.email).await? {
            if owner.id != user_id {
                violations.add("email", "this email is already registered to another user");
            }
        }
    }

    violations.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::services::users;

    fn product_request(name: &str, price: f64) -> ProductRequest {
        ProductRequest {
            name: name.to_string(),
            description: None,
            price,
            image_url: None,
            release_date: None,
            category_ids: Vec::new(),
        }
    }

    #[test]
    fn test_validate_product_collects_all_violations() {
        let err = validate_product(&product_request("", -1.0)).unwrap_err();
        match err {
            ServiceError::Validation(list) => {
                assert_eq!(list.len(), 2);
                assert_eq!(list[0].field, "name");
                assert_eq!(list[1].field, "price");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_product_accepts_valid_request() {
        assert!(validate_product(&product_request("Macbook Pro", 1250.0)).is_ok());
        assert!(validate_product(&product_request("Free sample", 0.0)).is_ok());
    }

    #[test]
    fn test_validate_category_requires_name() {
        assert!(validate_category(&CategoryRequest {
            name: "Books".to_string()
        })
        .is_ok());
        assert!(validate_category(&CategoryRequest {
            name: "  ".to_string()
        })
        .is_err());
    }

    fn insert_request(name: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: "hunter2hunter2".to_string(),
            role_ids: vec![1],
        }
    }

    fn update_request(name: &str, email: &str) -> UpdateUserRequest {
        UpdateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            role_ids: vec![1],
        }
    }

    #[tokio::test]
    async fn test_update_rejects_email_of_another_user() {
        let pool = test_pool().await;
        let alex = users::insert(&pool, &insert_request("Alex", "alex@example.com"))
            .await
            .unwrap();
        users::insert(&pool, &insert_request("Maria", "maria@example.com"))
            .await
            .unwrap();

        let err = validate_user_update(&pool, alex.id, &update_request("Alex", "maria@example.com"))
            .await
            .unwrap_err();

        match err {
            ServiceError::Validation(list) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].field, "email");
                assert_eq!(
                    list[0].message,
                    "this email is already registered to another user"
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_allows_own_unchanged_email() {
        let pool = test_pool().await;
        let alex = users::insert(&pool, &insert_request("Alex", "alex@example.com"))
            .await
            .unwrap();

        let result =
            validate_user_update(&pool, alex.id, &update_request("Alex Green", "alex@example.com"))
                .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let pool = test_pool().await;
        users::insert(&pool, &insert_request("Alex", "alex@example.com"))
            .await
            .unwrap();

        let err = validate_user_insert(&pool, &insert_request("Other", "alex@example.com"))
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(list) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].field, "email");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_insert_field_checks_run_together() {
        let pool = test_pool().await;
        let req = CreateUserRequest {
            name: String::new(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            role_ids: Vec::new(),
        };
        let err = validate_user_insert(&pool, &req).await.unwrap_err();
        match err {
            ServiceError::Validation(list) => {
                let fields: Vec<_> = list.iter().map(|m| m.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email", "password"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
