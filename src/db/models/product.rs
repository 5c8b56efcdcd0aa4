//! Product model and transfer objects.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::category::CategoryResponse;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub release_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Product with its category memberships for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub release_date: Option<String>,
    pub categories: Vec<CategoryResponse>,
}

impl Product {
    pub fn into_response(self, categories: Vec<CategoryResponse>) -> ProductResponse {
        ProductResponse {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            release_date: self.release_date,
            categories,
        }
    }
}

/// Request body for creating or updating a product. The id is never
/// client-supplied; the database assigns it on insert.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}
