//! Orchestration services: each CRUD operation sequences lookup,
//! validation, association resolution and persistence, and reports
//! failures as explicit [`error::ServiceError`] kinds.

pub mod categories;
pub mod error;
pub mod products;
pub mod users;
pub mod validation;

pub use error::{FieldMessage, ServiceError};
