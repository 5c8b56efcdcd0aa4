//! Domain error kinds returned by the orchestration services.
//!
//! Every service call site signals failures through these explicit kinds;
//! the transport layer maps them onto HTTP status codes.

use serde::Serialize;
use thiserror::Error;

/// A field-scoped validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMessage {
    pub field: String,
    pub message: String,
}

impl FieldMessage {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested id, or a referenced association id, does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The operation is blocked by existing references to the row.
    #[error("{0}")]
    Conflict(String),

    /// Semantic rule violations, collected per field.
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldMessage>),

    /// Unclassified persistence failure; propagated, never swallowed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(resource: &str, id: i64) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }
}

/// Distinguish the two delete failure modes the database can raise:
/// a foreign-key violation means the row is still referenced (conflict),
/// anything else stays an unclassified database error.
pub(crate) fn classify_delete_error(err: sqlx::Error, resource: &str) -> ServiceError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.message().contains("FOREIGN KEY constraint failed") => {
            ServiceError::Conflict(format!("{resource} is referenced by other records"))
        }
        _ => ServiceError::Database(err),
    }
}
