//! Domain error types
//!
//! These errors are what every store, lifecycle and association
//! operation reports to its caller. None of them are retried internally.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Result type used across the crate.
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A declared unique attribute (ISBN, barcode, national id) was reused
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A referenced record does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// A loan was requested on a copy that is already lent out
    #[error("copy {copy_id} is not available")]
    CopyUnavailable { copy_id: i32 },

    /// A return was registered on a loan that is no longer active
    #[error("loan {loan_id} was already returned")]
    AlreadyReturned { loan_id: i32 },

    /// Input rejected before reaching the store
    #[error("validation failed: {0}")]
    Validation(String),

    /// Any other persistence failure
    #[error("database error: {0}")]
    Database(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

// Conversion from SeaORM errors (used in infrastructure and services)
impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => DomainError::ConstraintViolation(msg),
            _ => DomainError::Database(e.to_string()),
        }
    }
}
