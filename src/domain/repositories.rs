//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainResult;
use crate::models::{author, book, branch, copy, person};

/// Input for creating a book
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub publisher: String,
    pub publication_year: i32,
}

/// Input for creating a branch
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewBranch {
    pub name: String,
    pub city: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

/// Input for registering a borrower
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewPerson {
    pub national_id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Input for creating a copy
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewCopy {
    pub barcode: String,
    pub book_id: i32,
    pub branch_id: i32,
}

/// Repository trait for Author entity
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Find all authors
    async fn find_all(&self) -> DomainResult<Vec<author::Model>>;

    /// Find an author by ID
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<author::Model>>;

    /// Create a new author; the name must not be blank
    async fn create(&self, name: String) -> DomainResult<author::Model>;
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn find_all(&self) -> DomainResult<Vec<book::Model>>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<book::Model>>;

    async fn find_by_isbn(&self, isbn: &str) -> DomainResult<Option<book::Model>>;

    /// Create a new book. Fails with `ConstraintViolation` on a reused ISBN.
    async fn create(&self, input: NewBook) -> DomainResult<book::Model>;
}

/// Repository trait for Branch entity
#[async_trait]
pub trait BranchRepository: Send + Sync {
    async fn find_all(&self) -> DomainResult<Vec<branch::Model>>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<branch::Model>>;

    async fn create(&self, input: NewBranch) -> DomainResult<branch::Model>;
}

/// Repository trait for Person entity
#[async_trait]
pub trait PersonRepository: Send + Sync {
    async fn find_all(&self) -> DomainResult<Vec<person::Model>>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<person::Model>>;

    async fn find_by_national_id(&self, national_id: &str) -> DomainResult<Option<person::Model>>;

    /// Register a borrower. Fails with `ConstraintViolation` on a reused national id.
    async fn create(&self, input: NewPerson) -> DomainResult<person::Model>;
}

/// Repository trait for Copy entity
///
/// There is no general update: availability belongs to the loan service.
#[async_trait]
pub trait CopyRepository: Send + Sync {
    /// Find all copies
    async fn find_all(&self) -> DomainResult<Vec<copy::Model>>;

    /// Find a copy by ID
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<copy::Model>>;

    /// Find a copy by its barcode
    async fn find_by_barcode(&self, barcode: &str) -> DomainResult<Option<copy::Model>>;

    /// Find copies of a specific book
    async fn find_by_book_id(&self, book_id: i32) -> DomainResult<Vec<copy::Model>>;

    /// Create a new, available copy of an existing book at an existing branch
    async fn create(&self, input: NewCopy) -> DomainResult<copy::Model>;
}
