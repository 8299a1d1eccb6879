//! Lending library core: authors, books, branches, copies, people and
//! the loans that move copies between available and lent out.

pub mod domain;
pub mod infrastructure;
pub mod models;
pub mod services;

pub use domain::{DomainError, DomainResult};
pub use infrastructure::Library;
pub use infrastructure::config;
pub use infrastructure::db;
pub use infrastructure::seed;
