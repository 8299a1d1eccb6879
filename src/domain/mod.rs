//! Domain layer - Business abstractions
//!
//! Repository contracts and the error taxonomy. Implementations live in
//! the infrastructure layer.

pub mod errors;
pub mod repositories;

pub use errors::{DomainError, DomainResult};
pub use repositories::*;
