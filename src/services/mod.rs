//! Services Layer
//!
//! Multi-record business operations. Each runs in one store transaction
//! or is a read-only query.

pub mod author_service;
pub mod loan_service;
pub mod report_service;

pub use loan_service::AvailabilityMismatch;
pub use report_service::BookWithAuthors;
