//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and schema bootstrap (db)
//! - Configuration loading (config)
//! - Logging setup (telemetry)
//! - Repository implementations (repositories)
//! - The store handle (state)
//! - Demo data (seed)

pub mod config;
pub mod db;
pub mod repositories;
pub mod seed;
pub mod state;
pub mod telemetry;

pub use repositories::*;
pub use state::Library;
