// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod config;
pub mod schema_map;

// Convenience re-exports for library consumers
pub use crate::config::DbConfig;
pub use crate::core::db::connection::{DatabaseHandler, Session};
pub use crate::core::db::query::QueryResult;
pub use crate::core::db::schema::Relationship;
pub use crate::core::{DbvizError, Result};
