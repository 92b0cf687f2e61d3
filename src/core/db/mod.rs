/// Database Module
///
/// This module provides the core database functionality for dbviz, organized
/// into focused submodules:
/// - **Connection Management** (`connection.rs`): The `DatabaseHandler` and
///   its session lifecycle
/// - **Query Execution** (`query.rs`): Statement execution and result
///   materialization
/// - **Relationship Introspection** (`schema.rs`): Foreign-key metadata
///
/// All database operations use the standardized `DbvizError` type for
/// consistent error propagation.
pub mod connection;
pub mod query;
pub mod schema;

pub use connection::*;
pub use query::*;
pub use schema::*;
