/// dbviz Error Module
///
/// This module defines the error types shared across the crate. It provides
/// structured error handling with proper error propagation and user-facing
/// error messages.
use thiserror::Error;

/// Error type covering every failure mode of the handler and the visualizer:
/// - Configuration resolution (missing file, missing section, missing key)
/// - Connection establishment
/// - Query execution
/// - File system operations
///
/// Configuration errors are terminal for the handler; the caller has to
/// supply a corrected file or section. Connection and query errors wrap the
/// driver error and propagate unretried.
#[derive(Error, Debug)]
pub enum DbvizError {
    /// The configuration file could not be located
    #[error("configuration file not found: {0}")]
    ConfigFileMissing(String),

    /// The requested section is absent from the configuration file
    #[error("no section '{section}' in {file}")]
    ConfigSectionMissing { file: String, section: String },

    /// A required key is absent from the resolved section
    #[error("missing key '{key}' in section '{section}'")]
    ConfigKeyMissing { section: String, key: String },

    /// Malformed configuration contents (unparseable file, invalid values)
    #[error("configuration error: {0}")]
    Config(String),

    /// Failure while establishing or releasing the database connection
    #[error("connection error: {0}")]
    Connection(#[source] postgres::Error),

    /// Failure while executing a statement or resolving a transaction
    #[error("query error: {0}")]
    Query(#[source] postgres::Error),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result to use DbvizError as the error type.
pub type Result<T> = std::result::Result<T, DbvizError>;
